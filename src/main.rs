use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process;

mod cli;
mod config;
mod output;
mod protocol;
#[cfg(target_os = "linux")]
mod termios;

use config::Config;
use output::Output;
use protocol::FrameError;

const ARGS_HELP: &str = "\
Modes: Rainbow, Breathing, Cycle, Off, Auto (name or number 1-5).
Brightness and speed take values from 1 to 5 (default 1).
Default device is /dev/ttyUSB0, baud rate 10000.";

#[derive(Parser)]
#[command(name = "t9rgb", version)]
#[command(about = "T9 RGB LED controller - set mode, brightness and speed over serial", long_about = None)]
#[command(override_usage = "t9rgb [OPTIONS] [DEVICE] <MODE> [BRIGHTNESS SPEED]")]
#[command(after_help = ARGS_HELP)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// [DEVICE] <MODE> [BRIGHTNESS SPEED]
    #[arg(value_name = "ARGS")]
    args: Vec<String>,

    /// Path to configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Enable detailed debug (every byte written)
    #[arg(long)]
    ddebug: bool,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(1);
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    init_logging(cli.debug, cli.ddebug);

    // Everything is validated before the device is touched
    let invocation = match cli::resolve(&cli.args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(e, FrameError::InvalidMode(_) | FrameError::ArgumentCount(_)) {
                eprintln!();
                eprintln!("{}", Cli::command().render_help());
            }
            process::exit(1);
        }
    };

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // A device on the command line wins over the config file
    if let Some(device) = invocation.device {
        config.device = device;
    }

    let mut output = Output::open(&config)?;
    output.send_frame(&invocation.frame)?;
    drop(output);

    println!("LED status sent successfully.");

    Ok(())
}

/// --ddebug implies --debug; RUST_LOG still takes precedence
fn init_logging(debug: bool, ddebug: bool) {
    let level = if ddebug {
        "trace"
    } else if debug {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
