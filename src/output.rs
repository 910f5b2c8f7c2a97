use anyhow::{Context, Result};
use log::{debug, info, trace};
use serialport::SerialPort;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::protocol::Frame;

#[cfg(unix)]
type NativePort = serialport::TTYPort;
#[cfg(windows)]
type NativePort = serialport::COMPort;

/// Serial connection to the LED controller, closed on drop
pub struct Output {
    device: String,
    port: NativePort,
    byte_delay: Duration,
}

impl Output {
    /// Open the device and put it at the configured (non-standard) baud rate
    pub fn open(config: &Config) -> Result<Self> {
        let mut port = serialport::new(&config.device, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open_native()
            .context(format!("Failed to open serial port {}", config.device))?;

        set_custom_baud_rate(&mut port, config.baud_rate)
            .context(format!("Failed to set {} baud on {}", config.baud_rate, config.device))?;

        match port.baud_rate() {
            Ok(actual) => info!("Opened {} at {} baud", config.device, actual),
            Err(e) => debug!("Could not read back baud rate of {}: {}", config.device, e),
        }

        Ok(Output {
            device: config.device.clone(),
            port,
            byte_delay: Duration::from_millis(config.byte_delay_ms),
        })
    }

    /// Send a frame one byte at a time; no reply is expected
    pub fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        let bytes = frame.to_bytes();

        info!("Sending {} to {}", frame, self.device);
        debug!("Frame bytes: {}", hex(&bytes));

        write_paced(&mut self.port, &bytes, self.byte_delay)
            .context(format!("Failed to write to {}", self.device))
    }
}

#[cfg(target_os = "linux")]
fn set_custom_baud_rate(port: &mut NativePort, baud_rate: u32) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    crate::termios::set_custom_baud_rate(port.as_raw_fd(), baud_rate)
}

#[cfg(not(target_os = "linux"))]
fn set_custom_baud_rate(port: &mut NativePort, baud_rate: u32) -> io::Result<()> {
    port.set_baud_rate(baud_rate).map_err(io::Error::from)
}

/// Write `bytes` individually, flushing and pausing `delay` after each one.
/// The controller drops bytes that arrive back to back.
pub fn write_paced<W: Write>(writer: &mut W, bytes: &[u8], delay: Duration) -> io::Result<()> {
    for (i, byte) in bytes.iter().enumerate() {
        writer.write_all(std::slice::from_ref(byte))?;
        writer.flush()?;
        trace!("byte {}: {:02x}", i, byte);

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    Ok(())
}

pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Level, Mode};
    use std::time::Instant;

    /// Records each write call separately
    #[derive(Default)]
    struct RecordingWriter {
        writes: Vec<Vec<u8>>,
        flushes: usize,
        fail_after: Option<usize>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_after == Some(self.writes.len()) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
            }
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_frame_is_written_byte_by_byte() {
        let frame = Frame::new(Mode::Cycle, Level::new(2).unwrap(), Level::new(4).unwrap());
        let mut writer = RecordingWriter::default();

        write_paced(&mut writer, &frame.to_bytes(), Duration::ZERO).unwrap();

        assert_eq!(
            writer.writes,
            vec![vec![0xFA], vec![0x03], vec![0x04], vec![0x02], vec![0x03]]
        );
        assert_eq!(writer.flushes, 5);
    }

    #[test]
    fn test_write_error_stops_transmission() {
        let mut writer = RecordingWriter {
            fail_after: Some(2),
            ..Default::default()
        };

        let err = write_paced(&mut writer, &[0xFA, 1, 5, 5, 5], Duration::ZERO).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(writer.writes.len(), 2);
    }

    #[test]
    fn test_delay_between_bytes() {
        let mut sink = Vec::new();
        let start = Instant::now();

        write_paced(&mut sink, &[1, 2, 3], Duration::from_millis(5)).unwrap();

        assert_eq!(sink, vec![1, 2, 3]);
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0xFA, 0x01, 0x05]), "fa 01 05");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn test_open_missing_device() {
        let config = Config {
            device: "/dev/t9rgb-does-not-exist".to_string(),
            ..Config::default()
        };
        let err = Output::open(&config).err().unwrap();
        assert!(err.to_string().contains("Failed to open serial port /dev/t9rgb-does-not-exist"));
    }
}
