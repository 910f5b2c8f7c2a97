use crate::protocol::{Frame, FrameError, Level, Mode};

/// Positional arguments after validation; nothing here touches the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// `None` when the device was not given on the command line
    pub device: Option<String>,
    pub frame: Frame,
}

/// Resolve `[device] <mode> [brightness speed]` by argument count.
///
/// Validation runs in order mode, brightness, speed so the first bad value
/// is the one reported.
pub fn resolve(args: &[String]) -> Result<Invocation, FrameError> {
    let (device, mode, levels) = match args {
        [mode] => (None, mode, None),
        [device, mode] => (Some(device), mode, None),
        [mode, brightness, speed] => (None, mode, Some((brightness, speed))),
        [device, mode, brightness, speed] => (Some(device), mode, Some((brightness, speed))),
        _ => return Err(FrameError::ArgumentCount(args.len())),
    };

    let mode: Mode = mode.parse()?;

    let (brightness, speed) = match levels {
        Some((brightness, speed)) => (
            Level::parse("brightness", brightness)?,
            Level::parse("speed", speed)?,
        ),
        None => (Level::default(), Level::default()),
    };

    Ok(Invocation {
        device: device.cloned(),
        frame: Frame::new(mode, brightness, speed),
    })
}
