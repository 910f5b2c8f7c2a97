use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// First byte of every controller frame
pub const FRAME_HEADER: u8 = 0xFA;

/// Total frame length: header, mode, brightness, speed, checksum
pub const FRAME_LEN: usize = 5;

/// Lowest and highest user-facing brightness/speed level
pub const LEVEL_MIN: u8 = 1;
pub const LEVEL_MAX: u8 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("Invalid {field} value '{value}'. Use values from 1 to 5.")]
    InvalidLevel { field: &'static str, value: String },

    #[error("Expected [device] <mode> [brightness speed], got {0} arguments")]
    ArgumentCount(usize),
}

/// Lighting effect understood by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Rainbow = 1,
    Breathing = 2,
    Cycle = 3,
    Off = 4,
    Auto = 5,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Rainbow,
        Mode::Breathing,
        Mode::Cycle,
        Mode::Off,
        Mode::Auto,
    ];

    /// Wire byte for this mode
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Rainbow => "Rainbow",
            Mode::Breathing => "Breathing",
            Mode::Cycle => "Cycle",
            Mode::Off => "Off",
            Mode::Auto => "Auto",
        }
    }

    pub fn from_code(code: u8) -> Option<Mode> {
        Mode::ALL.into_iter().find(|mode| mode.code() == code)
    }
}

impl FromStr for Mode {
    type Err = FrameError;

    /// Accepts a mode name (any case) or its numeric code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(mode) = Mode::ALL.into_iter().find(|m| m.name().eq_ignore_ascii_case(s)) {
            return Ok(mode);
        }

        s.parse::<u8>()
            .ok()
            .and_then(Mode::from_code)
            .ok_or_else(|| FrameError::InvalidMode(s.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Brightness or speed level, 1 (lowest) to 5 (highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Level(u8);

impl Level {
    pub fn new(level: u8) -> Option<Level> {
        (LEVEL_MIN..=LEVEL_MAX).contains(&level).then_some(Level(level))
    }

    /// Parse a user-supplied level, naming `field` in the error
    pub fn parse(field: &'static str, value: &str) -> Result<Level, FrameError> {
        value
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(Level::new)
            .ok_or_else(|| FrameError::InvalidLevel {
                field,
                value: value.to_string(),
            })
    }

    /// The controller counts down: level 1 is 0x05, level 5 is 0x01
    pub fn wire_byte(self) -> u8 {
        LEVEL_MAX + 1 - self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Level(LEVEL_MIN)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checksum over the wire bytes of a frame, header included
pub fn checksum(mode: u8, brightness: u8, speed: u8) -> u8 {
    FRAME_HEADER
        .wrapping_add(mode)
        .wrapping_add(brightness)
        .wrapping_add(speed)
}

/// A complete controller command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub mode: Mode,
    pub brightness: Level,
    pub speed: Level,
}

impl Frame {
    pub fn new(mode: Mode, brightness: Level, speed: Level) -> Self {
        Frame {
            mode,
            brightness,
            speed,
        }
    }

    pub fn checksum(&self) -> u8 {
        checksum(
            self.mode.code(),
            self.brightness.wire_byte(),
            self.speed.wire_byte(),
        )
    }

    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        [
            FRAME_HEADER,
            self.mode.code(),
            self.brightness.wire_byte(),
            self.speed.wire_byte(),
            self.checksum(),
        ]
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (brightness {}, speed {})",
            self.mode, self.brightness, self.speed
        )
    }
}
