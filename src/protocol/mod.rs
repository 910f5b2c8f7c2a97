mod frame;

pub use frame::{Frame, FrameError, Level, Mode};
