//! Arbitrary baud rates on Linux through `termios2` and the `BOTHER` flag.
//!
//! The classic termios API only accepts the `Bxxxx` constants, and the
//! controller runs at 10000 baud, which is not one of them.
//!
//! serialport already uses termios2 on glibc targets, but its musl and
//! powerpc builds fall back to the classic API, so the rate is always
//! applied here as well.

use std::io;
use std::os::unix::io::RawFd;

/// Read the port settings with `TCGETS2`, switch the speed field to
/// `BOTHER` and apply `baud_rate` for both directions with `TCSETS2`.
pub fn set_custom_baud_rate(fd: RawFd, baud_rate: u32) -> io::Result<()> {
    // SAFETY: termios2 is a plain C struct; all-zero is a valid value and
    // it is fully overwritten by TCGETS2 before use.
    let mut tio: libc::termios2 = unsafe { std::mem::zeroed() };

    // SAFETY: fd is an open tty owned by the caller and tio outlives the call.
    if unsafe { libc::ioctl(fd, libc::TCGETS2, &mut tio as *mut libc::termios2) } < 0 {
        let err = io::Error::last_os_error();
        return Err(io::Error::new(err.kind(), format!("ioctl TCGETS2: {}", err)));
    }

    tio.c_cflag &= !libc::CBAUD;
    tio.c_cflag |= libc::BOTHER;
    tio.c_ispeed = baud_rate;
    tio.c_ospeed = baud_rate;

    // SAFETY: as above.
    if unsafe { libc::ioctl(fd, libc::TCSETS2, &tio as *const libc::termios2) } < 0 {
        let err = io::Error::last_os_error();
        return Err(io::Error::new(err.kind(), format!("ioctl TCSETS2: {}", err)));
    }

    Ok(())
}
