//! ui::input
//!
//! Bounded-time line input.
//!
//! # Design
//!
//! Interactive prompts block the (single) thread until the operator answers.
//! To keep an unattended run from hanging forever, every read is bounded by a
//! timeout. Readiness is checked with `poll(2)` on the underlying descriptor,
//! and the line is read one byte at a time so no buffered data can hide from
//! the poll.
//!
//! A timeout and a closed input are errors; an empty line is a valid, empty
//! answer.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Default time to wait for an answer: just under half a day, so a run
/// scheduled twice a day never piles up behind a forgotten prompt.
pub const DEFAULT_INPUT_TIMEOUT: Duration = Duration::from_secs(36_000);

/// Errors from bounded input.
#[derive(Debug, Error)]
pub enum InputError {
    /// No complete line arrived before the timeout elapsed.
    #[error("timed out after {0:?} waiting for input")]
    Timeout(Duration),

    /// The input stream was closed before any data arrived.
    #[error("input closed")]
    Eof,

    /// I/O error while polling or reading.
    #[error("input error: {0}")]
    Io(#[from] io::Error),
}

/// Read one line from `reader`, failing if it does not arrive within `timeout`.
///
/// The trailing newline (and a carriage return before it) is stripped. A line
/// without a newline followed by end of input is returned as-is.
///
/// # Errors
///
/// - [`InputError::Timeout`] if the deadline passes before a full line is read
/// - [`InputError::Eof`] if the stream is closed with nothing read
/// - [`InputError::Io`] for polling or read failures
pub fn input_with_timeout<R: Read + AsRawFd>(
    reader: &mut R,
    timeout: Duration,
) -> Result<String, InputError> {
    let deadline = Instant::now() + timeout;
    let mut line = Vec::new();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || !wait_readable(reader.as_raw_fd(), remaining)? {
            return Err(InputError::Timeout(timeout));
        }

        let mut byte = [0u8; 1];
        match reader.read(&mut byte) {
            Ok(0) if line.is_empty() => return Err(InputError::Eof),
            Ok(0) => break,
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => line.push(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(InputError::Io(e)),
        }
    }

    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// Wait until `fd` is readable (or hung up). Returns `false` on timeout.
fn wait_readable(fd: i32, timeout: Duration) -> Result<bool, InputError> {
    let millis = timeout.as_millis().clamp(1, i32::MAX as u128) as i32;
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    loop {
        // SAFETY: `pollfd` is a valid, initialised struct and we pass a count of 1.
        let ready = unsafe { libc::poll(&mut pollfd, 1, millis) };
        match ready {
            0 => return Ok(false),
            n if n > 0 => return Ok(true),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(InputError::Io(err));
                }
            }
        }
    }
}

/// Open an unbuffered handle on the process's standard input.
///
/// The descriptor is duplicated, so the handle can be dropped without closing
/// stdin.
pub fn stdin_handle() -> io::Result<File> {
    let owned = io::stdin().as_fd().try_clone_to_owned()?;
    Ok(File::from(owned))
}
