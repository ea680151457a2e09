// ABOUTME: Controlling terminal access for capability queries
// ABOUTME: Mode save/restore as a scoped guard and a bounded single-byte read

use crate::error::KgpError;
use nix::poll::{PollFd, PollFlags, poll};
use nix::sys::termios::{self, LocalFlags, SetArg, Termios};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::ops::{Deref, DerefMut};
use std::os::fd::AsFd;
use std::time::Duration;

const CONTROLLING_TERMINAL: &str = "/dev/tty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Byte(u8),
    TimedOut,
    Closed,
}

/// The half of a terminal a capability probe talks to
pub trait QueryTerminal {
    type Mode: Clone;

    fn mode(&mut self) -> io::Result<Self::Mode>;

    fn set_mode(&mut self, mode: &Self::Mode) -> io::Result<()>;

    /// Copy of `mode` with canonical line buffering and echo disabled
    fn quiet_mode(&self, mode: &Self::Mode) -> Self::Mode;

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Wait up to `timeout` for a single byte
    fn read_byte(&mut self, timeout: Duration) -> io::Result<ReadOutcome>;
}

/// Terminal switched to quiet mode; the saved mode comes back on drop.
pub struct ModeGuard<'t, T: QueryTerminal> {
    terminal: &'t mut T,
    saved: T::Mode,
}

impl<'t, T: QueryTerminal> ModeGuard<'t, T> {
    pub fn acquire(terminal: &'t mut T) -> io::Result<Self> {
        let saved = terminal.mode()?;
        let quiet = terminal.quiet_mode(&saved);
        terminal.set_mode(&quiet)?;
        Ok(Self { terminal, saved })
    }
}

impl<T: QueryTerminal> Deref for ModeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.terminal
    }
}

impl<T: QueryTerminal> DerefMut for ModeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.terminal
    }
}

impl<T: QueryTerminal> Drop for ModeGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.set_mode(&self.saved) {
            log::warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

fn quiet_termios(mode: &Termios) -> Termios {
    let mut quiet = mode.clone();
    quiet
        .local_flags
        .remove(LocalFlags::ICANON | LocalFlags::ECHO);
    quiet
}

/// The process' controlling terminal
pub struct Tty {
    file: File,
}

impl Tty {
    pub fn open() -> Result<Self, KgpError> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(CONTROLLING_TERMINAL)
            .map(|file| Self { file })
            .map_err(|e| {
                log::debug!("Cannot open {}: {}", CONTROLLING_TERMINAL, e);
                KgpError::TerminalUnavailable
            })
    }
}

impl QueryTerminal for Tty {
    type Mode = Termios;

    fn mode(&mut self) -> io::Result<Termios> {
        Ok(termios::tcgetattr(&self.file)?)
    }

    fn set_mode(&mut self, mode: &Termios) -> io::Result<()> {
        Ok(termios::tcsetattr(&self.file, SetArg::TCSANOW, mode)?)
    }

    fn quiet_mode(&self, mode: &Termios) -> Termios {
        quiet_termios(mode)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()
    }

    fn read_byte(&mut self, timeout: Duration) -> io::Result<ReadOutcome> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        if poll(&mut fds, millis)? == 0 {
            return Ok(ReadOutcome::TimedOut);
        }

        let mut byte = [0u8; 1];
        match self.file.read(&mut byte)? {
            0 => Ok(ReadOutcome::Closed),
            _ => Ok(ReadOutcome::Byte(byte[0])),
        }
    }
}
