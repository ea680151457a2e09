// ABOUTME: Test helper utilities for simulating a terminal during capability probes
// ABOUTME: Provides a scripted FakeTerminal that answers graphics queries from a queue

use crate::query::terminal::{QueryTerminal, ReadOutcome};
use regex::Regex;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

const FENCE_REPLY: &[u8] = b"\x1b[?62;c";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeMode {
    pub canonical: bool,
    pub echo: bool,
}

/// How the fake terminal answers each write
#[derive(Debug, Clone)]
pub enum Responder {
    /// Never answers
    Silent,
    /// Answers the fence only, like a terminal without graphics support
    FenceOnly,
    /// OK for the queried id, then the fence
    Acknowledge,
    /// OK, unrelated bytes, then the fence
    AcknowledgeWithNoise,
    /// Error reply for the queried id, then the fence
    Reject,
    /// Fixed reply regardless of the query
    Script(Vec<u8>),
}

pub struct FakeTerminal {
    responder: Responder,
    mode: FakeMode,
    history: Vec<FakeMode>,
    written: Vec<u8>,
    pending: VecDeque<u8>,
    close_when_drained: bool,
    fail_reads: bool,
    id_pattern: Regex,
}

impl FakeTerminal {
    pub fn new(responder: Responder) -> Self {
        Self {
            responder,
            mode: FakeMode {
                canonical: true,
                echo: true,
            },
            history: Vec::new(),
            written: Vec::new(),
            pending: VecDeque::new(),
            close_when_drained: false,
            fail_reads: false,
            id_pattern: Regex::new(r"i=(\d+)").unwrap(),
        }
    }

    /// Report end of stream instead of a timeout once the reply is consumed
    pub fn close_when_drained(mut self) -> Self {
        self.close_when_drained = true;
        self
    }

    pub fn fail_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn current_mode(&self) -> FakeMode {
        self.mode
    }

    /// Every mode set through `set_mode`, in order
    pub fn mode_history(&self) -> &[FakeMode] {
        &self.history
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    fn reply_to(&self, query: &str) -> Vec<u8> {
        let id = self
            .id_pattern
            .captures(query)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let mut reply = Vec::new();
        match &self.responder {
            Responder::Silent => {}
            Responder::FenceOnly => reply.extend_from_slice(FENCE_REPLY),
            Responder::Acknowledge => {
                reply.extend_from_slice(format!("\x1b_Gi={};OK\x1b\\", id).as_bytes());
                reply.extend_from_slice(FENCE_REPLY);
            }
            Responder::AcknowledgeWithNoise => {
                reply.extend_from_slice(format!("\x1b_Gi={};OK\x1b\\", id).as_bytes());
                reply.extend_from_slice(b"\x1b[2;1Rnoise");
                reply.extend_from_slice(FENCE_REPLY);
            }
            Responder::Reject => {
                reply.extend_from_slice(
                    format!("\x1b_Gi={};ENODATA:Insufficient image data\x1b\\", id).as_bytes(),
                );
                reply.extend_from_slice(FENCE_REPLY);
            }
            Responder::Script(bytes) => reply.extend_from_slice(bytes),
        }
        reply
    }
}

impl QueryTerminal for FakeTerminal {
    type Mode = FakeMode;

    fn mode(&mut self) -> io::Result<FakeMode> {
        Ok(self.mode)
    }

    fn set_mode(&mut self, mode: &FakeMode) -> io::Result<()> {
        self.mode = *mode;
        self.history.push(*mode);
        Ok(())
    }

    fn quiet_mode(&self, _mode: &FakeMode) -> FakeMode {
        FakeMode {
            canonical: false,
            echo: false,
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(bytes);
        let reply = self.reply_to(&String::from_utf8_lossy(bytes));
        self.pending.extend(reply);
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Duration) -> io::Result<ReadOutcome> {
        if self.fail_reads {
            return Err(io::Error::other("simulated read failure"));
        }
        match self.pending.pop_front() {
            Some(byte) => Ok(ReadOutcome::Byte(byte)),
            None if self.close_when_drained => Ok(ReadOutcome::Closed),
            None => Ok(ReadOutcome::TimedOut),
        }
    }
}
