// ABOUTME: Single capability probe: send a query plus fence, then scan the reply byte by byte
// ABOUTME: Success and fence detection are independent; every failure reads as unsupported

use super::terminal::{ModeGuard, QueryTerminal, ReadOutcome};
use regex::Regex;
use std::io;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct QueryProbe {
    /// Bytes written to the terminal: the query frame followed by the fence query
    pub code: String,
    pub success: Regex,
    pub fence: Regex,
    /// Maximum wait for each byte of the reply
    pub timeout: Duration,
}

/// Why the read loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeExit {
    TimedOut,
    Closed,
    Fenced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub supported: bool,
    pub exit: ProbeExit,
    pub response: String,
}

/// Accumulates reply bytes and tracks both patterns
pub struct ResponseScanner<'p> {
    probe: &'p QueryProbe,
    response: String,
    supported: bool,
}

impl<'p> ResponseScanner<'p> {
    pub fn new(probe: &'p QueryProbe) -> Self {
        Self {
            probe,
            response: String::new(),
            supported: false,
        }
    }

    /// Returns true once the fence reply has been seen
    pub fn feed(&mut self, byte: u8) -> bool {
        if byte.is_ascii() {
            self.response.push(char::from(byte));
        }
        if !self.supported && self.probe.success.is_match(&self.response) {
            self.supported = true;
        }
        self.probe.fence.is_match(&self.response)
    }

    pub fn finish(self, exit: ProbeExit) -> ProbeOutcome {
        ProbeOutcome {
            supported: self.supported,
            exit,
            response: self.response,
        }
    }
}

/// Run the probe; any failure yields `false`.
pub fn run_probe<T: QueryTerminal>(terminal: &mut T, probe: &QueryProbe) -> bool {
    match exchange(terminal, probe) {
        Ok(outcome) => {
            log::debug!(
                "Probe finished ({:?}), supported: {}, response: {:?}",
                outcome.exit,
                outcome.supported,
                outcome.response
            );
            outcome.supported
        }
        Err(e) => {
            log::debug!("Probe failed: {}", e);
            false
        }
    }
}

/// Write the probe and read until timeout, end of stream or fence
pub fn exchange<T: QueryTerminal>(
    terminal: &mut T,
    probe: &QueryProbe,
) -> io::Result<ProbeOutcome> {
    let mut guard = ModeGuard::acquire(terminal)?;
    guard.write_all(probe.code.as_bytes())?;

    let mut scanner = ResponseScanner::new(probe);
    let exit = loop {
        match guard.read_byte(probe.timeout)? {
            ReadOutcome::TimedOut => break ProbeExit::TimedOut,
            ReadOutcome::Closed => break ProbeExit::Closed,
            ReadOutcome::Byte(byte) => {
                if scanner.feed(byte) {
                    break ProbeExit::Fenced;
                }
            }
        }
    };

    Ok(scanner.finish(exit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::envelope::FENCE_REPLY_PATTERN;
    use crate::test_helpers::{FakeMode, FakeTerminal, Responder};

    fn probe_for(id: u32) -> QueryProbe {
        QueryProbe {
            code: format!("\x1b_Gi={},a=q,f=32,t=d,s=1,v=1;AAAAAA==\x1b\\\x1b[c", id),
            success: Regex::new(&format!("\x1b_Gi={};OK\x1b\\\\", id)).unwrap(),
            fence: Regex::new(FENCE_REPLY_PATTERN).unwrap(),
            timeout: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_acknowledged_probe_is_supported() {
        let mut terminal = FakeTerminal::new(Responder::Acknowledge);
        let initial = terminal.current_mode();

        assert!(run_probe(&mut terminal, &probe_for(77)));
        assert_eq!(terminal.current_mode(), initial);
        assert!(terminal.mode_history().contains(&FakeMode {
            canonical: false,
            echo: false
        }));
    }

    #[test]
    fn test_fence_only_is_unsupported() {
        let mut terminal = FakeTerminal::new(Responder::FenceOnly);
        let initial = terminal.current_mode();

        let outcome = exchange(&mut terminal, &probe_for(77)).unwrap();
        assert!(!outcome.supported);
        assert_eq!(outcome.exit, ProbeExit::Fenced);
        assert_eq!(terminal.current_mode(), initial);
    }

    #[test]
    fn test_noise_between_ok_and_fence_still_counts() {
        let mut terminal = FakeTerminal::new(Responder::AcknowledgeWithNoise);
        let outcome = exchange(&mut terminal, &probe_for(3)).unwrap();
        assert!(outcome.supported);
        assert_eq!(outcome.exit, ProbeExit::Fenced);
    }

    #[test]
    fn test_error_reply_is_unsupported() {
        let mut terminal = FakeTerminal::new(Responder::Reject);
        assert!(!run_probe(&mut terminal, &probe_for(5)));
    }

    #[test]
    fn test_acknowledgement_for_other_id_is_ignored() {
        let mut terminal =
            FakeTerminal::new(Responder::Script(b"\x1b_Gi=999;OK\x1b\\\x1b[?62;c".to_vec()));
        assert!(!run_probe(&mut terminal, &probe_for(5)));
    }

    #[test]
    fn test_silent_terminal_times_out() {
        let mut terminal = FakeTerminal::new(Responder::Silent);
        let initial = terminal.current_mode();

        let outcome = exchange(&mut terminal, &probe_for(1)).unwrap();
        assert_eq!(outcome.exit, ProbeExit::TimedOut);
        assert!(!outcome.supported);
        assert_eq!(terminal.current_mode(), initial);
    }

    #[test]
    fn test_closed_stream_keeps_earlier_success() {
        let mut terminal = FakeTerminal::new(Responder::Acknowledge).close_when_drained();
        let mut probe = probe_for(11);
        probe.fence = Regex::new("never-matches").unwrap();

        let outcome = exchange(&mut terminal, &probe).unwrap();
        assert_eq!(outcome.exit, ProbeExit::Closed);
        assert!(outcome.supported);
    }

    #[test]
    fn test_read_failure_is_negative_and_restores_mode() {
        let mut terminal = FakeTerminal::new(Responder::Acknowledge).fail_reads();
        let initial = terminal.current_mode();

        assert!(!run_probe(&mut terminal, &probe_for(12)));
        assert_eq!(terminal.current_mode(), initial);
    }

    #[test]
    fn test_probe_code_is_written_verbatim() {
        let mut terminal = FakeTerminal::new(Responder::FenceOnly);
        let probe = probe_for(8);
        run_probe(&mut terminal, &probe);
        assert_eq!(terminal.written(), probe.code.as_bytes());
    }

    #[test]
    fn test_scanner_drops_non_ascii_bytes() {
        let probe = probe_for(4);
        let mut scanner = ResponseScanner::new(&probe);
        for byte in [0xFF, b'a', 0x80, b'b'] {
            assert!(!scanner.feed(byte));
        }
        assert_eq!(scanner.finish(ProbeExit::TimedOut).response, "ab");
    }
}
