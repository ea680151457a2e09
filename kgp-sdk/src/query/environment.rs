// ABOUTME: Environment signals that shape capability probing
// ABOUTME: Remote-session detection for timeouts and terminal identification for placeholders

use crate::constants::env as vars;
use crate::constants::timeouts::{LOCAL_PROBE_TIMEOUT, REMOTE_PROBE_TIMEOUT};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalEnvironment {
    /// Running over SSH, replies take longer
    pub remote_session: bool,
    pub kitty: bool,
    pub ghostty: bool,
    pub terminal_name: String,
}

impl TerminalEnvironment {
    pub fn detect() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let term_program = get(vars::TERM_PROGRAM).unwrap_or_default();
        let term = get(vars::TERM).unwrap_or_default();

        let remote_session = get(vars::SSH_TTY).is_some() || get(vars::SSH_CONNECTION).is_some();
        let kitty = get(vars::KITTY_PID).is_some()
            || get(vars::KITTY_WINDOW_ID).is_some()
            || term_program == "kitty"
            || term.contains("kitty");
        let ghostty = get(vars::GHOSTTY_SHELL_FEATURES).is_some()
            || term_program == "ghostty"
            || term.contains("ghostty");

        Self {
            remote_session,
            kitty,
            ghostty,
            terminal_name: determine_terminal_name(&term_program, &term),
        }
    }

    /// Per-byte wait for probe replies
    pub fn probe_timeout(&self) -> Duration {
        if self.remote_session {
            REMOTE_PROBE_TIMEOUT
        } else {
            LOCAL_PROBE_TIMEOUT
        }
    }

    /// Terminals known to render Unicode placeholders once graphics work.
    /// There is no dedicated query for the feature.
    pub fn may_support_placeholders(&self) -> bool {
        self.kitty || self.ghostty
    }
}

fn determine_terminal_name(term_program: &str, term: &str) -> String {
    if !term_program.is_empty() {
        term_program.to_string()
    } else if !term.is_empty() {
        term.to_string()
    } else {
        "unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn environment(pairs: &[(&str, &str)]) -> TerminalEnvironment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TerminalEnvironment::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_local_session_uses_short_timeout() {
        let env = environment(&[("TERM", "xterm-256color")]);
        assert!(!env.remote_session);
        assert_eq!(env.probe_timeout(), Duration::from_millis(100));
    }

    #[test]
    fn test_ssh_session_uses_long_timeout() {
        let env = environment(&[("SSH_TTY", "/dev/pts/3")]);
        assert!(env.remote_session);
        assert_eq!(env.probe_timeout(), Duration::from_secs(1));

        let env = environment(&[("SSH_CONNECTION", "10.0.0.1 5022 10.0.0.2 22")]);
        assert!(env.remote_session);
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let env = environment(&[("SSH_TTY", ""), ("KITTY_PID", "")]);
        assert!(!env.remote_session);
        assert!(!env.kitty);
    }

    #[test]
    fn test_kitty_detection() {
        assert!(environment(&[("KITTY_PID", "4242")]).kitty);
        assert!(environment(&[("KITTY_WINDOW_ID", "1")]).kitty);
        assert!(environment(&[("TERM", "xterm-kitty")]).kitty);
        assert!(environment(&[("KITTY_PID", "4242")]).may_support_placeholders());
    }

    #[test]
    fn test_ghostty_detection() {
        let env = environment(&[("GHOSTTY_SHELL_FEATURES", "cursor,title")]);
        assert!(env.ghostty);
        assert!(env.may_support_placeholders());
        assert!(environment(&[("TERM_PROGRAM", "ghostty")]).ghostty);
    }

    #[test]
    fn test_other_terminals_skip_placeholders() {
        let env = environment(&[("TERM_PROGRAM", "WezTerm"), ("TERM", "xterm-256color")]);
        assert!(!env.may_support_placeholders());
        assert_eq!(env.terminal_name, "WezTerm");
    }

    #[test]
    fn test_terminal_name_fallbacks() {
        assert_eq!(environment(&[("TERM", "screen")]).terminal_name, "screen");
        assert_eq!(environment(&[]).terminal_name, "unknown");
    }

    #[test]
    #[serial]
    fn test_detect_reads_process_environment() {
        let original_ssh_tty = env::var("SSH_TTY").ok();

        unsafe {
            env::set_var("SSH_TTY", "/dev/pts/9");
        }
        let detected = TerminalEnvironment::detect();
        assert!(detected.remote_session);

        // Restore env
        unsafe {
            if let Some(val) = original_ssh_tty {
                env::set_var("SSH_TTY", val);
            } else {
                env::remove_var("SSH_TTY");
            }
        }
    }
}
