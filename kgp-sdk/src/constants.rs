// ABOUTME: Centralized constants for the kitty graphics protocol SDK
// ABOUTME: Contains envelope bytes, probe timeouts, limits and environment variable names

/// Control-string envelope and auxiliary escape sequences
pub mod envelope {
    /// APC introducer followed by the graphics command marker
    pub const APC_OPEN: &str = "\x1b_G";

    /// String terminator closing every graphics command
    pub const APC_CLOSE: &str = "\x1b\\";

    /// Primary device attributes request, answered by every terminal
    pub const FENCE_QUERY: &str = "\x1b[c";

    /// Reply pattern for the device attributes request
    pub const FENCE_REPLY_PATTERN: &str = r"\x1b\[\?[0-9;]*c";

    /// Resets the foreground color after a placeholder row
    pub const RESET_FOREGROUND: &str = "\x1b[39m";
}

/// Capability probe timeouts
pub mod timeouts {
    use std::time::Duration;

    /// Per-byte wait on a local terminal
    pub const LOCAL_PROBE_TIMEOUT: Duration = Duration::from_millis(100);

    /// Per-byte wait when the session runs over SSH
    pub const REMOTE_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
}

/// Protocol and transport limits
pub mod limits {
    /// Default maximum payload bytes per frame
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;

    /// Largest image id that survives the 24-bit color encoding
    pub const MAX_IMAGE_ID: u32 = 0xFF_FFFF;

    /// Exclusive-create attempts before giving up on a shared memory segment
    pub const SHM_CREATE_ATTEMPTS: usize = 2;

    /// Prefix for shared memory segment names and temp files
    pub const RESOURCE_PREFIX: &str = "kgp_";
}

/// Environment variables consulted during capability detection
pub mod env {
    pub const SSH_TTY: &str = "SSH_TTY";
    pub const SSH_CONNECTION: &str = "SSH_CONNECTION";
    pub const KITTY_PID: &str = "KITTY_PID";
    pub const KITTY_WINDOW_ID: &str = "KITTY_WINDOW_ID";
    pub const GHOSTTY_SHELL_FEATURES: &str = "GHOSTTY_SHELL_FEATURES";
    pub const TERM_PROGRAM: &str = "TERM_PROGRAM";
    pub const TERM: &str = "TERM";
}
