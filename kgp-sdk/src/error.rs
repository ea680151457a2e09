// ABOUTME: Error types for the kitty graphics protocol SDK with user-friendly messages
// ABOUTME: Separates configuration, medium creation, probing and terminal failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KgpError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Image id {0} is out of range (must be between 0 and 0xFFFFFF)")]
    InvalidImageId(u32),

    #[error("Unknown transmission medium '{0}'")]
    UnknownMedium(String),

    #[error("Failed to create transmission medium: {0}")]
    MediumCreation(String),

    #[error("No controlling terminal available")]
    TerminalUnavailable,

    #[error("Capability probe failed: {0}")]
    Probe(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KgpError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            KgpError::InvalidImageId(_) => {
                Some("Image ids are encoded as 24-bit colors, pick a value up to 16777215")
            }
            KgpError::UnknownMedium(_) => {
                Some("Valid media are: direct (d), shared-memory (s), temp-file (t)")
            }
            KgpError::MediumCreation(_) => Some(
                "Shared memory may be exhausted or the temp directory unwritable; try --transmission-medium direct",
            ),
            KgpError::TerminalUnavailable => {
                Some("Capability queries need an interactive terminal (is the output piped?)")
            }
            _ => None,
        }
    }

    /// Whether this failure can be recovered by retrying with direct transmission
    pub fn is_medium_failure(&self) -> bool {
        matches!(self, KgpError::MediumCreation(_) | KgpError::Io(_))
    }
}

impl From<nix::Error> for KgpError {
    fn from(err: nix::Error) -> Self {
        KgpError::Io(std::io::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            KgpError::Configuration("chunk size must be positive".to_string()).to_string(),
            "Invalid configuration: chunk size must be positive"
        );
        assert_eq!(
            KgpError::InvalidImageId(0x1000000).to_string(),
            "Image id 16777216 is out of range (must be between 0 and 0xFFFFFF)"
        );
        assert_eq!(
            KgpError::UnknownMedium("carrier-pigeon".to_string()).to_string(),
            "Unknown transmission medium 'carrier-pigeon'"
        );
        assert_eq!(
            KgpError::TerminalUnavailable.to_string(),
            "No controlling terminal available"
        );
    }

    #[test]
    fn test_help_text() {
        assert!(KgpError::InvalidImageId(u32::MAX).help_text().is_some());
        assert!(
            KgpError::UnknownMedium("x".to_string())
                .help_text()
                .unwrap()
                .contains("shared-memory")
        );
        assert_eq!(KgpError::Probe("timeout".to_string()).help_text(), None);
    }

    #[test]
    fn test_medium_failure_classification() {
        assert!(KgpError::MediumCreation("shm full".to_string()).is_medium_failure());
        assert!(KgpError::Io(std::io::Error::other("disk full")).is_medium_failure());
        assert!(!KgpError::Configuration("bad".to_string()).is_medium_failure());
        assert!(!KgpError::TerminalUnavailable.is_medium_failure());
    }

    #[test]
    fn test_from_nix_error() {
        let err: KgpError = nix::errno::Errno::ENOENT.into();
        match err {
            KgpError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
