// ABOUTME: Kitty graphics protocol encoder library with terminal capability probing
// ABOUTME: Includes transmission media, frame encoding, query engine and Unicode placeholders

pub mod constants;
pub mod diacritics;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod medium;
pub mod options;
pub mod placeholder;
pub mod query;
pub mod types;

#[cfg(test)]
pub mod test_helpers;

pub use encoder::KgpEncoder;
pub use error::KgpError;
pub use frame::{Frame, delete_sequence, encode_frames, split_frames};
pub use medium::{MediumKind, TransmissionMedium, create_with_fallback};
pub use options::{Action, ControlOptions, QuietLevel};
pub use placeholder::{MAX_PLACEHOLDER_SPAN, PLACEHOLDER, placeholder_lines};
pub use query::{
    CapabilityReport, TerminalEnvironment, probe_medium, probe_unicode_placeholders,
    query_capabilities,
};
pub use types::{CellGrid, ImageId, ImageTransferRequest, PixelFormat, PixelGrid};
