// ABOUTME: Image display pipeline pieces around the graphics protocol encoder
// ABOUTME: Terminal geometry, sizing, image loading and capability-driven detection

pub mod detection;
pub mod geometry;
pub mod loader;
pub mod sizing;

pub use detection::{resolve_medium, resolve_placeholders};
pub use geometry::TerminalGeometry;
pub use loader::{LoadedImage, load_image};
pub use sizing::{CellSize, SizeConstraints, fit_dimensions};
