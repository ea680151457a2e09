// ABOUTME: CLI argument definitions for the kgp image viewer
// ABOUTME: Defines the command-line interface structure using clap derive macros

use clap::{Parser, ValueEnum};
use kgp_sdk::{KgpError, MediumKind};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kgp")]
#[command(about = "Display images in the terminal with the Kitty graphics protocol", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the image file
    #[arg(required_unless_present = "query")]
    pub path: Option<PathBuf>,

    /// Number of columns to display (default: as large as fits)
    #[arg(long)]
    pub width: Option<u32>,

    /// Number of rows to display (default: as large as fits)
    #[arg(long)]
    pub height: Option<u32>,

    /// Maximum number of columns (default: terminal width, 0: no limit)
    #[arg(long)]
    pub max_cols: Option<u32>,

    /// Maximum number of rows (default: terminal height, 0: no limit)
    #[arg(long)]
    pub max_rows: Option<u32>,

    /// Lay the image out with Unicode placeholders
    #[arg(long, value_enum)]
    pub unicode_placeholder: Option<PlaceholderMode>,

    /// Transmission medium for the image data
    #[arg(long, value_enum)]
    pub transmission_medium: Option<MediumChoice>,

    /// Image ID to use (0 to 0xFFFFFF, default: random)
    #[arg(long)]
    pub image_id: Option<u32>,

    /// Transfer PNG data instead of raw pixel data
    #[arg(long)]
    pub png: bool,

    /// Maximum payload bytes per escape sequence
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Perform capability queries and quit (no image will be displayed)
    #[arg(short, long)]
    pub query: bool,

    /// Output query results as JSON
    #[arg(long, requires = "query")]
    pub json: bool,

    /// Pretty print JSON output
    #[arg(long, requires = "json")]
    pub pretty: bool,

    /// Wait for Enter, then delete the image and release its data
    #[arg(long)]
    pub wait: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output for debugging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlaceholderMode {
    Auto,
    On,
    Off,
}

impl PlaceholderMode {
    pub fn parse(value: &str) -> Result<Self, KgpError> {
        <Self as ValueEnum>::from_str(value, true).map_err(|_| {
            KgpError::Configuration(format!(
                "Invalid unicode_placeholder '{}'. Must be one of: auto, on, off",
                value
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediumChoice {
    Auto,
    Direct,
    SharedMemory,
    TempFile,
}

impl MediumChoice {
    /// Accepts "auto" and every medium name the SDK understands
    pub fn parse(value: &str) -> Result<Self, KgpError> {
        if value.eq_ignore_ascii_case("auto") {
            return Ok(MediumChoice::Auto);
        }
        Ok(value.parse::<MediumKind>()?.into())
    }

    /// `None` when the medium should be probed
    pub fn fixed(self) -> Option<MediumKind> {
        match self {
            MediumChoice::Auto => None,
            MediumChoice::Direct => Some(MediumKind::Direct),
            MediumChoice::SharedMemory => Some(MediumKind::SharedMemory),
            MediumChoice::TempFile => Some(MediumKind::TempFile),
        }
    }
}

impl From<MediumKind> for MediumChoice {
    fn from(kind: MediumKind) -> Self {
        match kind {
            MediumKind::Direct => MediumChoice::Direct,
            MediumKind::SharedMemory => MediumChoice::SharedMemory,
            MediumKind::TempFile => MediumChoice::TempFile,
        }
    }
}
