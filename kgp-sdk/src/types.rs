// ABOUTME: Core data types describing a single image transfer to the terminal
// ABOUTME: Image ids, pixel formats, cell and pixel grids, and the transfer request

use crate::constants::limits::MAX_IMAGE_ID;
use crate::error::KgpError;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Image identifier shared with the terminal.
///
/// Restricted to 24 bits because Unicode placeholders carry the id in a
/// true-color foreground escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImageId(u32);

impl ImageId {
    pub fn new(id: u32) -> Result<Self, KgpError> {
        if id > MAX_IMAGE_ID {
            return Err(KgpError::InvalidImageId(id));
        }
        Ok(Self(id))
    }

    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(0..=MAX_IMAGE_ID))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Red, green and blue components of the color that encodes this id
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ImageId {
    type Error = KgpError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PixelFormat {
    /// 3 bytes per pixel
    Rgb24,
    /// 4 bytes per pixel
    Rgba32,
    /// Encoded PNG, decoded by the terminal
    Png,
}

impl PixelFormat {
    /// Value of the `f` key
    pub fn code(self) -> u32 {
        match self {
            PixelFormat::Rgb24 => 24,
            PixelFormat::Rgba32 => 32,
            PixelFormat::Png => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PixelFormat::Rgb24 => "24bit",
            PixelFormat::Rgba32 => "32bit",
            PixelFormat::Png => "PNG",
        }
    }
}

impl FromStr for PixelFormat {
    type Err = KgpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "24" | "rgb" | "rgb24" => Ok(PixelFormat::Rgb24),
            "32" | "rgba" | "rgba32" => Ok(PixelFormat::Rgba32),
            "100" | "png" => Ok(PixelFormat::Png),
            other => Err(KgpError::Configuration(format!(
                "Unknown pixel format '{}'",
                other
            ))),
        }
    }
}

/// Destination size in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellGrid {
    pub cols: u32,
    pub rows: u32,
}

/// Source size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelGrid {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct ImageTransferRequest {
    pub image_id: ImageId,
    pub format: PixelFormat,
    pub cells: CellGrid,
    pub pixels: PixelGrid,
    pub data: Vec<u8>,
}
