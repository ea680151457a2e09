// ABOUTME: Builder for the comma-separated key=value control data of a graphics command
// ABOUTME: Renders id, action, format, medium, quiet level, geometry and mode flags

use crate::medium::MediumKind;
use crate::types::{CellGrid, ImageId, PixelFormat, PixelGrid};
use std::fmt;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Transmit and display (`a=T`)
    TransmitAndDisplay,
    /// Validate without storing (`a=q`)
    Query,
    /// Delete (`a=d`)
    Delete,
}

impl Action {
    pub fn code(self) -> char {
        match self {
            Action::TransmitAndDisplay => 'T',
            Action::Query => 'q',
            Action::Delete => 'd',
        }
    }
}

/// Response suppression (`q`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuietLevel {
    /// Terminal replies with OK and errors
    Verbose = 0,
    /// Only errors are reported
    ErrorsOnly = 1,
    /// Nothing is reported
    Silent = 2,
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ControlOptions {
    pub image_id: ImageId,

    #[builder(default = Action::TransmitAndDisplay)]
    pub action: Action,

    pub format: PixelFormat,

    pub medium: MediumKind,

    #[builder(default, setter(strip_option))]
    pub quiet: Option<QuietLevel>,

    #[builder(default, setter(strip_option))]
    pub cells: Option<CellGrid>,

    #[builder(default, setter(strip_option))]
    pub pixels: Option<PixelGrid>,

    #[builder(default = false)]
    pub compressed: bool,

    #[builder(default = false)]
    pub unicode_placeholder: bool,
}

impl fmt::Display for ControlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "i={},a={},f={},t={}",
            self.image_id,
            self.action.code(),
            self.format.code(),
            self.medium.identifier()
        )?;
        if let Some(quiet) = self.quiet {
            write!(f, ",q={}", quiet as u8)?;
        }
        if let Some(cells) = self.cells {
            write!(f, ",c={},r={}", cells.cols, cells.rows)?;
        }
        if let Some(pixels) = self.pixels {
            write!(f, ",s={},v={}", pixels.width, pixels.height)?;
        }
        if self.compressed {
            f.write_str(",o=z")?;
        }
        if self.unicode_placeholder {
            f.write_str(",U=1")?;
        }
        Ok(())
    }
}
