// ABOUTME: Transfer encoder tying medium, options, frames and placeholders into one image transfer
// ABOUTME: Owns the medium until the caller deletes the image

use crate::error::KgpError;
use crate::frame::{Frame, delete_sequence, split_frames};
use crate::medium::{MediumKind, TransmissionMedium, create_with_fallback};
use crate::options::{ControlOptions, QuietLevel};
use crate::placeholder::placeholder_lines;
use crate::types::{ImageId, ImageTransferRequest};
use std::io::Write;

pub struct KgpEncoder {
    request: ImageTransferRequest,
    medium: TransmissionMedium,
    unicode_placeholder: bool,
    options: String,
}

impl KgpEncoder {
    /// Create the medium for `request`, falling back to direct transmission
    /// when `medium_kind` cannot be set up.
    pub fn new(
        request: ImageTransferRequest,
        medium_kind: MediumKind,
        unicode_placeholder: bool,
    ) -> Result<Self, KgpError> {
        let medium = create_with_fallback(request.image_id, &request.data, medium_kind)?;
        let options = ControlOptions::builder()
            .image_id(request.image_id)
            .format(request.format)
            .medium(medium.kind())
            .quiet(QuietLevel::Silent)
            .cells(request.cells)
            .pixels(request.pixels)
            .compressed(medium.compressed())
            .unicode_placeholder(unicode_placeholder)
            .build()
            .to_string();

        Ok(Self {
            request,
            medium,
            unicode_placeholder,
            options,
        })
    }

    pub fn image_id(&self) -> ImageId {
        self.request.image_id
    }

    pub fn medium(&self) -> &TransmissionMedium {
        &self.medium
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    pub fn frames(&self, chunk_size: usize) -> Result<Vec<Frame<'_>>, KgpError> {
        split_frames(self.medium.payload(), &self.options, chunk_size)
    }

    /// Empty unless placeholders were requested
    pub fn placeholder_lines(&self) -> Vec<String> {
        if !self.unicode_placeholder {
            return Vec::new();
        }
        placeholder_lines(
            self.request.image_id,
            self.request.cells.cols,
            self.request.cells.rows,
        )
    }

    /// Write every frame, then the placeholder grid, then a newline.
    pub fn write_to<W: Write>(&self, writer: &mut W, chunk_size: usize) -> Result<(), KgpError> {
        let frames = self.frames(chunk_size)?;
        log::debug!(
            "Writing image {} in {} frame(s) via {}",
            self.request.image_id,
            frames.len(),
            self.medium.kind()
        );

        for frame in &frames {
            write!(writer, "{}", frame)?;
        }
        let lines = self.placeholder_lines();
        if !lines.is_empty() {
            writer.write_all(lines.join("\n").as_bytes())?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Release the medium and return the sequence deleting the image.
    pub fn delete(&mut self) -> String {
        self.medium.cleanup();
        delete_sequence(self.request.image_id)
    }
}
