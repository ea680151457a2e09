// ABOUTME: Image decoding and resizing into a transfer-ready pixel payload
// ABOUTME: Picks RGBA or RGB by alpha channel, or re-encodes as PNG on request

use super::sizing::{CellSize, SizeConstraints, cells_for, fit_dimensions};
use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, ImageFormat, imageops::FilterType};
use kgp_sdk::{CellGrid, ImageId, ImageTransferRequest, PixelFormat, PixelGrid};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub format: PixelFormat,
    pub pixels: PixelGrid,
    pub cells: CellGrid,
    pub data: Vec<u8>,
}

impl LoadedImage {
    pub fn into_request(self, image_id: ImageId) -> ImageTransferRequest {
        ImageTransferRequest {
            image_id,
            format: self.format,
            cells: self.cells,
            pixels: self.pixels,
            data: self.data,
        }
    }
}

/// Decode `path` and fit it to the constraints
pub fn load_image(
    path: &Path,
    cell: CellSize,
    limits: &SizeConstraints,
    png: bool,
) -> Result<LoadedImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;
    prepare_image(image, cell, limits, png)
}

pub fn prepare_image(
    image: DynamicImage,
    cell: CellSize,
    limits: &SizeConstraints,
    png: bool,
) -> Result<LoadedImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(anyhow!("Image has no pixels"));
    }

    let source = PixelGrid {
        width: image.width(),
        height: image.height(),
    };
    let pixels = fit_dimensions(source, cell, limits);
    let resized = if pixels == source {
        image
    } else {
        image.resize_exact(pixels.width, pixels.height, FilterType::Lanczos3)
    };
    let cells = cells_for(pixels, cell);

    log::debug!(
        "Resized image from {}x{} to {}x{} pixels, display size: {}x{} cells",
        source.width,
        source.height,
        pixels.width,
        pixels.height,
        cells.cols,
        cells.rows
    );

    let has_alpha = resized.color().has_alpha();
    let (format, data) = if png {
        let mut buffer = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .context("Failed to encode image as PNG")?;
        (PixelFormat::Png, buffer)
    } else if has_alpha {
        log::debug!("Image has alpha channel, using RGBA format");
        (PixelFormat::Rgba32, resized.to_rgba8().into_raw())
    } else {
        log::debug!("Image does not have alpha channel, using RGB format");
        (PixelFormat::Rgb24, resized.to_rgb8().into_raw())
    };

    Ok(LoadedImage {
        format,
        pixels,
        cells,
        data,
    })
}
