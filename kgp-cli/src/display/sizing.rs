// ABOUTME: Target size calculation fitting an image into terminal cells
// ABOUTME: Explicit sizes stretch, single axes keep aspect ratio, maxima never upscale

use kgp_sdk::{CellGrid, PixelGrid};

/// Requested and maximum display size in cells; `None` leaves an axis free
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeConstraints {
    pub cols: Option<u32>,
    pub rows: Option<u32>,
    pub max_cols: Option<u32>,
    pub max_rows: Option<u32>,
}

/// Cell size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

/// Pixel size of the resized image.
///
/// - cols and rows: stretch to exactly that many cells
/// - cols only: keep aspect ratio, height clamped to `max_rows`
/// - rows only: keep aspect ratio, width clamped to `max_cols`
/// - neither: fit inside the maxima, never larger than the source
///
/// The result is never smaller than one cell.
pub fn fit_dimensions(image: PixelGrid, cell: CellSize, limits: &SizeConstraints) -> PixelGrid {
    let image_width = image.width.max(1);
    let image_height = image.height.max(1);
    let aspect = f64::from(image_width) / f64::from(image_height);

    let scale = |cells: u32, size: u32| cells.saturating_mul(size);
    let by_width = |width: u32| (f64::from(width) / aspect) as u32;
    let by_height = |height: u32| (f64::from(height) * aspect) as u32;

    let (mut width, mut height) = match (limits.cols, limits.rows) {
        (Some(cols), Some(rows)) => (scale(cols, cell.width), scale(rows, cell.height)),
        (Some(cols), None) => {
            let width = scale(cols, cell.width);
            let mut height = by_width(width);
            if let Some(max_rows) = limits.max_rows {
                height = height.min(scale(max_rows, cell.height));
            }
            (width, height)
        }
        (None, Some(rows)) => {
            let height = scale(rows, cell.height);
            let mut width = by_height(height);
            if let Some(max_cols) = limits.max_cols {
                width = width.min(scale(max_cols, cell.width));
            }
            (width, height)
        }
        (None, None) => {
            let (width, height) = match (limits.max_cols, limits.max_rows) {
                (Some(max_cols), Some(max_rows)) => {
                    let max_width = scale(max_cols, cell.width);
                    let max_height = scale(max_rows, cell.height);
                    if aspect > f64::from(max_width) / f64::from(max_height.max(1)) {
                        let width = image_width.min(max_width);
                        (width, by_width(width))
                    } else {
                        let height = image_height.min(max_height);
                        (by_height(height), height)
                    }
                }
                (Some(max_cols), None) => {
                    let width = image_width.min(scale(max_cols, cell.width));
                    (width, by_width(width))
                }
                (None, Some(max_rows)) => {
                    let height = image_height.min(scale(max_rows, cell.height));
                    (by_height(height), height)
                }
                (None, None) => (image_width, image_height),
            };

            if image_width <= width && image_height <= height {
                (image_width, image_height)
            } else {
                (width, height)
            }
        }
    };

    width = width.max(cell.width);
    height = height.max(cell.height);
    PixelGrid { width, height }
}

/// Whole cells covered by `pixels`
pub fn cells_for(pixels: PixelGrid, cell: CellSize) -> CellGrid {
    CellGrid {
        cols: pixels.width / cell.width.max(1),
        rows: pixels.height / cell.height.max(1),
    }
}
