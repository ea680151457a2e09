// ABOUTME: Terminal geometry in cells and pixels used to size images
// ABOUTME: Reads the window size through crossterm and derives the cell size

use super::sizing::CellSize;
use anyhow::{Result, anyhow};
use crossterm::terminal::window_size;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalGeometry {
    pub cols: u16,
    pub rows: u16,
    pub width: u16,
    pub height: u16,
}

impl TerminalGeometry {
    /// Detect current terminal geometry. Fails when any extent is unknown.
    pub fn detect() -> Result<Self> {
        let size = window_size().map_err(|e| anyhow!("Failed to get terminal size: {}", e))?;
        let geometry = Self::new(size.columns, size.rows, size.width, size.height)?;

        log::debug!(
            "Terminal size: {}x{} cells, {}x{} pixels",
            geometry.cols,
            geometry.rows,
            geometry.width,
            geometry.height
        );
        Ok(geometry)
    }

    pub fn new(cols: u16, rows: u16, width: u16, height: u16) -> Result<Self> {
        if cols == 0 || rows == 0 || width == 0 || height == 0 {
            return Err(anyhow!(
                "Failed to get terminal dimensions: {}x{} cells, {}x{} pixels",
                cols,
                rows,
                width,
                height
            ));
        }
        Ok(Self {
            cols,
            rows,
            width,
            height,
        })
    }

    pub fn cell_size(&self) -> CellSize {
        CellSize {
            width: u32::from(self.width / self.cols).max(1),
            height: u32::from(self.height / self.rows).max(1),
        }
    }
}
