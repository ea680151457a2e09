// ABOUTME: Unicode placeholder rendering that lets the terminal lay out an image as text cells
// ABOUTME: Encodes the image id as a true-color foreground and rows/columns as diacritics

use crate::constants::envelope::RESET_FOREGROUND;
use crate::diacritics::DIACRITICS;
use crate::types::ImageId;

/// Glyph the terminal replaces with a slice of the referenced image
pub const PLACEHOLDER: char = '\u{10EEEE}';

/// Largest row or column count a placeholder grid can address
pub const MAX_PLACEHOLDER_SPAN: usize = DIACRITICS.len();

/// Foreground escape carrying the image id in its 24 color bits
pub fn color_escape(image_id: ImageId) -> String {
    let (r, g, b) = image_id.rgb();
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

fn diacritic(index: usize) -> char {
    DIACRITICS[index.min(DIACRITICS.len() - 1)]
}

/// One line of placeholder cells per display row.
///
/// Only the first cell of a row carries explicit row and column marks; the
/// terminal infers the column of the following cells.
pub fn placeholder_lines(image_id: ImageId, cols: u32, rows: u32) -> Vec<String> {
    let color = color_escape(image_id);

    (0..rows as usize)
        .map(|row| {
            let mut line = String::with_capacity(color.len() + cols as usize * 4 + 16);
            line.push_str(&color);
            if cols > 0 {
                line.push(PLACEHOLDER);
                line.push(diacritic(row));
                line.push(diacritic(0));
                for _ in 1..cols {
                    line.push(PLACEHOLDER);
                }
            }
            line.push_str(RESET_FOREGROUND);
            line
        })
        .collect()
}
