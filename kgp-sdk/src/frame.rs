// ABOUTME: Frame encoder splitting a payload into APC graphics command frames
// ABOUTME: Handles chunking, continuation flags and the byte-exact envelope

use crate::constants::envelope::{APC_CLOSE, APC_OPEN};
use crate::error::KgpError;
use crate::types::ImageId;
use std::fmt;

/// One graphics command: `ESC _ G <control> ; <chunk> ESC \`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Full option string, present on the first frame only
    pub options: Option<&'a str>,
    /// `Some(true)` for `m=1`, `Some(false)` for `m=0`, `None` when unchunked
    pub more: Option<bool>,
    pub chunk: &'a str,
}

impl<'a> Frame<'a> {
    pub fn single(options: &'a str, chunk: &'a str) -> Self {
        Self {
            options: Some(options),
            more: None,
            chunk,
        }
    }

    pub fn is_last(&self) -> bool {
        self.more != Some(true)
    }
}

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(APC_OPEN)?;
        match (self.options, self.more) {
            (Some(options), None) => f.write_str(options)?,
            (Some(options), Some(more)) => write!(f, "{},m={}", options, u8::from(more))?,
            (None, Some(more)) => write!(f, "m={}", u8::from(more))?,
            (None, None) => {}
        }
        write!(f, ";{}{}", self.chunk, APC_CLOSE)
    }
}

/// Split `payload` into frames of at most `chunk_size` payload bytes.
pub fn split_frames<'a>(
    payload: &'a str,
    options: &'a str,
    chunk_size: usize,
) -> Result<Vec<Frame<'a>>, KgpError> {
    if chunk_size == 0 {
        return Err(KgpError::Configuration(
            "Chunk size must be a positive integer".to_string(),
        ));
    }

    if payload.len() <= chunk_size {
        return Ok(vec![Frame::single(options, payload)]);
    }

    // Base64 payloads are ASCII, so any byte offset is a char boundary.
    let chunks: Result<Vec<&str>, _> = payload
        .as_bytes()
        .chunks(chunk_size)
        .map(std::str::from_utf8)
        .collect();
    let chunks = chunks.map_err(|e| {
        KgpError::Configuration(format!("Payload is not chunkable ASCII text: {}", e))
    })?;

    let last = chunks.len() - 1;
    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Frame {
            options: (i == 0).then_some(options),
            more: Some(i != last),
            chunk,
        })
        .collect())
}

/// Render every frame of a transfer, in order.
pub fn encode_frames(
    payload: &str,
    options: &str,
    chunk_size: usize,
) -> Result<Vec<String>, KgpError> {
    Ok(split_frames(payload, options, chunk_size)?
        .iter()
        .map(Frame::to_string)
        .collect())
}

/// Delete the image and free its data in the terminal
pub fn delete_sequence(image_id: ImageId) -> String {
    format!("{}a=d,d=i,i={}{}", APC_OPEN, image_id, APC_CLOSE)
}
