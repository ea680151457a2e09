// ABOUTME: Inline transmission medium that embeds data inside the escape sequence
// ABOUTME: Data is zlib-compressed then base64-encoded since it travels over the tty

use crate::error::KgpError;
use base64::{Engine, engine::general_purpose::STANDARD};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct DirectPayload {
    payload: String,
}

impl DirectPayload {
    pub fn new(data: &[u8]) -> Result<Self, KgpError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        Ok(Self {
            payload: STANDARD.encode(compressed),
        })
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}
