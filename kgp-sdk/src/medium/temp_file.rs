// ABOUTME: Temporary file transmission medium passing a file path to the terminal
// ABOUTME: The file is persisted past drop and removed explicitly by the creator

use crate::constants::limits::RESOURCE_PREFIX;
use crate::error::KgpError;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct TempFilePayload {
    path: PathBuf,
    payload: String,
    removed: bool,
}

impl TempFilePayload {
    pub fn create(data: &[u8]) -> Result<Self, KgpError> {
        let mut file = tempfile::Builder::new()
            .prefix(RESOURCE_PREFIX)
            .tempfile()
            .map_err(|e| KgpError::MediumCreation(format!("Failed to create temp file: {}", e)))?;

        file.write_all(data)
            .and_then(|_| file.flush())
            .map_err(|e| KgpError::MediumCreation(format!("Failed to write temp file: {}", e)))?;

        let (_, path) = file
            .keep()
            .map_err(|e| KgpError::MediumCreation(format!("Failed to persist temp file: {}", e)))?;

        let payload = STANDARD.encode(path.as_os_str().as_bytes());
        Ok(Self {
            path,
            payload,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed temp file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::debug!(
                "Ignoring failure to remove temp file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
