// ABOUTME: Transmission media that carry pixel data from the client to the terminal
// ABOUTME: Inline (compressed base64), POSIX shared memory and temporary files, plus fallback

use crate::error::KgpError;
use crate::types::ImageId;
use std::fmt;
use std::str::FromStr;

pub mod direct;
pub mod shm;
pub mod temp_file;

pub use direct::DirectPayload;
pub use shm::SharedMemorySegment;
pub use temp_file::TempFilePayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediumKind {
    Direct,
    SharedMemory,
    TempFile,
}

impl MediumKind {
    /// Value of the `t` key
    pub fn identifier(self) -> char {
        match self {
            MediumKind::Direct => 'd',
            MediumKind::SharedMemory => 's',
            MediumKind::TempFile => 't',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediumKind::Direct => "Direct Transmission",
            MediumKind::SharedMemory => "Shared Memory Transmission",
            MediumKind::TempFile => "Temporary File Transmission",
        }
    }
}

impl fmt::Display for MediumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediumKind::Direct => "direct",
            MediumKind::SharedMemory => "shared-memory",
            MediumKind::TempFile => "temp-file",
        };
        f.write_str(name)
    }
}

impl FromStr for MediumKind {
    type Err = KgpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "d" | "direct" => Ok(MediumKind::Direct),
            "s" | "shm" | "shared" | "shared-memory" | "shared_memory" => {
                Ok(MediumKind::SharedMemory)
            }
            "t" | "temp" | "tempfile" | "temp-file" | "temp_file" => Ok(MediumKind::TempFile),
            _ => Err(KgpError::UnknownMedium(s.to_string())),
        }
    }
}

/// One medium instance per transfer.
///
/// Shared memory segments and temp files are owned by the instance until
/// `cleanup` runs. Dropping does not release them: the terminal may still
/// be reading after the frames were written.
#[derive(Debug)]
pub enum TransmissionMedium {
    Direct(DirectPayload),
    SharedMemory(SharedMemorySegment),
    TempFile(TempFilePayload),
}

impl TransmissionMedium {
    pub fn create(image_id: ImageId, data: &[u8], kind: MediumKind) -> Result<Self, KgpError> {
        let medium = match kind {
            MediumKind::Direct => TransmissionMedium::Direct(DirectPayload::new(data)?),
            MediumKind::SharedMemory => {
                TransmissionMedium::SharedMemory(SharedMemorySegment::create(image_id, data)?)
            }
            MediumKind::TempFile => TransmissionMedium::TempFile(TempFilePayload::create(data)?),
        };
        log::debug!(
            "Created {} medium for image {} ({} bytes)",
            kind,
            image_id,
            data.len()
        );
        Ok(medium)
    }

    pub fn kind(&self) -> MediumKind {
        match self {
            TransmissionMedium::Direct(_) => MediumKind::Direct,
            TransmissionMedium::SharedMemory(_) => MediumKind::SharedMemory,
            TransmissionMedium::TempFile(_) => MediumKind::TempFile,
        }
    }

    pub fn identifier(&self) -> char {
        self.kind().identifier()
    }

    /// Base64 text placed after the `;` of the first frame
    pub fn payload(&self) -> &str {
        match self {
            TransmissionMedium::Direct(direct) => direct.payload(),
            TransmissionMedium::SharedMemory(segment) => segment.payload(),
            TransmissionMedium::TempFile(file) => file.payload(),
        }
    }

    /// Whether the payload is zlib-compressed (`o=z`)
    pub fn compressed(&self) -> bool {
        matches!(self, TransmissionMedium::Direct(_))
    }

    /// Release out-of-band resources. Idempotent, never fails.
    pub fn cleanup(&mut self) {
        match self {
            TransmissionMedium::Direct(_) => {}
            TransmissionMedium::SharedMemory(segment) => segment.release(),
            TransmissionMedium::TempFile(file) => file.remove(),
        }
    }
}

/// Create the requested medium, retrying once with direct transmission.
pub fn create_with_fallback(
    image_id: ImageId,
    data: &[u8],
    kind: MediumKind,
) -> Result<TransmissionMedium, KgpError> {
    match TransmissionMedium::create(image_id, data, kind) {
        Ok(medium) => Ok(medium),
        Err(err) if kind != MediumKind::Direct && err.is_medium_failure() => {
            log::warn!(
                "Failed to initialize {} medium: {}. Retrying with direct transmission.",
                kind,
                err
            );
            TransmissionMedium::create(image_id, data, MediumKind::Direct).map_err(|e| {
                KgpError::MediumCreation(format!("direct transmission fallback failed: {}", e))
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serial_test::serial;

    #[test]
    fn test_medium_identifiers() {
        assert_eq!(MediumKind::Direct.identifier(), 'd');
        assert_eq!(MediumKind::SharedMemory.identifier(), 's');
        assert_eq!(MediumKind::TempFile.identifier(), 't');
    }

    #[test]
    fn test_medium_parsing() {
        assert_eq!("direct".parse::<MediumKind>().unwrap(), MediumKind::Direct);
        assert_eq!("d".parse::<MediumKind>().unwrap(), MediumKind::Direct);
        assert_eq!("SHM".parse::<MediumKind>().unwrap(), MediumKind::SharedMemory);
        assert_eq!(
            "shared-memory".parse::<MediumKind>().unwrap(),
            MediumKind::SharedMemory
        );
        assert_eq!("temp-file".parse::<MediumKind>().unwrap(), MediumKind::TempFile);
        assert!(matches!(
            "file".parse::<MediumKind>(),
            Err(KgpError::UnknownMedium(name)) if name == "file"
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in [MediumKind::Direct, MediumKind::SharedMemory, MediumKind::TempFile] {
            assert_eq!(kind.to_string().parse::<MediumKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_direct_medium_contract() {
        let id = ImageId::new(7).unwrap();
        let mut medium = TransmissionMedium::create(id, b"\x00\x00\x00\xff", MediumKind::Direct)
            .expect("direct medium never touches the filesystem");
        assert_eq!(medium.identifier(), 'd');
        assert!(medium.compressed());
        assert!(STANDARD.decode(medium.payload()).is_ok());
        medium.cleanup();
        medium.cleanup();
    }

    #[test]
    #[serial]
    fn test_temp_file_medium_contract() {
        let id = ImageId::new(8).unwrap();
        let mut medium = TransmissionMedium::create(id, b"pixels", MediumKind::TempFile).unwrap();
        assert_eq!(medium.identifier(), 't');
        assert!(!medium.compressed());

        let path = String::from_utf8(STANDARD.decode(medium.payload()).unwrap()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"pixels");

        medium.cleanup();
        assert!(!std::path::Path::new(&path).exists());
    }

    #[test]
    #[serial]
    fn test_shared_memory_medium_contract() {
        let id = ImageId::new(0xFE_0001).unwrap();
        let mut medium =
            TransmissionMedium::create(id, b"\x01\x02\x03", MediumKind::SharedMemory).unwrap();
        assert_eq!(medium.identifier(), 's');
        assert!(!medium.compressed());
        assert_eq!(
            STANDARD.decode(medium.payload()).unwrap(),
            b"kgp_16646145".to_vec()
        );
        medium.cleanup();
    }

    #[test]
    #[serial]
    fn test_fallback_keeps_working_medium() {
        let id = ImageId::new(9).unwrap();
        let mut medium = create_with_fallback(id, b"abc", MediumKind::TempFile).unwrap();
        assert_eq!(medium.kind(), MediumKind::TempFile);
        medium.cleanup();
    }

    #[test]
    #[serial]
    fn test_fallback_to_direct_when_temp_dir_is_unusable() {
        let original_tmpdir = std::env::var_os("TMPDIR");
        unsafe {
            std::env::set_var("TMPDIR", "/nonexistent/kgp-test-dir");
        }

        let id = ImageId::new(10).unwrap();
        let result = create_with_fallback(id, b"abc", MediumKind::TempFile);

        unsafe {
            if let Some(val) = original_tmpdir {
                std::env::set_var("TMPDIR", val);
            } else {
                std::env::remove_var("TMPDIR");
            }
        }

        let medium = result.expect("fallback to direct transmission should succeed");
        assert_eq!(medium.kind(), MediumKind::Direct);
        assert!(medium.compressed());
    }
}
