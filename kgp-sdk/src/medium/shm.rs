// ABOUTME: POSIX shared memory transmission medium named after the image id
// ABOUTME: Bounded create-or-reuse algorithm handling stale and raced segments

use crate::constants::limits::{RESOURCE_PREFIX, SHM_CREATE_ATTEMPTS};
use crate::error::KgpError;
use crate::types::ImageId;
use base64::{Engine, engine::general_purpose::STANDARD};
use memmap2::MmapMut;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::{shm_open, shm_unlink};
use nix::sys::stat::Mode;
use std::fs::File;

/// Segment name the terminal receives, derived only from the image id
pub fn segment_name(image_id: ImageId) -> String {
    format!("{}{}", RESOURCE_PREFIX, image_id)
}

fn object_path(name: &str) -> String {
    format!("/{}", name)
}

#[derive(Debug)]
pub struct SharedMemorySegment {
    name: String,
    payload: String,
    released: bool,
}

/// Named segment operations used by the create-or-reuse loop
trait SegmentStore {
    /// Create the segment, failing with `EEXIST` when the name is taken
    fn create_exclusive(&self, path: &str) -> nix::Result<File>;

    fn open_existing(&self, path: &str) -> nix::Result<File>;

    fn unlink(&self, path: &str);
}

struct PosixShm;

impl SegmentStore for PosixShm {
    fn create_exclusive(&self, path: &str) -> nix::Result<File> {
        let flags = OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR;
        shm_open(path, flags, Mode::S_IRUSR | Mode::S_IWUSR).map(File::from)
    }

    fn open_existing(&self, path: &str) -> nix::Result<File> {
        shm_open(path, OFlag::O_RDWR, Mode::empty()).map(File::from)
    }

    fn unlink(&self, path: &str) {
        unlink(path);
    }
}

impl SharedMemorySegment {
    pub fn create(image_id: ImageId, data: &[u8]) -> Result<Self, KgpError> {
        Self::create_in(&PosixShm, image_id, data)
    }

    fn create_in<S: SegmentStore>(
        store: &S,
        image_id: ImageId,
        data: &[u8],
    ) -> Result<Self, KgpError> {
        let name = segment_name(image_id);
        let path = object_path(&name);

        for attempt in 1..=SHM_CREATE_ATTEMPTS {
            match store.create_exclusive(&path) {
                Ok(file) => {
                    let written = file
                        .set_len(data.len() as u64)
                        .map_err(KgpError::from)
                        .and_then(|_| write_prefix(&file, data));
                    if let Err(e) = written {
                        store.unlink(&path);
                        return Err(KgpError::MediumCreation(format!(
                            "Failed to fill shared memory segment {}: {}",
                            name, e
                        )));
                    }
                    return Ok(Self::new(name));
                }
                Err(Errno::EEXIST) => {
                    let file = match store.open_existing(&path) {
                        Ok(file) => file,
                        Err(Errno::ENOENT) => {
                            log::debug!(
                                "Shared memory segment {} vanished before reopen (attempt {})",
                                name,
                                attempt
                            );
                            continue;
                        }
                        Err(e) => {
                            return Err(KgpError::MediumCreation(format!(
                                "Failed to open existing shared memory segment {}: {}",
                                name, e
                            )));
                        }
                    };

                    let capacity = file.metadata()?.len();
                    if capacity < data.len() as u64 {
                        log::debug!(
                            "Shared memory segment {} is stale ({} < {} bytes), recreating",
                            name,
                            capacity,
                            data.len()
                        );
                        drop(file);
                        store.unlink(&path);
                        continue;
                    }

                    if let Err(e) = write_prefix(&file, data) {
                        drop(file);
                        store.unlink(&path);
                        log::debug!("Dropping unusable shared memory segment {}: {}", name, e);
                        continue;
                    }
                    log::debug!("Reusing shared memory segment {} ({} bytes)", name, capacity);
                    return Ok(Self::new(name));
                }
                Err(e) => {
                    return Err(KgpError::MediumCreation(format!(
                        "Failed to create shared memory segment {}: {}",
                        name, e
                    )));
                }
            }
        }

        Err(KgpError::MediumCreation(format!(
            "Could not initialize shared memory segment {} after {} attempts",
            name, SHM_CREATE_ATTEMPTS
        )))
    }

    fn new(name: String) -> Self {
        let payload = STANDARD.encode(name.as_bytes());
        Self {
            name,
            payload,
            released: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        unlink(&object_path(&self.name));
    }
}

/// Overwrite the first `data.len()` bytes of the segment
fn write_prefix(file: &File, data: &[u8]) -> Result<(), KgpError> {
    if data.is_empty() {
        return Ok(());
    }
    // SAFETY: only this process writes the segment and the terminal only
    // reads it, so no other writer can alias the mapping.
    let mut map = unsafe { MmapMut::map_mut(file)? };
    map[..data.len()].copy_from_slice(data);
    map.flush()?;
    Ok(())
}

fn unlink(path: &str) {
    match shm_unlink(path) {
        Ok(()) => log::debug!("Unlinked shared memory segment {}", path),
        Err(Errno::ENOENT) => {}
        Err(e) => log::debug!("Ignoring failure to unlink {}: {}", path, e),
    }
}
