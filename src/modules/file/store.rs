use std::path::{Path, PathBuf};

use crate::api::error;

/// Flat directory of opaque blobs addressed by reference. References come
/// from the metadata layer; the store never invents or enumerates them.
#[derive(Clone)]
pub struct ContentStore {
    base: PathBuf,
}

impl ContentStore {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self { base: base.as_ref().to_path_buf() }
    }

    fn path_for(&self, reference: &str) -> PathBuf {
        self.base.join(reference)
    }

    pub async fn write(&self, reference: &str, bytes: &[u8]) -> Result<(), error::SystemError> {
        tokio::fs::create_dir_all(&self.base).await?;
        tokio::fs::write(self.path_for(reference), bytes).await?;
        Ok(())
    }

    /// A reference with no bytes behind it reads as `NotFound`, so dangling
    /// records surface like absent ones.
    pub async fn read(&self, reference: &str) -> Result<Vec<u8>, error::SystemError> {
        match tokio::fs::read(self.path_for(reference)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(error::SystemError::not_found("no content at reference"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
