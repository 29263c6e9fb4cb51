use std::io::Cursor;
use std::sync::Arc;

use crate::api::error;
use crate::modules::file::repository::FileRepository;
use crate::modules::file::store::ContentStore;
use crate::modules::thumbnail::model::{ThumbnailJob, THUMBNAIL_WIDTHS};

#[derive(Clone)]
pub struct ThumbnailService {
    files: Arc<dyn FileRepository + Send + Sync>,
    store: ContentStore,
}

impl ThumbnailService {
    pub fn with_dependencies(
        files: Arc<dyn FileRepository + Send + Sync>,
        store: ContentStore,
    ) -> Self {
        log::info!("ThumbnailService initialized with dependencies");
        ThumbnailService { files, store }
    }

    /// Renders every configured width for one job. Variant references are
    /// deterministic, so a redelivered job overwrites its own output.
    pub async fn process(&self, job: &ThumbnailJob) -> Result<(), error::SystemError> {
        let file_id = job.file_id.ok_or(error::SystemError::MissingField("file_id"))?;
        let owner_id = job.owner_id.ok_or(error::SystemError::MissingField("owner_id"))?;

        // ownership is rechecked here: the record may have changed hands
        // or vanished since the job was produced
        let record = self
            .files
            .find_owned(&file_id, &owner_id)
            .await?
            .ok_or(error::SystemError::FileNotFound)?;

        let content_ref = record.content_ref.ok_or(error::SystemError::FileNotFound)?;

        let original = self.store.read(&content_ref).await?;

        let variants = tokio::task::spawn_blocking(move || render_variants(&original))
            .await
            .map_err(|e| error::SystemError::InternalError(Box::new(e)))??;

        let mut failures = 0usize;
        for (width, bytes) in variants {
            let reference = format!("{content_ref}_{width}");
            if let Err(e) = self.store.write(&reference, &bytes).await {
                log::error!("Failed to write variant {reference}: {e}");
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(error::SystemError::InternalError(
                format!("{failures} variant write(s) failed").into(),
            ));
        }

        Ok(())
    }
}

/// CPU-bound part, kept synchronous for `spawn_blocking`. Variants are
/// re-encoded in the source format and bounded by width, keeping aspect.
fn render_variants(original: &[u8]) -> Result<Vec<(u32, Vec<u8>)>, error::SystemError> {
    let format = image::guess_format(original)?;
    let source = image::load_from_memory_with_format(original, format)?;

    let mut variants = Vec::with_capacity(THUMBNAIL_WIDTHS.len());
    for width in THUMBNAIL_WIDTHS {
        let resized = source.thumbnail(width, u32::MAX);
        let mut encoded = Cursor::new(Vec::new());
        resized.write_to(&mut encoded, format)?;
        variants.push((width, encoded.into_inner()));
    }

    Ok(variants)
}
