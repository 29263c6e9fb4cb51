use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const THUMBNAIL_QUEUE: &str = "thumbnails";
pub const THUMBNAIL_WIDTHS: [u32; 3] = [500, 250, 100];

/// Queue payload. Fields stay optional so the worker re-checks presence at
/// process time instead of trusting whoever produced the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailJob {
    pub file_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl ThumbnailJob {
    pub fn new(file_id: Uuid, owner_id: Uuid) -> Self {
        Self { file_id: Some(file_id), owner_id: Some(owner_id) }
    }
}
