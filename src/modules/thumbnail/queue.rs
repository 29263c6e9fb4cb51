use crate::api::error;
use crate::modules::thumbnail::model::{ThumbnailJob, THUMBNAIL_QUEUE};
use crate::queue::RedisJobQueue;

/// Producer-side seam. The upload path only needs "hand this job off";
/// everything else about delivery lives in the queue implementation.
#[async_trait::async_trait]
pub trait ThumbnailQueue {
    async fn submit(&self, job: &ThumbnailJob) -> Result<(), error::SystemError>;
}

#[async_trait::async_trait]
impl ThumbnailQueue for RedisJobQueue {
    async fn submit(&self, job: &ThumbnailJob) -> Result<(), error::SystemError> {
        self.enqueue(THUMBNAIL_QUEUE, serde_json::to_value(job)?).await
    }
}
