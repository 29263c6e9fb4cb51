use std::sync::Arc;

use filevault::{
    ENV,
    configs::{connect_database, create_redis_pool},
    modules::{
        file::{repository_pg::FilePgRepository, store::ContentStore},
        thumbnail::{
            model::{THUMBNAIL_QUEUE, ThumbnailJob},
            service::ThumbnailService,
        },
    },
    queue::{QueueConfig, RedisJobQueue},
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;
    let redis_pool =
        create_redis_pool().map_err(|_| std::io::Error::other("Redis connection error"))?;

    let files = Arc::new(FilePgRepository::new(db_pool));
    let store = ContentStore::new(&ENV.folder_path);
    let thumbnails = ThumbnailService::with_dependencies(files, store);

    let queue = RedisJobQueue::new(redis_pool, QueueConfig::default());

    log::info!("Thumbnail worker consuming queue '{}'", THUMBNAIL_QUEUE);
    tokio::select! {
        result = queue.process(THUMBNAIL_QUEUE, |payload| {
            let thumbnails = thumbnails.clone();
            async move {
                let job: ThumbnailJob = serde_json::from_value(payload)?;
                thumbnails.process(&job).await
            }
        }) => {
            result.map_err(|e| std::io::Error::other(e.to_string()))?;
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Thumbnail worker shutting down");
        }
    }

    Ok(())
}
