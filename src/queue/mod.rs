//! Redis-backed job queue shared by the HTTP server (producer) and the
//! background worker (consumer). Delivery is at-least-once: a job is moved to
//! a processing list while it runs and re-enqueued if its consumer dies.

use std::future::Future;
use std::time::Duration;

use deadpool_redis::redis::{AsyncCommands, Direction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::SystemError;

#[derive(Clone, Copy, Debug)]
pub struct QueueConfig {
    /// Seconds a delivery poll blocks before the loop comes back around.
    pub poll_timeout_secs: f64,
    /// Deliveries before a job is parked on the failed list.
    pub max_attempts: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { poll_timeout_secs: 5.0, max_attempts: 3 }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JobEnvelope {
    pub id: Uuid,
    pub attempts: u32,
    pub payload: serde_json::Value,
}

fn pending_key(queue: &str) -> String {
    format!("{queue}:pending")
}

fn processing_key(queue: &str) -> String {
    format!("{queue}:processing")
}

fn failed_key(queue: &str) -> String {
    format!("{queue}:failed")
}

pub struct RedisJobQueue {
    pool: deadpool_redis::Pool,
    config: QueueConfig,
}

impl RedisJobQueue {
    pub fn new(pool: deadpool_redis::Pool, config: QueueConfig) -> Self {
        Self { pool, config }
    }

    pub async fn enqueue(
        &self,
        queue: &str,
        payload: serde_json::Value,
    ) -> Result<(), SystemError> {
        let envelope = JobEnvelope { id: Uuid::now_v7(), attempts: 0, payload };
        let serialized = serde_json::to_vec(&envelope)?;

        let mut conn = self.pool.get().await?;
        conn.lpush::<_, _, ()>(pending_key(queue), serialized).await?;

        Ok(())
    }

    /// Jobs left on the processing list belong to a consumer that died
    /// mid-flight. Push them back so the next poll delivers them first.
    async fn requeue_in_flight(&self, queue: &str) -> Result<(), SystemError> {
        let mut conn = self.pool.get().await?;
        let mut recovered = 0usize;

        loop {
            let moved: Option<Vec<u8>> = conn
                .lmove(
                    processing_key(queue),
                    pending_key(queue),
                    Direction::Right,
                    Direction::Right,
                )
                .await?;
            if moved.is_none() {
                break;
            }
            recovered += 1;
        }

        if recovered > 0 {
            log::warn!("Requeued {recovered} in-flight job(s) on '{queue}'");
        }
        Ok(())
    }

    /// Consumes `queue` until the task is dropped. Each job moves onto the
    /// processing list while `handler` runs, is removed on success, and goes
    /// back to pending with a bumped attempt count on failure. Handlers must
    /// tolerate redelivery.
    pub async fn process<F, Fut>(&self, queue: &str, handler: F) -> Result<(), SystemError>
    where
        F: Fn(serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(), SystemError>>,
    {
        self.requeue_in_flight(queue).await?;

        let pending = pending_key(queue);
        let processing = processing_key(queue);
        let failed = failed_key(queue);
        let poll = Duration::from_secs_f64(self.config.poll_timeout_secs);

        loop {
            let mut conn = match self.pool.get().await {
                Ok(conn) => conn,
                Err(e) => {
                    log::error!("Queue '{queue}' lost Redis: {e}");
                    tokio::time::sleep(poll).await;
                    continue;
                }
            };

            let raw: Option<Vec<u8>> = match conn
                .blmove(
                    &pending,
                    &processing,
                    Direction::Right,
                    Direction::Left,
                    self.config.poll_timeout_secs,
                )
                .await
            {
                Ok(raw) => raw,
                Err(e) => {
                    log::error!("Queue '{queue}' delivery failed: {e}");
                    tokio::time::sleep(poll).await;
                    continue;
                }
            };

            let Some(raw) = raw else {
                // poll timeout, nothing pending
                continue;
            };

            let envelope: JobEnvelope = match serde_json::from_slice(&raw) {
                Ok(envelope) => envelope,
                Err(e) => {
                    log::error!("Queue '{queue}' parked an unreadable envelope: {e}");
                    let _ = conn.lrem::<_, _, ()>(&processing, 1, &raw).await;
                    let _ = conn.lpush::<_, _, ()>(&failed, &raw).await;
                    continue;
                }
            };

            let result = handler(envelope.payload.clone()).await;

            if let Err(e) = conn.lrem::<_, _, ()>(&processing, 1, &raw).await {
                log::error!("Queue '{queue}' failed to ack job {}: {e}", envelope.id);
            }

            match result {
                Ok(()) => log::info!("Queue '{queue}' completed job {}", envelope.id),
                Err(e) => {
                    let attempts = envelope.attempts + 1;
                    if attempts < self.config.max_attempts {
                        log::warn!(
                            "Queue '{queue}' job {} failed on attempt {attempts}: {e}",
                            envelope.id
                        );
                        let retry = JobEnvelope { attempts, ..envelope };
                        match serde_json::to_vec(&retry) {
                            Ok(serialized) => {
                                if let Err(e) =
                                    conn.lpush::<_, _, ()>(&pending, serialized).await
                                {
                                    log::error!(
                                        "Queue '{queue}' failed to re-enqueue job {}: {e}",
                                        retry.id
                                    );
                                }
                            }
                            Err(e) => {
                                log::error!(
                                    "Queue '{queue}' failed to serialize retry for job {}: {e}",
                                    retry.id
                                );
                            }
                        }
                    } else {
                        log::error!(
                            "Queue '{queue}' job {} parked after {attempts} attempts: {e}",
                            envelope.id
                        );
                        let _ = conn.lpush::<_, _, ()>(&failed, &raw).await;
                    }
                }
            }
        }
    }
}
