use redis::AsyncCommands;
use redis::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::db::cache::{CacheStore, KEY_PREFIX};
use crate::error::AppResult;

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: Option<u64>,
}

/// Redis-backed cache store with an async write background task
#[derive(Clone)]
pub struct RedisStore {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
    ttl: Option<u64>,
}

/// Outcome of every write the writer task attempted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheWriterStats {
    pub written: usize,
    pub failed: usize,
}

impl CacheWriterStats {
    fn record(&mut self, result: AppResult<()>) {
        match result {
            Ok(()) => self.written += 1,
            Err(e) => {
                tracing::error!(error = %e, "Failed to write to Redis cache");
                self.failed += 1;
            }
        }
    }
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<CacheWriterStats>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until every queued write has been attempted
    pub async fn shutdown(self) -> CacheWriterStats {
        let _ = self.shutdown_tx.send(()).await;

        match self.task.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Cache writer task panicked");
                CacheWriterStats::default()
            }
        }
    }
}

impl RedisStore {
    /// Creates a store and spawns the task that performs its writes
    ///
    /// `ttl` of `None` keeps entries until the next catalog reload clears them.
    pub fn new(redis_client: Client, ttl: Option<u64>) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(Self::cache_writer_task(client, write_rx, shutdown_rx));

        let store = Self {
            redis_client,
            write_tx,
            ttl,
        };

        (store, CacheWriterHandle { shutdown_tx, task })
    }

    /// Drains write messages into Redis; on shutdown, flushes what is queued and exits
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> CacheWriterStats {
        tracing::info!("Cache writer task started");
        let mut stats = CacheWriterStats::default();

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    stats.record(Self::write_to_redis(&client, msg).await);
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    while let Some(msg) = write_rx.recv().await {
                        stats.record(Self::write_to_redis(&client, msg).await);
                    }

                    tracing::info!(written = stats.written, failed = stats.failed, "Cache writer task stopped");
                    break;
                }
            }
        }

        stats
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        match msg.ttl {
            Some(ttl) => {
                let _: () = conn.set_ex(msg.key, msg.value, ttl).await?;
            }
            None => {
                let _: () = conn.set(msg.key, msg.value).await?;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached)
    }

    fn set(&self, key: String, value: String) {
        let msg = CacheWriteMessage {
            key,
            value,
            ttl: self.ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }

    async fn clear(&self) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter: redis::AsyncIter<String> =
                conn.scan_match(format!("{}*", KEY_PREFIX)).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        if !keys.is_empty() {
            let _: () = conn.del(&keys).await?;
        }

        tracing::debug!(removed = keys.len(), "Cleared Redis metadata entries");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
