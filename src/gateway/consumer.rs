//! Consumer loop: fetch a batch of updates, dispatch every event in order,
//! advance the offset, repeat.

use habitbot_core::{
    config::TelegramConfig,
    error::BotError,
    event::translate,
    traits::{EventProcessor, UpdateSource},
    update::Update,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of one fetch-and-drain cycle.
#[derive(Debug)]
pub enum Poll {
    /// No new updates.
    Empty,
    /// A batch was drained; `failed` of its `events` returned an error.
    Drained { events: usize, failed: usize },
    /// The fetch itself failed. The offset did not move.
    Failed(BotError),
}

/// The only reader of the update offset.
pub struct Consumer {
    source: Arc<dyn UpdateSource>,
    processor: Arc<dyn EventProcessor>,
    offset: i64,
    batch_size: usize,
    idle_backoff: Duration,
    max_backoff: Duration,
}

impl Consumer {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        processor: Arc<dyn EventProcessor>,
        config: &TelegramConfig,
    ) -> Self {
        Self {
            source,
            processor,
            offset: 0,
            batch_size: config.batch_size.max(1),
            idle_backoff: config.idle_backoff(),
            max_backoff: config.max_backoff(),
        }
    }

    #[cfg(test)]
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Run until `cancel` fires. Fetch failures never end the loop.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("consumer loop started (batch size {})", self.batch_size);
        let mut backoff = self.idle_backoff;

        loop {
            // Only the wait for updates is cancellable; a fetched batch is
            // always drained so the offset stays consistent.
            let fetched = tokio::select! {
                _ = cancel.cancelled() => break,
                fetched = self.source.fetch(self.offset, self.batch_size) => fetched,
            };

            let pause = match self.drain(fetched).await {
                Poll::Empty => {
                    backoff = self.idle_backoff;
                    self.idle_backoff
                }
                Poll::Drained { events, failed } => {
                    debug!(
                        "drained {events} events ({failed} failed), offset now {}",
                        self.offset
                    );
                    backoff = self.idle_backoff;
                    continue;
                }
                Poll::Failed(e) => {
                    if e.is_retryable() {
                        warn!("{e} (retry in {}ms)", backoff.as_millis());
                    } else {
                        error!("{e} (retry in {}ms)", backoff.as_millis());
                    }
                    let pause = backoff;
                    backoff = (backoff * 2).min(self.max_backoff);
                    pause
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }
        info!("consumer loop stopped at offset {}", self.offset);
    }

    /// One fetch-and-drain cycle without pausing.
    #[cfg(test)]
    pub async fn poll_once(&mut self) -> Poll {
        let fetched = self.source.fetch(self.offset, self.batch_size).await;
        self.drain(fetched).await
    }

    async fn drain(&mut self, fetched: Result<Vec<Update>, BotError>) -> Poll {
        let mut updates = match fetched {
            Ok(updates) if updates.is_empty() => return Poll::Empty,
            Ok(updates) => updates,
            Err(e) => return Poll::Failed(e),
        };
        updates.sort_by_key(|u| u.id);

        let mut failed = 0;
        for update in &updates {
            let event = translate(update);
            if let Err(e) = self.processor.process(event).await {
                warn!("update {}: {e}", update.id);
                failed += 1;
            }
        }

        if let Some(last) = updates.last() {
            self.offset = self.offset.max(last.id + 1);
        }
        Poll::Drained {
            events: updates.len(),
            failed,
        }
    }
}
