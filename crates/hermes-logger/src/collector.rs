use crate::format::format_event;
use crate::sink::{SinkError, TradeSinkBoxed};
use hermes_book::Event;
use hermes_ring::Ring;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("sink write failed: {0}")]
    Sink(#[from] SinkError),
    #[error("consumer task panicked: {0}")]
    TaskPanicked(String),
}

/// Configuration for the async trade-logger stage.
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    /// How often the consumer task polls the ring for new events.
    pub poll_interval: Duration,
    /// Maximum events drained off the ring per poll, to bound how long
    /// a single tick can hold up the task's event loop.
    pub max_drain_per_poll: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            max_drain_per_poll: 10_000,
        }
    }
}

/// Bridges the matcher's sync `Ring<Event>` output with an async sink.
///
/// The ring is strictly SPSC: the matcher thread is the sole producer,
/// this collector's consumer task is the sole consumer. There is no
/// producer-registration step because there is exactly one producer by
/// construction.
pub struct AsyncTradeLogger {
    consumer_task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AsyncTradeLogger {
    /// Spawns the consumer task. `ring` must outlive the logger (an
    /// `Arc` is the usual choice, shared with the matcher stage).
    #[must_use]
    pub fn spawn(ring: Arc<Ring<Event>>, sink: Arc<dyn TradeSinkBoxed>, config: LoggerConfig) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let consumer_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.poll_interval);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        drain_and_write(&ring, &sink, config.max_drain_per_poll).await;
                    }
                    _ = &mut shutdown_rx => {
                        drain_and_write(&ring, &sink, usize::MAX).await;
                        break;
                    }
                }
            }
        });

        Self {
            consumer_task: Some(consumer_task),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Signals the consumer task to drain whatever remains and stop.
    pub async fn shutdown(mut self) -> Result<(), LoggerError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.consumer_task.take() {
            task.await.map_err(|e| LoggerError::TaskPanicked(e.to_string()))?;
        }
        Ok(())
    }
}

async fn drain_and_write(ring: &Ring<Event>, sink: &Arc<dyn TradeSinkBoxed>, limit: usize) {
    let mut drained = 0;
    while drained < limit {
        let Some(event) = ring.pop() else {
            break;
        };
        let line = format_event(OffsetDateTime::now_utc(), &event);
        if let Err(err) = sink.write_line_boxed(line).await {
            tracing::warn!(error = %err, "trade logger sink write failed");
        }
        drained += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::TestSink;
    use hermes_book::Fee;
    use hermes_protocol::Side;
    use hermes_ring::Config;

    #[tokio::test]
    async fn drains_events_on_shutdown() {
        let ring = Arc::new(Ring::<Event>::new(Config::default()));
        let sink = Arc::new(TestSink::new());
        let logger = AsyncTradeLogger::spawn(Arc::clone(&ring), sink.clone(), LoggerConfig::default());

        for i in 0..5u64 {
            assert!(ring.push(Event::Listing {
                order_id: i,
                side: Side::Buy,
                qty: 10,
                fee: Fee(100),
            }));
        }

        logger.shutdown().await.unwrap();
        assert_eq!(sink.lines().len(), 5);
    }

    #[tokio::test]
    async fn drains_events_on_poll_interval() {
        let ring = Arc::new(Ring::<Event>::new(Config::default()));
        let sink = Arc::new(TestSink::new());
        let config = LoggerConfig {
            poll_interval: Duration::from_millis(10),
            max_drain_per_poll: 10_000,
        };
        let logger = AsyncTradeLogger::spawn(Arc::clone(&ring), sink.clone(), config);

        assert!(ring.push(Event::Trade {
            aggressor_id: 1,
            resting_id: 2,
            price: 100,
            qty: 5,
            fee: Fee(1),
        }));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.lines().len(), 1);

        logger.shutdown().await.unwrap();
    }
}
