//! Pipeline orchestrator: wires the ingress, sequencer, and matcher
//! stages together over two `Ring<RingItem>` instances, plus an async
//! trade-logger task fed from a third `Ring<LogEvent>`.
//!
//! Stage lifecycle is entirely driven by one shared `Arc<AtomicBool>`
//! running flag — there are no per-operation timeouts. A stalled
//! producer backs its downstream ring up rather than losing data.

mod config;
mod error;
mod feed;
mod pipeline;
mod stage;

pub use config::{CoreAssignment, PipelineConfig};
pub use error::FatalError;
pub use feed::{ChannelFeedSource, FeedSource, NullFeedSource};
pub use pipeline::Pipeline;

/// Alias used at the pipeline's ring boundary between the matcher and
/// the trade logger.
pub type LogEvent = hermes_book::Event;

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_logger::StdoutSink;
    use hermes_ring::Config as RingConfig;
    use std::sync::Arc;
    use std::time::Duration;

    /// Small ring/window sizes so the smoke tests don't pay for the
    /// production defaults' multi-hundred-megabyte ring allocations.
    fn test_config() -> PipelineConfig {
        PipelineConfig {
            ring: RingConfig::new(6, false),     // 64 slots
            log_ring: RingConfig::new(6, false), // 64 slots
            sequencer_window: 16,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn pipeline_spawns_and_shuts_down_cleanly() {
        let sink = Arc::new(StdoutSink);
        let pipeline = Pipeline::spawn(test_config(), Box::new(NullFeedSource), sink).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        pipeline.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn pipeline_rejects_zero_capacity_book() {
        let config = PipelineConfig {
            book: hermes_book::BookConfig {
                max_resting_orders: 0,
                ..hermes_book::BookConfig::default()
            },
            ..test_config()
        };
        let sink = Arc::new(StdoutSink);
        let err = Pipeline::spawn(config, Box::new(NullFeedSource), sink).unwrap_err();
        assert!(matches!(err, FatalError::ArenaInit(_)));
    }
}
