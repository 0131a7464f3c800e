use hermes_book::BookConfig;
use hermes_ring::Config as RingConfig;
use std::time::Duration;

/// Core assignments for the pipeline's pinned OS threads. `None` leaves
/// that stage unpinned (the scheduler picks).
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreAssignment {
    pub ingress: Option<usize>,
    pub sequencer: Option<usize>,
    pub matcher: Option<usize>,
}

/// Top-level configuration for one pipeline instance, assembled at
/// startup from CLI flags (see `bin/hermes.rs`) or programmatically in
/// tests.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Config shared by the three inter-stage rings (R1 ingress->sequencer,
    /// R2 sequencer->matcher); the logger ring is sized separately since
    /// its items (`LogEvent`) are far larger than a `RingItem`.
    pub ring: RingConfig,
    /// Capacity (power-of-two ring bits) for the matcher->logger ring.
    pub log_ring: RingConfig,
    /// Sequencer reorder-window size, in frames (must be a power of two).
    pub sequencer_window: usize,
    pub book: BookConfig,
    pub cores: CoreAssignment,
    /// Idle backoff for stages with no blocking read of their own
    /// (the sequencer and matcher poll their input ring; ingress blocks
    /// on its feed source instead, see `FeedSource`).
    pub idle_sleep: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ring: RingConfig::default(),
            log_ring: RingConfig::default(),
            sequencer_window: 1024,
            book: BookConfig::default(),
            cores: CoreAssignment::default(),
            idle_sleep: Duration::from_micros(100),
        }
    }
}
