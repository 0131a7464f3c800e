use crate::config::PipelineConfig;
use crate::error::FatalError;
use crate::feed::FeedSource;
use crate::stage;
use hermes_book::{Book, Event as LogEvent};
use hermes_logger::{AsyncTradeLogger, LoggerConfig, TradeSinkBoxed};
use hermes_protocol::RingItem;
use hermes_ring::Ring;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Owns the three pinned worker threads, their connecting rings, and
/// the async logger task. The sole shutdown mechanism is the shared
/// `running` flag (§5): each stage loop observes it and exits at its
/// next iteration, the orchestrator then joins the threads and signals
/// the logger to drain and stop.
pub struct Pipeline {
    running: Arc<AtomicBool>,
    ingress: JoinHandle<()>,
    sequencer: JoinHandle<()>,
    matcher: JoinHandle<()>,
    logger: AsyncTradeLogger,
}

impl Pipeline {
    /// Spawns every stage. `feed` supplies the ingress stage's raw
    /// frames; `sink` is where the logger writes rendered lines.
    ///
    /// # Errors
    /// Returns [`FatalError`] if the configuration can't be realized
    /// (an unusable resource limit) or if a stage thread fails to spawn
    /// or be pinned to its configured core.
    pub fn spawn(config: PipelineConfig, feed: Box<dyn FeedSource>, sink: Arc<dyn TradeSinkBoxed>) -> Result<Self, FatalError> {
        if config.book.max_resting_orders == 0 {
            return Err(FatalError::ArenaInit("max_resting_orders must be non-zero".into()));
        }

        let running = Arc::new(AtomicBool::new(true));
        let r1 = Arc::new(Ring::<RingItem>::new(config.ring));
        let r2 = Arc::new(Ring::<RingItem>::new(config.ring));
        let r3 = Arc::new(Ring::<LogEvent>::new(config.log_ring));
        let book = Book::new(config.book);

        let ingress = spawn_pinned("ingress", config.cores.ingress, {
            let running = Arc::clone(&running);
            let r1 = Arc::clone(&r1);
            let idle_sleep = config.idle_sleep;
            move || stage::run_ingress(&running, feed, &r1, idle_sleep)
        })?;

        let sequencer = spawn_pinned("sequencer", config.cores.sequencer, {
            let running = Arc::clone(&running);
            let r1 = Arc::clone(&r1);
            let r2 = Arc::clone(&r2);
            let window = config.sequencer_window;
            move || stage::run_sequencer(&running, &r1, &r2, window)
        })?;

        let matcher = spawn_pinned("matcher", config.cores.matcher, {
            let running = Arc::clone(&running);
            let r2 = Arc::clone(&r2);
            let r3 = Arc::clone(&r3);
            move || stage::run_matcher(&running, &r2, &r3, book)
        })?;

        let logger = AsyncTradeLogger::spawn(r3, sink, LoggerConfig::default());

        Ok(Self {
            running,
            ingress,
            sequencer,
            matcher,
            logger,
        })
    }

    /// Flips the running flag, joins the three worker threads, then
    /// signals the logger to drain and stop.
    ///
    /// # Errors
    /// Returns [`FatalError`] if a worker thread panicked.
    pub async fn shutdown(self) -> Result<(), FatalError> {
        self.running.store(false, Ordering::Release);

        for (stage, handle) in [("ingress", self.ingress), ("sequencer", self.sequencer), ("matcher", self.matcher)] {
            if handle.join().is_err() {
                tracing::error!(stage, "worker thread panicked during shutdown");
            }
        }

        self.logger
            .shutdown()
            .await
            .map_err(|e| FatalError::LoggerShutdown(e.to_string()))
    }
}

fn spawn_pinned<F>(stage: &'static str, core: Option<usize>, body: F) -> Result<JoinHandle<()>, FatalError>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new()
        .name(stage.to_string())
        .spawn(move || {
            if let Some(core_id) = core {
                if !core_affinity::set_for_current(core_affinity::CoreId { id: core_id }) {
                    tracing::warn!(stage, core_id, "failed to pin thread to requested core");
                }
            }
            body();
        })
        .map_err(|source| FatalError::ThreadSpawn { stage, source })
}
