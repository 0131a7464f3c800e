use anyhow::Context;
use clap::Parser;
use hermes_book::BookConfig;
use hermes_pipeline::{CoreAssignment, NullFeedSource, Pipeline, PipelineConfig};
use hermes_ring::Config as RingConfig;
use std::sync::Arc;
use std::time::Duration;

/// Market-data ingestion, sequencing, and matching pipeline.
///
/// This binary wires up the pinned ingress/sequencer/matcher threads
/// and the async trade logger, then runs until interrupted. The live
/// multicast feed reader is out of scope for this build; it starts
/// with an empty feed, suitable for exercising the rest of the
/// pipeline's startup/shutdown and for attaching a `FeedSource`
/// implementation in embedding code.
#[derive(Parser, Debug)]
#[command(name = "hermes", about, version)]
struct Args {
    /// Ring buffer size for the ingress->sequencer and sequencer->matcher
    /// rings, as a power of two (e.g. 16 = 65,536 slots).
    #[arg(long, default_value_t = 16)]
    ring_bits: u8,

    /// Ring buffer size for the matcher->logger ring, as a power of two.
    #[arg(long, default_value_t = 14)]
    log_ring_bits: u8,

    /// Sequencer reorder-window size in frames (must be a power of two).
    #[arg(long, default_value_t = 1024)]
    sequencer_window: usize,

    /// Maximum resting price levels per side.
    #[arg(long, default_value_t = 1024)]
    max_levels_per_side: usize,

    /// Maximum resting orders at a single price level.
    #[arg(long, default_value_t = 2048)]
    max_orders_per_level: usize,

    /// Maximum total resting orders across the whole book.
    #[arg(long, default_value_t = 1_000_000)]
    max_resting_orders: usize,

    /// Largest order id the book will accept.
    #[arg(long, default_value_t = 1_000_000)]
    max_order_id: u64,

    /// Flat listing fee charged on every accepted order, in price ticks.
    #[arg(long, default_value_t = 100)]
    listing_fee_ticks: u64,

    /// Transaction fee rate in basis points, applied per trade.
    #[arg(long, default_value_t = 100)]
    fee_bps: u64,

    /// CPU core to pin the ingress thread to.
    #[arg(long)]
    ingress_core: Option<usize>,

    /// CPU core to pin the sequencer thread to.
    #[arg(long)]
    sequencer_core: Option<usize>,

    /// CPU core to pin the matcher thread to.
    #[arg(long)]
    matcher_core: Option<usize>,

    /// Idle backoff sleep for stages without their own blocking read,
    /// in microseconds.
    #[arg(long, default_value_t = 100)]
    idle_sleep_micros: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = PipelineConfig {
        ring: RingConfig::new(args.ring_bits, true),
        log_ring: RingConfig::new(args.log_ring_bits, true),
        sequencer_window: args.sequencer_window,
        book: BookConfig {
            max_levels_per_side: args.max_levels_per_side,
            max_orders_per_level: args.max_orders_per_level,
            max_resting_orders: args.max_resting_orders,
            max_order_id: args.max_order_id,
            listing_fee_ticks: args.listing_fee_ticks,
            fee_bps: args.fee_bps,
        },
        cores: CoreAssignment {
            ingress: args.ingress_core,
            sequencer: args.sequencer_core,
            matcher: args.matcher_core,
        },
        idle_sleep: Duration::from_micros(args.idle_sleep_micros),
    };

    let sink = Arc::new(hermes_logger::StdoutSink);
    let pipeline = Pipeline::spawn(config, Box::new(NullFeedSource), sink).context("failed to start pipeline")?;

    tracing::info!("hermes pipeline running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;

    tracing::info!("shutdown requested");
    pipeline.shutdown().await.context("pipeline shutdown failed")?;
    Ok(())
}
