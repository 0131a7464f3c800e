//! Lock-free single-producer single-consumer ring buffer.
//!
//! `Ring<T>` is the transport used between every pair of adjacent pipeline
//! stages: it is not an MPSC/MPMC primitive, and is unsound to share among
//! more than one producer or more than one consumer. Each stage boundary
//! gets its own dedicated `Ring`.
//!
//! # Example
//!
//! ```
//! use hermes_ring::{Config, Ring};
//!
//! let ring = Ring::<u64>::new(Config::default());
//! ring.push(42);
//!
//! let consumed = ring.consume_up_to(16, |item: &u64| {
//!     println!("received: {item}");
//! });
//! assert_eq!(consumed, 1);
//! ```

mod backoff;
mod config;
mod invariants;
mod metrics;
mod reservation;
mod ring;

pub use backoff::Backoff;
pub use config::{Config, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use metrics::{Metrics, MetricsSnapshot};
pub use reservation::Reservation;
pub use ring::Ring;
