//! Async trade-logger stage.
//!
//! The matching engine runs on a pinned sync thread and cannot afford to
//! block on file or network I/O; this crate bridges its `Ring<Event>`
//! output to an async sink on a tokio task, polling the ring on an
//! interval and draining everything outstanding on shutdown.

mod collector;
mod format;
mod sink;

pub use collector::{AsyncTradeLogger, LoggerConfig, LoggerError};
pub use format::format_event;
pub use sink::{FileSink, SinkError, StdoutSink, TradeSink, TradeSinkBoxed};
