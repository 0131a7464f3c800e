use thiserror::Error;

/// Unrecoverable startup/runtime failures: the kind that should abort
/// the process rather than be handled at a call site. Surfaced through
/// `anyhow` at `main`.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("failed to allocate book arena: {0}")]
    ArenaInit(String),

    #[error("failed to open feed source: {0}")]
    FeedInit(String),

    #[error("logger shutdown failed: {0}")]
    LoggerShutdown(String),

    #[error("failed to spawn {stage} thread: {source}")]
    ThreadSpawn {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },
}
