use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(String),
}

/// Destination for rendered log lines.
///
/// Mirrors the exporter-trait split used elsewhere in this codebase:
/// a native-async trait for implementors, plus a boxed, object-safe
/// counterpart so the logger task can hold `dyn TradeSinkBoxed`.
pub trait TradeSink: Send + Sync {
    fn write_line(&self, line: String) -> impl Future<Output = Result<(), SinkError>> + Send;
}

pub trait TradeSinkBoxed: Send + Sync {
    fn write_line_boxed(&self, line: String) -> Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + '_>>;
}

impl<T: TradeSink> TradeSinkBoxed for T {
    fn write_line_boxed(&self, line: String) -> Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + '_>> {
        Box::pin(self.write_line(line))
    }
}

/// Writes every line to stdout.
pub struct StdoutSink;

impl TradeSink for StdoutSink {
    async fn write_line(&self, line: String) -> Result<(), SinkError> {
        println!("{line}");
        Ok(())
    }
}

/// Appends every line to a file, opened once and kept open for the
/// life of the sink.
pub struct FileSink {
    file: tokio::sync::Mutex<tokio::fs::File>,
}

impl FileSink {
    pub async fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self {
            file: tokio::sync::Mutex::new(file),
        })
    }
}

impl TradeSink for FileSink {
    async fn write_line(&self, line: String) -> Result<(), SinkError> {
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| SinkError::Io(e.to_string()))?;
        file.write_all(b"\n").await.map_err(|e| SinkError::Io(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
pub struct TestSink {
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl Default for TestSink {
    fn default() -> Self {
        Self {
            lines: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl TradeSink for TestSink {
    async fn write_line(&self, line: String) -> Result<(), SinkError> {
        self.lines.lock().unwrap().push(line);
        Ok(())
    }
}
