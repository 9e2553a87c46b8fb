use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    /// Nothing in the log could produce match metadata.
    #[error("no data: {message}")]
    NoData { message: String },
    #[error("failed to read telemetry log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("timeline assembly cancelled after {processed_lines} lines")]
    Cancelled { processed_lines: usize },
}

impl TimelineError {
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }
}

pub type TimelineResult<T> = Result<T, TimelineError>;
