use thiserror::Error;

/// Failure classes with different blast radii: `Fetch`/`FetchFile` and `Load`
/// are fatal for the session (nothing renders on a partial dataset);
/// `Validation` is recoverable (the offending parameter is rejected, the last
/// valid view stays up).
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to fetch access log: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to read access log from {path}: {source}")]
    FetchFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed access log row {line}: {reason}")]
    Load { line: usize, reason: String },

    #[error("invalid parameter: {0}")]
    Validation(String),
}

impl DashboardError {
    pub fn load(line: usize, reason: impl Into<String>) -> Self {
        DashboardError::Load {
            line,
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        DashboardError::Validation(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
