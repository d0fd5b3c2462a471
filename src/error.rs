use thiserror::Error;

pub type Result<T> = std::result::Result<T, KpiError>;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A year-month token that is not `YYYY-MM`.
    #[error("invalid period `{0}` (expected YYYY-MM)")]
    InvalidPeriod(String),

    #[error("invalid trend target: {0}")]
    InvalidTarget(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl KpiError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        KpiError::Io {
            path: path.into(),
            source,
        }
    }
}
