use thiserror::Error;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid month key '{value}': expected YYYY-MM")]
    InvalidMonth { value: String },

    #[error("Invalid anchor '{value}': expected YYYY-MM")]
    InvalidAnchor { value: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },
}

pub type KpiResult<T> = Result<T, KpiError>;
