use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Nothing to lay out")]
    Empty,
    #[error("Invalid page dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid item '{id}': {reason}")]
    InvalidItem { id: String, reason: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
