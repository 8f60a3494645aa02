use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Source error: {0}")]
    Source(#[from] anyhow::Error),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
