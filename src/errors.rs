use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for the mango ripeness analyzer
#[derive(Error, Debug)]
pub enum MangoRipenessError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    /// Zoom outside (0, 50] percent, or a zoom that leaves no pixels to average
    #[error("Invalid zoom: {zoom_percent}% ({reason})")]
    InvalidZoom {
        zoom_percent: u32,
        reason: String,
    },

    #[error("Crop region {width}x{height} contains no pixels")]
    EmptyRegion {
        width: u32,
        height: u32,
    },

    #[error("Unsupported image {path}: {reason}")]
    UnsupportedImage {
        path: PathBuf,
        reason: String,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid result record on line {line}: {reason}")]
    InvalidRecord {
        line: u64,
        reason: String,
    },

    #[error("Unknown ripeness label: {0}")]
    UnknownLabel(String),

    #[error("No result log entry at index {index} (log has {len} entries)")]
    EntryNotFound {
        index: usize,
        len: usize,
    },

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, MangoRipenessError>;
