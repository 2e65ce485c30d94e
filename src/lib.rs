// src/lib.rs - Library interface for the mango ripeness analyzer

pub mod classify;
pub mod color;
pub mod config;
pub mod crop;
pub mod errors;
pub mod image_io;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod result_log;

// Re-export commonly used types and functions
pub use errors::{MangoRipenessError, Result};
pub use config::Config;
pub use pipeline::{analyze, analyze_default, process_batch, process_image, Analysis, BatchReport};
pub use image_io::{InputImage, load_image, save_image};

pub use classify::{classify, HueRange, RipenessLabel, ThresholdRule, ThresholdTable};
pub use color::{average_color, hue_degrees, AverageColor};
pub use crop::{crop_image, crop_rect, CropRect, ZoomFraction};
pub use render::{create_preview, create_swatch};
pub use result_log::{ResultLog, ResultRecord};
