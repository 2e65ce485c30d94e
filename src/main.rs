use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use log::{info, warn};

use mango_ripeness_lib::config::{self, Config};
use mango_ripeness_lib::errors::{MangoRipenessError, Result};
use mango_ripeness_lib::image_io::{get_image_files_in_dir, load_image};
use mango_ripeness_lib::output::{write_results_csv, write_results_json};
use mango_ripeness_lib::pipeline::{process_batch, process_image};
use mango_ripeness_lib::result_log::ResultLog;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Mango Ripeness Detector - hue-based ripeness from a center crop")]
struct Args {
    /// Path to input image or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Crop zoom in percent (overwrites config)
    #[clap(short, long, value_parser = clap::value_parser!(u32).range(
        config::MIN_USER_ZOOM_PERCENT as i64..=config::MAX_USER_ZOOM_PERCENT as i64
    ))]
    zoom: Option<u32>,

    /// Existing result log (CSV) to append to instead of <output>/results.csv
    #[clap(short, long)]
    log: Option<PathBuf>,

    /// Delete the entry at this index from the result log and exit
    #[clap(long, requires = "log")]
    delete: Option<usize>,

    /// Also write results as JSON
    #[clap(long)]
    json: bool,

    /// Write a default configuration file to this path and exit
    #[clap(long)]
    init_config: Option<PathBuf>,

    /// Enable debug mode (print crop details and debug logging)
    #[clap(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_config(path: &str) -> Result<Config> {
    if PathBuf::from(path).is_file() {
        Config::from_file(path)
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}

fn load_log(path: &Path) -> Result<ResultLog> {
    if path.is_file() {
        ResultLog::load_csv(path)
    } else {
        Ok(ResultLog::new())
    }
}

/// Main function
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    if let Some(path) = &args.init_config {
        Config::default().save_to_file(path)?;
        info!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    if let (Some(index), Some(log_path)) = (args.delete, &args.log) {
        let mut log = load_log(log_path)?;
        let removed = log.delete(index)?;
        log.save_csv(log_path)?;
        info!(
            "Deleted entry {} ({}, {}), {} entries left",
            index,
            removed.timestamp.format(mango_ripeness_lib::result_log::TIMESTAMP_FORMAT),
            removed.label,
            log.len()
        );
        return Ok(());
    }

    let mut config = load_config(&args.config)?;

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(zoom) = args.zoom {
        config.zoom_percent = zoom;
    }

    config.validate()?;

    let start_time = Instant::now();

    let mut log = match &args.log {
        Some(path) => load_log(path)?,
        None => ResultLog::new(),
    };
    let existing = log.len();

    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        info!("Processing single file: {}", input_path.display());
        let input_image = load_image(&input_path)?;
        log.push(process_image(&input_image, &config, args.debug)?);
    } else if input_path.is_dir() {
        info!("Processing directory: {}", input_path.display());
        let output_dir = PathBuf::from(&config.output_base_dir);
        let image_files = get_image_files_in_dir(&input_path, Some(output_dir.as_path()))?;
        info!("Found {} image files", image_files.len());

        let batch = process_batch(&image_files, &input_path, &config, args.debug);
        if !batch.failures.is_empty() {
            warn!("{} of {} files could not be analyzed", batch.failures.len(), image_files.len());
        }
        log.extend(batch.records);
    } else {
        return Err(MangoRipenessError::InvalidPath(input_path));
    }

    let csv_path = match &args.log {
        Some(path) => {
            log.save_csv(path)?;
            path.clone()
        }
        None => write_results_csv(&log, &config.output_base_dir)?,
    };
    info!(
        "Added {} results to {} ({} total)",
        log.len() - existing,
        csv_path.display(),
        log.len()
    );

    if args.json {
        let json_path = write_results_json(&log, &config.output_base_dir)?;
        info!("Wrote {}", json_path.display());
    }

    let elapsed = start_time.elapsed();
    info!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}
