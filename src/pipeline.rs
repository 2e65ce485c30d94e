// src/pipeline.rs - center crop -> average color -> hue -> ripeness label

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, error, info};
use rayon::prelude::*;

use crate::classify::{RipenessLabel, ThresholdTable};
use crate::color::{average_color, hue_degrees, AverageColor};
use crate::config::Config;
use crate::crop::{crop_image, crop_rect, CropRect, ZoomFraction};
use crate::errors::{MangoRipenessError, Result};
use crate::image_io::{load_image_under, InputImage};
use crate::output::save_analysis_images;
use crate::result_log::ResultRecord;

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub cropped: RgbImage,
    pub crop_rect: CropRect,
    pub average_color: AverageColor,
    pub hue_degrees: f64,
    pub label: RipenessLabel,
}

/// Analyze the center crop of `image` and classify it against `thresholds`.
///
/// Fails with `InvalidZoom` when the zoom is outside (0, 50] or leaves a
/// degenerate crop, before any pixel is averaged.
pub fn analyze(image: &RgbImage, zoom_percent: u32, thresholds: &ThresholdTable) -> Result<Analysis> {
    let zoom = ZoomFraction::from_percent(zoom_percent)?;
    let (width, height) = image.dimensions();

    let rect = crop_rect(width, height, zoom);
    if rect.is_degenerate() {
        return Err(MangoRipenessError::InvalidZoom {
            zoom_percent,
            reason: format!(
                "crop of a {}x{} image is empty ({:?})",
                width, height, rect
            ),
        });
    }
    debug!("Crop rect for {}x{} at {}%: {:?}", width, height, zoom_percent, rect);

    let cropped = crop_image(image, &rect);
    let average = average_color(&cropped)?;
    let hue = hue_degrees(average);
    let label = thresholds.classify(hue);
    debug!("Average RGB {} -> hue {:.3} -> {}", average, hue, label);

    Ok(Analysis {
        cropped,
        crop_rect: rect,
        average_color: average,
        hue_degrees: hue,
        label,
    })
}

/// `analyze` with the default threshold table
pub fn analyze_default(image: &RgbImage, zoom_percent: u32) -> Result<Analysis> {
    analyze(image, zoom_percent, &ThresholdTable::default())
}

/// Analyze a loaded file using the configured zoom and thresholds, save the
/// crop and preview if enabled, and return the record for the result log
pub fn process_image(input_image: &InputImage, config: &Config, debug: bool) -> Result<ResultRecord> {
    let analysis = analyze(&input_image.image, config.zoom_percent, &config.thresholds)?;

    info!(
        "{}: Average RGB {}, Hue {:.1}°, Predicted: {}",
        input_image.source, analysis.average_color, analysis.hue_degrees, analysis.label
    );

    if debug {
        let rect = &analysis.crop_rect;
        info!(
            "{}: crop ({}, {}) - ({}, {}), {} pixels averaged",
            input_image.source,
            rect.left,
            rect.top,
            rect.right,
            rect.bottom,
            rect.pixel_count()
        );
        if analysis.average_color.is_achromatic() {
            info!("{}: average color is gray, hue defaults to 0", input_image.source);
        }
    }

    if config.save_crops {
        save_analysis_images(&analysis, &config.output_base_dir, &input_image.output_name, config.swatch_size)?;
    }

    Ok(ResultRecord::from_analysis(&analysis, Some(input_image.source.clone())))
}

/// Outcome of analyzing a list of files
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful results, in input order
    pub records: Vec<ResultRecord>,
    /// Files that could not be analyzed, in input order
    pub failures: Vec<(PathBuf, MangoRipenessError)>,
}

/// Give every file a distinct output name; a repeated name gets `_2`, `_3`, ...
fn unique_output_names(paths: &[PathBuf], root: &Path) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    paths
        .iter()
        .map(|path| {
            let base = crate::image_io::output_name_for(&crate::image_io::relative_source(path, root));
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{}_{}", base, count)
            }
        })
        .collect()
}

/// Analyze every file in `paths`, naming outputs by their path below `root`.
///
/// A file that fails to load or analyze is logged and reported in
/// `failures`; the remaining files are still processed.
pub fn process_batch(paths: &[PathBuf], root: &Path, config: &Config, debug: bool) -> BatchReport {
    let names = unique_output_names(paths, root);

    let analyze_file = |(path, name): (&PathBuf, &String)| -> Result<ResultRecord> {
        let mut input_image = load_image_under(path, root)?;
        input_image.output_name = name.clone();
        process_image(&input_image, config, debug)
    };

    let outcomes: Vec<Result<ResultRecord>> = if config.use_parallel {
        paths.par_iter().zip(names.par_iter()).map(analyze_file).collect()
    } else {
        paths.iter().zip(names.iter()).map(analyze_file).collect()
    };

    let mut report = BatchReport::default();
    for (path, outcome) in paths.iter().zip(outcomes) {
        match outcome {
            Ok(record) => report.records.push(record),
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                report.failures.push((path.clone(), e));
            }
        }
    }

    report
}
