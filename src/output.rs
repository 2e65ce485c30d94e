use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::Result;
use crate::image_io::save_image;
use crate::pipeline::Analysis;
use crate::render::create_preview;
use crate::result_log::ResultLog;

/// File name of the exported result log inside the output directory
pub const RESULTS_CSV: &str = "results.csv";
pub const RESULTS_JSON: &str = "results.json";

/// Write the result log to `<output_dir>/results.csv`
pub fn write_results_csv<P: AsRef<Path>>(log: &ResultLog, output_dir: P) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join(RESULTS_CSV);
    log.save_csv(&output_path)?;
    Ok(output_path)
}

/// Write the result log, including source file names, to `<output_dir>/results.json`
pub fn write_results_json<P: AsRef<Path>>(log: &ResultLog, output_dir: P) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join(RESULTS_JSON);
    let json = serde_json::to_string_pretty(log.records())?;
    fs::write(&output_path, json)?;

    Ok(output_path)
}

/// Save `<name>_crop.png` and `<name>_preview.png` under `<output_dir>/crops`
pub fn save_analysis_images<P: AsRef<Path>>(
    analysis: &Analysis,
    output_dir: P,
    filename: &str,
    swatch_size: u32,
) -> Result<()> {
    let crops_dir = output_dir.as_ref().join("crops");
    fs::create_dir_all(&crops_dir)?;

    let crop_path = crops_dir.join(format!("{}_crop.png", filename));
    save_image(&analysis.cropped, &crop_path)?;

    let preview = create_preview(&analysis.cropped, analysis.average_color, swatch_size);
    let preview_path = crops_dir.join(format!("{}_preview.png", filename));
    save_image(&preview, &preview_path)?;

    debug!("Saved {} and {}", crop_path.display(), preview_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze_default;
    use crate::result_log::ResultRecord;
    use image::{Rgb, RgbImage};

    #[test]
    fn writes_all_outputs() {
        let dir = std::env::temp_dir().join(format!("mango_ripeness_output_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let image = RgbImage::from_pixel(50, 40, Rgb([255, 255, 0]));
        let analysis = analyze_default(&image, 20).unwrap();
        save_analysis_images(&analysis, &dir, "yellow", 16).unwrap();

        let crop = image::open(dir.join("crops").join("yellow_crop.png")).unwrap().to_rgb8();
        assert_eq!(crop.dimensions(), (30, 24));
        assert!(dir.join("crops").join("yellow_preview.png").is_file());

        let mut log = ResultLog::new();
        log.push(ResultRecord::from_analysis(&analysis, Some("yellow".to_string())));

        let csv_path = write_results_csv(&log, &dir).unwrap();
        let csv = fs::read_to_string(csv_path).unwrap();
        assert!(csv.starts_with("Timestamp,Avg_R,Avg_G,Avg_B,Hue,Ripeness\n"));
        assert!(csv.trim_end().ends_with(",255,255,0,60,Partially Ripe"));

        let json_path = write_results_json(&log, &dir).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(json[0]["source"], "yellow");
        assert_eq!(json[0]["label"], "PartiallyRipe");

        fs::remove_dir_all(&dir).unwrap();
    }
}
