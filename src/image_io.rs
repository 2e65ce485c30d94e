use std::path::{Path, PathBuf};
use std::fs;
use image::{ImageError, ImageFormat, RgbImage};

use crate::errors::{MangoRipenessError, Result};

/// File extensions accepted as mango photos
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: RgbImage,
    pub path: PathBuf,
    pub filename: String,
    /// Path relative to the input root, e.g. `tree2/mango.png`
    pub source: String,
    /// Flattened `source` used to name saved crops, e.g. `tree2_mango_png`
    pub output_name: String,
}

/// Path of `path` below `root` with `/` separators; the file name alone if
/// `path` is not under `root`
pub fn relative_source(path: &Path, root: &Path) -> String {
    let relative = match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => path.file_name().map(Path::new).unwrap_or(path),
    };
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Turn a relative source path into a single file-name-safe token
pub fn output_name_for(source: &str) -> String {
    source
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Check whether a path has one of the accepted image extensions
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

/// Get all JPEG and PNG files from a directory (recursively), sorted by path.
///
/// `skip_dir`, when it lies inside `dir_path`, is not descended into; pass the
/// output directory so saved crops are never picked up as input.
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P, skip_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(MangoRipenessError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(MangoRipenessError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let skip_dir = skip_dir.and_then(|d| fs::canonicalize(d).ok());

    let mut image_files = Vec::new();
    find_image_files_recursive(dir_path, skip_dir.as_deref(), &mut image_files)?;
    image_files.sort();

    Ok(image_files)
}

fn find_image_files_recursive(dir_path: &Path, skip_dir: Option<&Path>, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            if let Some(skip) = skip_dir {
                if fs::canonicalize(&path)? == skip {
                    continue;
                }
            }
            find_image_files_recursive(&path, skip_dir, result)?;
        } else if path.is_file() && is_supported_image(&path) {
            result.push(path);
        }
    }

    Ok(())
}

/// Load an image and normalize it to 8-bit RGB, dropping any alpha channel
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    load_image_under(path, root)
}

/// `load_image`, naming the result by its path relative to `root`
pub fn load_image_under<P: AsRef<Path>>(path: P, root: &Path) -> Result<InputImage> {
    let path = path.as_ref();

    let filename = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| MangoRipenessError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let img = image::open(path).map_err(|e| match e {
        ImageError::Unsupported(_) | ImageError::Decoding(_) => MangoRipenessError::UnsupportedImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
        ImageError::IoError(io) => MangoRipenessError::Io(io),
        other => MangoRipenessError::Image(other),
    })?;

    let source = relative_source(path, root);
    let output_name = output_name_for(&source);

    Ok(InputImage {
        image: img.to_rgb8(),
        path: path.to_path_buf(),
        filename,
        source,
        output_name,
    })
}

/// Save an RGB image as PNG
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mango_ripeness_io_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn supported_extensions() {
        assert!(is_supported_image(Path::new("a/mango.JPG")));
        assert!(is_supported_image(Path::new("mango.jpeg")));
        assert!(is_supported_image(Path::new("mango.png")));
        assert!(!is_supported_image(Path::new("mango.gif")));
        assert!(!is_supported_image(Path::new("mango")));
    }

    #[test]
    fn load_drops_alpha() {
        let dir = scratch_dir("alpha");
        let path = dir.join("rgba.png");
        RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 0])).save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.filename, "rgba");
        assert_eq!(loaded.source, "rgba.png");
        assert_eq!(loaded.output_name, "rgba_png");
        assert_eq!(loaded.image.dimensions(), (4, 3));
        assert_eq!(loaded.image.get_pixel(1, 1), &Rgb([10, 20, 30]));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = scratch_dir("garbage");
        let path = dir.join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        assert!(matches!(load_image(&path), Err(MangoRipenessError::UnsupportedImage { .. })));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn finds_images_recursively() {
        let dir = scratch_dir("walk");
        fs::create_dir_all(dir.join("batch")).unwrap();
        let image = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        save_image(&image, dir.join("b.png")).unwrap();
        save_image(&image, dir.join("batch").join("a.png")).unwrap();
        fs::write(dir.join("notes.txt"), "skip me").unwrap();

        let files = get_image_files_in_dir(&dir, None).unwrap();
        assert_eq!(files, vec![dir.join("b.png"), dir.join("batch").join("a.png")]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn skips_output_dir_inside_input() {
        let dir = scratch_dir("skip");
        let out = dir.join("out");
        fs::create_dir_all(out.join("crops")).unwrap();
        let image = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        save_image(&image, dir.join("mango.png")).unwrap();
        save_image(&image, out.join("crops").join("mango_png_crop.png")).unwrap();
        save_image(&image, out.join("crops").join("mango_png_preview.png")).unwrap();

        assert_eq!(get_image_files_in_dir(&dir, None).unwrap().len(), 3);
        let files = get_image_files_in_dir(&dir, Some(out.as_path())).unwrap();
        assert_eq!(files, vec![dir.join("mango.png")]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn names_distinguish_shared_stems() {
        let root = Path::new("in");
        let a = relative_source(Path::new("in/mango.png"), root);
        let b = relative_source(Path::new("in/tree2/mango.png"), root);
        let c = relative_source(Path::new("in/mango.jpg"), root);

        assert_eq!(a, "mango.png");
        assert_eq!(b, "tree2/mango.png");
        assert_eq!(output_name_for(&a), "mango_png");
        assert_eq!(output_name_for(&b), "tree2_mango_png");
        assert_eq!(output_name_for(&c), "mango_jpg");
        assert_eq!(relative_source(Path::new("elsewhere/x.png"), root), "x.png");
    }

    #[test]
    fn missing_dir_is_invalid_path() {
        let missing = std::env::temp_dir().join("mango_ripeness_io_missing_dir_for_test");
        assert!(matches!(
            get_image_files_in_dir(&missing, None),
            Err(MangoRipenessError::InvalidPath(_))
        ));
    }
}
