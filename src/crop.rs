use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

use crate::errors::{MangoRipenessError, Result};

/// Largest zoom the pipeline accepts, in percent
pub const MAX_ZOOM_PERCENT: u32 = 50;

/// Fraction by which each image edge is inset to form the center crop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFraction(f64);

impl ZoomFraction {
    /// Build a zoom fraction from a percentage in (0, 50]
    pub fn from_percent(zoom_percent: u32) -> Result<Self> {
        if zoom_percent == 0 || zoom_percent > MAX_ZOOM_PERCENT {
            return Err(MangoRipenessError::InvalidZoom {
                zoom_percent,
                reason: format!("must be in (0, {}]", MAX_ZOOM_PERCENT),
            });
        }
        Ok(Self(zoom_percent as f64 / 100.0))
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Integer pixel bounds of a crop, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// True when the rect covers no pixels (right <= left or bottom <= top)
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Inset each edge of a `width` x `height` image by the zoom fraction.
///
/// Every bound is truncated toward zero. No validation happens here; a zoom of
/// one half or more yields a degenerate rect, which callers must reject.
pub fn crop_rect(width: u32, height: u32, zoom: ZoomFraction) -> CropRect {
    let z = zoom.value();
    let w = width as f64;
    let h = height as f64;

    CropRect {
        left: (w * z) as u32,
        top: (h * z) as u32,
        right: (w * (1.0 - z)) as u32,
        bottom: (h * (1.0 - z)) as u32,
    }
}

/// Copy the pixels inside `rect` into a new image
pub fn crop_image(image: &RgbImage, rect: &CropRect) -> RgbImage {
    imageops::crop_imm(image, rect.left, rect.top, rect.width(), rect.height()).to_image()
}
