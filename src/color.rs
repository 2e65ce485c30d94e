use std::fmt;

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::errors::{MangoRipenessError, Result};

/// Mean color of a region, one rounded integer per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AverageColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AverageColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// All channels equal, so the hue is undefined and reported as 0
    pub fn is_achromatic(&self) -> bool {
        self.r == self.g && self.g == self.b
    }

    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Hue angle of this color in degrees
    pub fn hue(&self) -> f64 {
        hue_degrees(*self)
    }
}

impl From<[u8; 3]> for AverageColor {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl fmt::Display for AverageColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Average every pixel of `image`, channel by channel.
///
/// Sums are accumulated exactly in integers; the mean is rounded half to even.
pub fn average_color(image: &RgbImage) -> Result<AverageColor> {
    let (width, height) = image.dimensions();
    let count = width as u64 * height as u64;
    if count == 0 {
        return Err(MangoRipenessError::EmptyRegion { width, height });
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        sums[0] += pixel[0] as u64;
        sums[1] += pixel[1] as u64;
        sums[2] += pixel[2] as u64;
    }

    let channel = |sum: u64| -> u8 {
        let mean = sum as f64 / count as f64;
        mean.round_ties_even().clamp(0.0, 255.0) as u8
    };

    Ok(AverageColor::new(channel(sums[0]), channel(sums[1]), channel(sums[2])))
}

/// HSV hue of `color` in degrees, always in [0, 360).
///
/// Gray, black and white have no hue and map to 0.
pub fn hue_degrees(color: AverageColor) -> f64 {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min {
        return 0.0;
    }

    let delta = max - min;
    let rc = (max - r) / delta;
    let gc = (max - g) / delta;
    let bc = (max - b) / delta;

    let sector = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    let hue = (sector / 6.0).rem_euclid(1.0) * 360.0;
    if hue >= 360.0 {
        0.0
    } else {
        hue
    }
}
