use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::color::AverageColor;

/// Constants
pub const PREVIEW_MARGIN: u32 = 10;
pub const PREVIEW_BACKGROUND: Rgb<u8> = Rgb([48, 48, 48]); // Dark gray
pub const SWATCH_BORDER: Rgb<u8> = Rgb([255, 255, 255]);   // White

/// Solid square filled with the average color
pub fn create_swatch(color: AverageColor, size: u32) -> RgbImage {
    RgbImage::from_pixel(size, size, color.to_rgb())
}

/// Crop on the left, bordered color swatch on the right, on a dark background.
///
/// The swatch is vertically centered against the crop.
pub fn create_preview(cropped: &RgbImage, color: AverageColor, swatch_size: u32) -> RgbImage {
    let (crop_w, crop_h) = cropped.dimensions();
    let width = crop_w + swatch_size + 3 * PREVIEW_MARGIN;
    let height = crop_h.max(swatch_size) + 2 * PREVIEW_MARGIN;

    let mut preview = RgbImage::from_pixel(width, height, PREVIEW_BACKGROUND);
    imageops::replace(&mut preview, cropped, PREVIEW_MARGIN as i64, PREVIEW_MARGIN as i64);

    if swatch_size > 0 {
        let swatch_x = (crop_w + 2 * PREVIEW_MARGIN) as i32;
        let swatch_y = (PREVIEW_MARGIN + (height - 2 * PREVIEW_MARGIN - swatch_size) / 2) as i32;
        imageops::replace(&mut preview, &create_swatch(color, swatch_size), swatch_x as i64, swatch_y as i64);

        let border = Rect::at(swatch_x, swatch_y).of_size(swatch_size, swatch_size);
        draw_hollow_rect_mut(&mut preview, border, SWATCH_BORDER);
    }

    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swatch_is_solid() {
        let swatch = create_swatch(AverageColor::new(200, 150, 50), 8);
        assert_eq!(swatch.dimensions(), (8, 8));
        assert!(swatch.pixels().all(|p| *p == Rgb([200, 150, 50])));
    }

    #[test]
    fn preview_layout() {
        let crop = RgbImage::from_pixel(40, 20, Rgb([0, 255, 0]));
        let color = AverageColor::new(0, 255, 0);
        let preview = create_preview(&crop, color, 30);

        assert_eq!(preview.dimensions(), (40 + 30 + 30, 30 + 20));
        // Crop pasted at the margin
        assert_eq!(preview.get_pixel(PREVIEW_MARGIN, PREVIEW_MARGIN), &Rgb([0, 255, 0]));
        // Background between crop and swatch
        assert_eq!(preview.get_pixel(40 + PREVIEW_MARGIN + 1, 5), &PREVIEW_BACKGROUND);
        // Swatch border and fill
        let swatch_x = 40 + 2 * PREVIEW_MARGIN;
        assert_eq!(preview.get_pixel(swatch_x, PREVIEW_MARGIN), &SWATCH_BORDER);
        assert_eq!(preview.get_pixel(swatch_x + 15, PREVIEW_MARGIN + 15), &Rgb([0, 255, 0]));
    }
}
