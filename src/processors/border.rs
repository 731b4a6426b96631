// borderly/src/processors/border.rs
use crate::core::{BorderColor, Result};
use crate::utils::checked_dimensions;
use image::{imageops, DynamicImage, GenericImageView, Pixel, RgbImage, RgbaImage};

/// Expands an image by `width` pixels on every side, filling with `color`.
///
/// Images with an alpha channel are composed on an RGBA canvas so the border
/// colour's alpha survives; everything else is flattened onto RGB. Fails
/// when the colour does not parse or the canvas would be too large to
/// allocate.
pub fn expand_border(image: &DynamicImage, width: u32, color: &BorderColor) -> Result<DynamicImage> {
    if width == 0 {
        return Ok(image.clone());
    }

    let fill = color.rgba()?;
    let has_alpha = image.color().has_alpha();
    let (orig_width, orig_height) = image.dimensions();
    let margin = 2 * u64::from(width);
    let (canvas_width, canvas_height) = checked_dimensions(
        u64::from(orig_width) + margin,
        u64::from(orig_height) + margin,
        if has_alpha { 4 } else { 3 },
    )?;
    let offset = i64::from(width);

    log::debug!(
        "Adding {}px {} border: {}x{} -> {}x{}",
        width,
        color,
        orig_width,
        orig_height,
        canvas_width,
        canvas_height
    );

    if has_alpha {
        let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, fill);
        imageops::replace(&mut canvas, &image.to_rgba8(), offset, offset);
        Ok(DynamicImage::ImageRgba8(canvas))
    } else {
        let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, fill.to_rgb());
        imageops::replace(&mut canvas, &image.to_rgb8(), offset, offset);
        Ok(DynamicImage::ImageRgb8(canvas))
    }
}
