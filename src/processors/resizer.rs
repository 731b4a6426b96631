// borderly/src/processors/resizer.rs
use crate::core::{Result, SizeSpec};
use crate::utils::checked_dimensions;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Resizes to the box a profile's width/height specifiers describe.
pub struct Resizer {
    filter: FilterType,
}

impl Resizer {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Resolves both specifiers against the image and returns the target size,
    /// or `None` when neither dimension is constrained.
    pub fn target_dimensions(
        &self,
        (orig_width, orig_height): (u32, u32),
        width: Option<&SizeSpec>,
        height: Option<&SizeSpec>,
    ) -> Option<(u32, u32)> {
        let width = width.map_or(0, |spec| spec.resolve(orig_width));
        let height = height.map_or(0, |spec| spec.resolve(orig_height));

        match (width, height) {
            (0, 0) => None,
            (w, 0) => Some((w, scale_dimension(orig_height, w, orig_width))),
            (0, h) => Some((scale_dimension(orig_width, h, orig_height), h)),
            (w, h) => Some((w, h)),
        }
    }

    /// Returns `None` when there is nothing to do, and an error when the
    /// target is too large to allocate.
    pub fn resize(
        &self,
        image: &DynamicImage,
        width: Option<&SizeSpec>,
        height: Option<&SizeSpec>,
    ) -> Result<Option<DynamicImage>> {
        let Some((new_width, new_height)) =
            self.target_dimensions(image.dimensions(), width, height)
        else {
            return Ok(None);
        };

        if (new_width, new_height) == image.dimensions() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return Ok(None);
        }

        checked_dimensions(
            u64::from(new_width),
            u64::from(new_height),
            u64::from(image.color().bytes_per_pixel()),
        )?;

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            new_width,
            new_height
        );

        Ok(Some(image.resize_exact(new_width, new_height, self.filter)))
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

// round(other * resolved / this), never below one pixel
fn scale_dimension(other: u32, resolved: u32, this: u32) -> u32 {
    if this == 0 {
        return other.max(1);
    }
    let scaled = (f64::from(other) * f64::from(resolved) / f64::from(this)).round();
    (scaled.min(f64::from(u32::MAX)) as u32).max(1)
}
