// borderly/src/core/pipeline.rs
use super::{ProcessingError, Profile, Result};
use crate::processors::{expand_border, Compressor, Loader, Resizer, SourceFormat};
use crate::utils::output_path;
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Applies one profile to one image and writes the result under the
/// profile's folder in `output_dir`.
pub struct TransformPipeline {
    output_dir: PathBuf,
    loader: Loader,
    resizer: Resizer,
}

impl TransformPipeline {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            loader: Loader::new(),
            resizer: Resizer::new(),
        }
    }

    /// Runs the full pipeline. Every failure comes back as a
    /// [`ProcessingError`] naming the source and profile.
    pub fn apply(
        &self,
        source: &Path,
        profile: &Profile,
    ) -> std::result::Result<PathBuf, ProcessingError> {
        self.process(source, profile)
            .map_err(|cause| ProcessingError {
                source_path: source.to_path_buf(),
                profile: profile.name.clone(),
                cause,
            })
    }

    fn process(&self, source: &Path, profile: &Profile) -> Result<PathBuf> {
        let format = SourceFormat::from_path(source)?;
        let image = self.loader.load(source)?;
        let image = self.transform(image, profile)?;

        let destination = self.destination(source, profile)?;
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Compressor::new(profile.quality).save(&image, &destination, format)?;
        Ok(destination)
    }

    /// Where `apply` writes `source` for `profile`.
    pub fn destination(&self, source: &Path, profile: &Profile) -> Result<PathBuf> {
        output_path(&self.output_dir, source, &profile.name)
    }

    /// Resize then border, in memory. The border width resolves against the
    /// resized width.
    pub fn transform(&self, image: DynamicImage, profile: &Profile) -> Result<DynamicImage> {
        let image = self
            .resizer
            .resize(
                &image,
                profile.resize_width.as_ref(),
                profile.resize_height.as_ref(),
            )?
            .unwrap_or(image);

        let border = profile.border_width.resolve(image.width());
        if border > 0 {
            expand_border(&image, border, &profile.border_color)
        } else {
            Ok(image)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SizeSpec;
    use image::{GenericImageView, RgbImage};

    fn blank(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
    }

    #[test]
    fn resize_width_only_keeps_aspect() {
        let pipeline = TransformPipeline::new("out");
        let profile = Profile::new("Web", SizeSpec::default())
            .with_resize(Some(SizeSpec::parse("800px")), None);

        let result = pipeline.transform(blank(1600, 1200), &profile).unwrap();
        assert_eq!(result.dimensions(), (800, 600));
    }

    #[test]
    fn percent_border_uses_width() {
        let pipeline = TransformPipeline::new("out");
        let profile = Profile::new("Framed", SizeSpec::parse("10%"));

        let result = pipeline.transform(blank(300, 100), &profile).unwrap();
        assert_eq!(result.dimensions(), (360, 160));
    }

    #[test]
    fn border_resolves_after_resize() {
        let pipeline = TransformPipeline::new("out");
        let profile = Profile::new("Both", SizeSpec::parse("10%"))
            .with_resize(Some(SizeSpec::parse("50%")), None);

        let result = pipeline.transform(blank(400, 200), &profile).unwrap();
        assert_eq!(result.dimensions(), (240, 140));
    }

    #[test]
    fn unparsable_sizes_do_nothing() {
        let pipeline = TransformPipeline::new("out");
        let profile = Profile::new("Noop", SizeSpec::parse("wide"))
            .with_resize(Some(SizeSpec::parse("big")), Some(SizeSpec::parse("")));

        let result = pipeline.transform(blank(64, 48), &profile).unwrap();
        assert_eq!(result.dimensions(), (64, 48));
    }

    #[test]
    fn oversized_border_fails_instead_of_panicking() {
        let pipeline = TransformPipeline::new("out");
        let profile = Profile::new("Huge", SizeSpec::parse("3000000000px"));

        let err = pipeline.transform(blank(10, 10), &profile).unwrap_err();
        assert!(matches!(err, crate::core::BorderlyError::ImageTooLarge { .. }));
    }
}
