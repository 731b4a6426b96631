// borderly/src/processors/loader.rs
use crate::core::{BorderlyError, Result};
use crate::utils::extension_of;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::Path;

/// Formats Borderly reads and writes. The output always uses the input's format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Tiff,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = extension_of(path).unwrap_or_default();
        match extension.as_str() {
            "jpg" | "jpeg" => Ok(SourceFormat::Jpeg),
            "png" => Ok(SourceFormat::Png),
            "tif" | "tiff" => Ok(SourceFormat::Tiff),
            _ => Err(BorderlyError::UnsupportedFormat(format!(
                "'.{}' ({})",
                extension,
                path.display()
            ))),
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Png => image::ImageFormat::Png,
            SourceFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

#[derive(Clone, Default)]
pub struct Loader;

impl Loader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<DynamicImage> {
        log::debug!("Loading image from: {}", path.display());

        let decode_error = |source| BorderlyError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let image = ImageReader::open(path)
            .map_err(|e| decode_error(image::ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| decode_error(image::ImageError::IoError(e)))?
            .decode()
            .map_err(decode_error)?;

        let (width, height) = image.dimensions();
        log::debug!(
            "Loaded image: {}x{} pixels, color: {:?}",
            width,
            height,
            image.color()
        );

        Ok(image)
    }
}
