// borderly/src/processors/compressor.rs
use super::loader::SourceFormat;
use crate::core::{BorderlyError, Result};
use crate::utils::format_file_size;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct Compressor {
    quality: u8,
}

impl Compressor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn save(&self, image: &DynamicImage, path: &Path, format: SourceFormat) -> Result<()> {
        log::debug!(
            "Saving image to {} as {:?}, quality: {}",
            path.display(),
            format,
            self.quality
        );

        let encode_error = |source| BorderlyError::Encode {
            path: path.to_path_buf(),
            source,
        };

        match format {
            SourceFormat::Jpeg => self.save_jpeg(image, path).map_err(encode_error)?,
            SourceFormat::Png | SourceFormat::Tiff => image
                .save_with_format(path, format.image_format())
                .map_err(encode_error)?,
        }

        self.log_save_result(path)
    }

    fn save_jpeg(&self, image: &DynamicImage, path: &Path) -> image::ImageResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // The JPEG encoder only takes 8-bit gray or RGB.
        let flattened;
        let image = match image.color() {
            ColorType::L8 | ColorType::Rgb8 => image,
            _ => {
                flattened = DynamicImage::ImageRgb8(image.to_rgb8());
                &flattened
            }
        };

        let encoder = JpegEncoder::new_with_quality(&mut writer, self.quality);
        image.write_with_encoder(encoder)?;
        writer.flush()?;
        Ok(())
    }

    fn log_save_result(&self, path: &Path) -> Result<()> {
        let file_size = std::fs::metadata(path)?.len();
        log::info!("Saved image: {} ({})", path.display(), format_file_size(file_size));
        Ok(())
    }
}
