// borderly/src/utils/mod.rs
use crate::core::{BorderlyError, Result};
use crate::processors::MAX_WORKERS;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];

/// Largest pixel buffer a transform may allocate, matching the `image`
/// crate's default decoder allocation limit.
pub const MAX_IMAGE_BYTES: u64 = 512 * 1024 * 1024;

/// Checks that a `width x height` buffer has `u32` sides and stays within
/// [`MAX_IMAGE_BYTES`].
pub fn checked_dimensions(width: u64, height: u64, bytes_per_pixel: u64) -> Result<(u32, u32)> {
    let too_large = || BorderlyError::ImageTooLarge { width, height };

    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    let bytes = width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
        .ok_or_else(too_large)?;

    if bytes > MAX_IMAGE_BYTES {
        return Err(too_large());
    }
    Ok((w, h))
}

/// Lowercased extension without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

pub fn is_supported_format(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// `{output_dir}/{profile}/{stem}_{profile}.{ext}`, extension lowercased.
pub fn output_path(output_dir: &Path, source: &Path, profile_name: &str) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| BorderlyError::InvalidPath(format!("Invalid file name: {}", source.display())))?;

    let file_name = match extension_of(source) {
        Some(ext) => format!("{}_{}.{}", stem, profile_name, ext),
        None => format!("{}_{}", stem, profile_name),
    };

    Ok(output_dir.join(profile_name).join(file_name))
}

/// Expands inputs into image files. Files are kept as given (unsupported ones
/// fail later, per task); directories contribute their supported images.
pub fn collect_image_paths(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_file() {
            paths.push(input.clone());
            continue;
        }

        if !input.is_dir() {
            return Err(BorderlyError::InvalidPath(format!(
                "Input does not exist: {}",
                input.display()
            )));
        }

        let walker = if recursive {
            WalkDir::new(input)
        } else {
            WalkDir::new(input).max_depth(1)
        };

        let mut found: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_format(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        found.sort();

        if found.is_empty() {
            log::warn!("No image files found in {}", input.display());
        }
        paths.extend(found);
    }

    Ok(paths)
}

/// `min(available parallelism, MAX_WORKERS)`, at least one.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_WORKERS)
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}
