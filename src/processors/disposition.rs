// borderly/src/processors/disposition.rs
use crate::core::{DispositionError, DispositionPolicy};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Applies `policy` to a processed original.
///
/// Returns the new location when the file was moved. A source that is
/// already gone is left alone under every policy. `Move` never overwrites: a same-named file
/// in the target directory fails with `DestinationExists` and both files are
/// left as they were.
pub fn dispose(
    source: &Path,
    policy: &DispositionPolicy,
) -> Result<Option<PathBuf>, DispositionError> {
    match policy {
        DispositionPolicy::Keep => Ok(None),
        DispositionPolicy::Delete => delete(source).map(|_| None),
        DispositionPolicy::Move(target_dir) => move_into(source, target_dir),
    }
}

fn delete(source: &Path) -> Result<(), DispositionError> {
    match std::fs::remove_file(source) {
        Ok(()) => {
            log::debug!("Deleted original {}", source.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("Original {} already gone", source.display());
            Ok(())
        }
        Err(e) => Err(io_error(source, e)),
    }
}

fn move_into(source: &Path, target_dir: &Path) -> Result<Option<PathBuf>, DispositionError> {
    if !source.exists() {
        log::debug!("Original {} already gone, nothing to move", source.display());
        return Ok(None);
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| DispositionError::NoFileName(source.to_path_buf()))?;

    std::fs::create_dir_all(target_dir).map_err(|e| io_error(target_dir, e))?;

    let destination = target_dir.join(file_name);
    if destination.exists() {
        return Err(DispositionError::DestinationExists(destination));
    }

    if let Err(rename_error) = std::fs::rename(source, &destination) {
        // rename cannot cross filesystems
        log::debug!(
            "rename {} failed ({}), copying instead",
            source.display(),
            rename_error
        );
        std::fs::copy(source, &destination).map_err(|_| io_error(source, rename_error))?;
        std::fs::remove_file(source).map_err(|e| io_error(source, e))?;
    }

    log::debug!("Moved original {} to {}", source.display(), destination.display());
    Ok(Some(destination))
}

fn io_error(path: &Path, source: std::io::Error) -> DispositionError {
    DispositionError::Io {
        path: path.to_path_buf(),
        source,
    }
}
