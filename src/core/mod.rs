// borderly/src/core/mod.rs
mod dimension;
mod pipeline;
mod profile;
mod settings;

use std::path::PathBuf;
use thiserror::Error;

pub use dimension::{resolve, SizeSpec, SizeValue};
pub use pipeline::TransformPipeline;
pub use profile::{validate_profiles, BorderColor, Profile, ProfileSelection};
pub use settings::{ProcessedFileOption, Settings, SettingsDocument, DEFAULT_SETTINGS_FILE};

/// What happens to a source file once every task referencing it has finished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DispositionPolicy {
    #[default]
    Keep,
    Delete,
    Move(PathBuf),
}

impl DispositionPolicy {
    pub fn validate(&self) -> Result<()> {
        match self {
            DispositionPolicy::Move(target) if target.as_os_str().is_empty() => {
                Err(BorderlyError::InvalidConfiguration(
                    "Move policy requires a target directory".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Error, Debug)]
pub enum BorderlyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Image of {width}x{height} pixels is too large")]
    ImageTooLarge { width: u64, height: u64 },

    #[error("Output {} is already produced by another task", .0.display())]
    OutputCollision(PathBuf),

    #[error("Task panicked: {0}")]
    Panicked(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Disposition error: {0}")]
    Disposition(#[from] DispositionError),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum DispositionError {
    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Source has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    #[error("Failed to dispose of {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failed (file, profile) task. Recorded by the scheduler, never fatal to a batch.
#[derive(Error, Debug)]
#[error("Profile '{profile}' failed for {}: {cause}", .source_path.display())]
pub struct ProcessingError {
    pub source_path: PathBuf,
    pub profile: String,
    #[source]
    pub cause: BorderlyError,
}

pub type Result<T> = std::result::Result<T, BorderlyError>;
