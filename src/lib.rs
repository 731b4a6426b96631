mod cli;
mod core;
mod processors;
mod utils;

pub use crate::cli::{AfterProcessing, Cli, Commands};
pub use crate::core::{
    resolve, validate_profiles, BorderColor, BorderlyError, DispositionError, DispositionPolicy,
    ProcessedFileOption, ProcessingError, Profile, ProfileSelection, Result, Settings,
    SettingsDocument, SizeSpec, SizeValue, TransformPipeline, DEFAULT_SETTINGS_FILE,
};
pub use crate::processors::{
    dispose, expand_border, BatchResult, BatchScheduler, Compressor, DispositionFailure, Loader,
    Progress, ProgressSink, Resizer, SourceFormat, MAX_WORKERS,
};
pub use crate::utils::{
    collect_image_paths, default_worker_count, format_file_size, is_supported_format, output_path,
    SUPPORTED_EXTENSIONS,
};

pub mod prelude {
    pub use crate::{
        BatchScheduler, DispositionPolicy, Profile, ProfileSelection, ProgressSink, SizeSpec,
        TransformPipeline,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
