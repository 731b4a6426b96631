// borderly/src/cli.rs
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "borderly", version, about = "Add borders to and resize images using named profiles")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings document holding settings and profiles
    #[arg(long, global = true, default_value = crate::core::DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply profiles to images
    Process {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Profile to apply (defaults to the first profile)
        #[arg(short, long, conflicts_with = "all_profiles")]
        profile: Option<String>,

        /// Apply every profile
        #[arg(short = 'a', long)]
        all_profiles: bool,

        /// Output directory (overrides settings)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to do with originals afterwards (overrides settings)
        #[arg(long, value_enum)]
        after: Option<AfterProcessing>,

        /// Directory originals are moved to with `--after move`
        #[arg(long)]
        move_to: Option<PathBuf>,

        /// Number of workers (1-4, defaults to available cores)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Descend into sub-directories
        #[arg(short, long)]
        recursive: bool,
    },

    /// List configured profiles
    Profiles,

    /// Write a default settings document
    Init {
        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },

    /// Show or clear recently processed files
    Recent {
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AfterProcessing {
    Keep,
    Delete,
    Move,
}

impl From<AfterProcessing> for crate::core::ProcessedFileOption {
    fn from(after: AfterProcessing) -> Self {
        match after {
            AfterProcessing::Keep => crate::core::ProcessedFileOption::None,
            AfterProcessing::Delete => crate::core::ProcessedFileOption::Delete,
            AfterProcessing::Move => crate::core::ProcessedFileOption::Move,
        }
    }
}
