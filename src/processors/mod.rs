// borderly/src/processors/mod.rs
mod batch;
mod border;
mod compressor;
mod disposition;
mod loader;
mod progress;
mod resizer;

pub use batch::{BatchResult, BatchScheduler, DispositionFailure, MAX_WORKERS};
pub use border::expand_border;
pub use compressor::Compressor;
pub use disposition::dispose;
pub use loader::{Loader, SourceFormat};
pub use progress::{Progress, ProgressSink};
pub use resizer::Resizer;

