pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod processing;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::HostConfig;
pub use error::{FilterError, Result};
pub use processing::{FilterRunner, SampleRow};
pub use wav::save_wav;
