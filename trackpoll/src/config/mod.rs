//! Tracker configuration.
//!
//! Settings are read from an INI file with `[polling]`, `[adaptive]` and
//! `[logging]` sections. Missing keys keep their defaults.
//!
//! ```ini
//! [polling]
//! mode = adaptive
//!
//! [adaptive]
//! min_interval = 1
//! max_interval = 10
//! target_distance = 30
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{LoggingSettings, PollingMode, PollingSettings, TrackerConfig};
