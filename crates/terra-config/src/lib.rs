//! Configuration for the globe effect: persisted settings, change
//! notifications, per-user path layout, and demo CLI overrides.

mod cli;
mod error;
mod paths;
mod settings;

pub use cli::CliArgs;
pub use error::ConfigError;
pub use paths::DataLayout;
pub use settings::{SettingChange, Settings};
