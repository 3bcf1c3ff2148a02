//! Site settings.
//!
//! - Type definitions for the settings singleton (`types`)
//! - Loading and saving the settings file (`load`)

mod load;
mod types;

use std::path::PathBuf;

pub use load::{ENV_PREFIX, SETTINGS_FILE};
pub use types::{HomePage, SiteSettings};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to encode settings file path as a unicode string: {0}")]
    EncodePath(PathBuf),

    #[error("failed to deserialize settings: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write settings file {0}: {1}")]
    Write(PathBuf, std::io::Error),
}
