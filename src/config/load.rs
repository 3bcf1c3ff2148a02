//! Settings loading and saving.
//!
//! The settings file is JSON, layered with `WEBPORTAL_*` environment overrides.

use std::path::Path;

use tracing::{debug, info};

use super::{SettingsError, SiteSettings};

/// Name of the settings file inside a workspace.
pub const SETTINGS_FILE: &str = "portal.json";

/// Prefix for environment overrides, e.g. `WEBPORTAL_SERVER_PORT=9000`.
pub const ENV_PREFIX: &str = "WEBPORTAL";

impl SiteSettings {
    /// Load settings from a file, creating it with defaults on first access.
    pub fn load_or_create(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            info!(path = %path.display(), "no settings file found, writing defaults");
            SiteSettings::default().save(path)?;
        }

        Self::load_from_file(path)
    }

    /// Load settings from a file path, applying environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| SettingsError::EncodePath(path.to_path_buf()))?;

        let settings = config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Json))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<SiteSettings>()?;

        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Write(path.to_path_buf(), e))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| SettingsError::Write(path.to_path_buf(), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use tempfile::TempDir;

    #[test]
    fn test_first_access_creates_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SETTINGS_FILE);

        let settings = SiteSettings::load_or_create(&path).unwrap();

        assert!(path.exists());
        assert_eq!(settings.site_name, SiteSettings::default().site_name);
    }

    #[test]
    fn test_save_then_load_updates_in_place() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SETTINGS_FILE);

        let mut settings = SiteSettings::load_or_create(&path).unwrap();
        settings.site_name = "Night Garden".to_string();
        settings.theme = Theme::DarkBold;
        settings.page_size = Some(3);
        settings.save(&path).unwrap();

        let reloaded = SiteSettings::load_from_file(&path).unwrap();
        assert_eq!(reloaded.site_name, "Night Garden");
        assert_eq!(reloaded.theme, Theme::DarkBold);
        assert_eq!(reloaded.page_size, Some(3));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(SiteSettings::load_from_file(&path).is_err());
    }
}
