//! Settings struct with sensible defaults, RON persistence, and change diffing.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the settings file inside the config directory.
const SETTINGS_FILE: &str = "terra.ron";

/// User-facing settings of the globe effect.
///
/// Every field has a change-notification variant in [`SettingChange`]; the
/// per-screen context applies changes through its `apply_settings` method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Viewer latitude in degrees, positive north.
    pub latitude: f32,
    /// Viewer longitude in degrees, positive east.
    pub longitude: f32,
    /// Timezone offset from UTC in hours, excluding daylight saving.
    pub timezone_offset_hours: f32,
    /// Display the globe with the southern hemisphere on top.
    pub south_on_top: bool,
    /// Scale factor applied to the inset globe.
    pub earth_size: f32,
    /// Use the day/night blend program when the host supports shading.
    pub shaders: bool,
    /// Enable the live cloud overlay.
    pub clouds: bool,
    /// Maximum age of the cached cloud image, in hours, before a refresh.
    pub cloud_refresh_hours: f32,
    /// Source URL for the cloud-cover image.
    pub clouds_url: String,
    /// Log filter override (empty string means the built-in default).
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            timezone_offset_hours: 0.0,
            south_on_top: false,
            earth_size: 1.0,
            shaders: true,
            clouds: true,
            cloud_refresh_hours: 3.0,
            clouds_url: "https://clouds.matteason.co.uk/images/2048x1024/clouds.jpg".to_string(),
            log_level: String::new(),
        }
    }
}

/// A single changed setting, produced by [`Settings::diff`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingChange {
    Latitude,
    Longitude,
    Timezone,
    SouthOnTop,
    EarthSize,
    Shaders,
    Clouds,
    CloudRefreshHours,
    CloudsUrl,
    LogLevel,
}

impl Settings {
    /// The cloud staleness threshold as a [`Duration`].
    pub fn cloud_refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(f64::from(self.cloud_refresh_hours.max(0.0)) * 3600.0)
    }

    /// List the settings that differ between `self` and `next`.
    pub fn diff(&self, next: &Settings) -> Vec<SettingChange> {
        let mut changes = Vec::new();
        if self.latitude != next.latitude {
            changes.push(SettingChange::Latitude);
        }
        if self.longitude != next.longitude {
            changes.push(SettingChange::Longitude);
        }
        if self.timezone_offset_hours != next.timezone_offset_hours {
            changes.push(SettingChange::Timezone);
        }
        if self.south_on_top != next.south_on_top {
            changes.push(SettingChange::SouthOnTop);
        }
        if self.earth_size != next.earth_size {
            changes.push(SettingChange::EarthSize);
        }
        if self.shaders != next.shaders {
            changes.push(SettingChange::Shaders);
        }
        if self.clouds != next.clouds {
            changes.push(SettingChange::Clouds);
        }
        if self.cloud_refresh_hours != next.cloud_refresh_hours {
            changes.push(SettingChange::CloudRefreshHours);
        }
        if self.clouds_url != next.clouds_url {
            changes.push(SettingChange::CloudsUrl);
        }
        if self.log_level != next.log_level {
            changes.push(SettingChange::LogLevel);
        }
        changes
    }

    /// Load settings from the given directory, creating a default file if
    /// none exists.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(SETTINGS_FILE);

        if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadError)?;
            let settings: Settings = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded settings from {}", path.display());
            Ok(settings)
        } else {
            let settings = Settings::default();
            settings.save(config_dir)?;
            log::info!("Created default settings at {}", path.display());
            Ok(settings)
        }
    }

    /// Save settings to `config_dir` as a pretty-printed RON file.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let path = config_dir.join(SETTINGS_FILE);
        let pretty = ron::ser::PrettyConfig::new().depth_limit(2);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;
        std::fs::write(&path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Reload from disk, returning `Some(new)` only if anything changed.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = config_dir.join(SETTINGS_FILE);
        let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadError)?;
        let next: Settings = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &next != self {
            log::info!("Settings reloaded with changes");
            Ok(Some(next))
        } else {
            Ok(None)
        }
    }
}
