//! Command-line argument parsing for the demo host.

use std::path::PathBuf;

use clap::Parser;

use crate::Settings;

/// Demo host command-line arguments.
///
/// CLI values override settings loaded from `terra.ron`.
#[derive(Parser, Debug)]
#[command(name = "terra", about = "Desktop-cube globe effect demo")]
pub struct CliArgs {
    /// Window width in logical pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height in logical pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Viewer latitude in degrees.
    #[arg(long)]
    pub latitude: Option<f32>,

    /// Viewer longitude in degrees.
    #[arg(long)]
    pub longitude: Option<f32>,

    /// Timezone offset from UTC in hours.
    #[arg(long)]
    pub timezone: Option<f32>,

    /// Display the southern hemisphere on top.
    #[arg(long)]
    pub south_on_top: Option<bool>,

    /// Enable or disable the cloud overlay.
    #[arg(long)]
    pub clouds: Option<bool>,

    /// Enable or disable the day/night blend program.
    #[arg(long)]
    pub shaders: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Data directory override (textures, shaders, cloud cache).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl Settings {
    /// Apply CLI overrides to loaded settings.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(latitude) = args.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = args.longitude {
            self.longitude = longitude;
        }
        if let Some(timezone) = args.timezone {
            self.timezone_offset_hours = timezone;
        }
        if let Some(south) = args.south_on_top {
            self.south_on_top = south;
        }
        if let Some(clouds) = args.clouds {
            self.clouds = clouds;
        }
        if let Some(shaders) = args.shaders {
            self.shaders = shaders;
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            width: None,
            height: None,
            latitude: None,
            longitude: None,
            timezone: None,
            south_on_top: None,
            clouds: None,
            shaders: None,
            log_level: None,
            data_dir: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut settings = Settings::default();
        let mut args = empty_args();
        args.latitude = Some(48.0);
        args.timezone = Some(1.0);
        args.clouds = Some(false);

        settings.apply_cli_overrides(&args);
        assert_eq!(settings.latitude, 48.0);
        assert_eq!(settings.timezone_offset_hours, 1.0);
        assert!(!settings.clouds);
        // Non-overridden fields retain defaults.
        assert_eq!(settings.longitude, 0.0);
        assert!(settings.shaders);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Settings::default();
        let mut settings = Settings::default();
        settings.apply_cli_overrides(&empty_args());
        assert_eq!(settings, original);
    }
}
