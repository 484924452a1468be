//! Per-user data directory layout.
//!
//! ```text
//! <data>/terra/
//!   data/    earth.vert, earth.frag
//!   images/  day.png, night.png, skydome.png, clouds.jpg, clouds.png
//! ```

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Resolved locations of the effect's on-disk assets.
#[derive(Clone, Debug)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at the platform's per-user data directory.
    pub fn discover() -> Result<Self, ConfigError> {
        let base = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(Self::with_root(base.join("terra")))
    }

    /// Layout rooted at an explicit directory (tests, CLI override).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The layout's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding shader sources.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Directory holding texture images.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Daylight texture map.
    pub fn day_texture(&self) -> PathBuf {
        self.images_dir().join("day.png")
    }

    /// Night-lights texture map.
    pub fn night_texture(&self) -> PathBuf {
        self.images_dir().join("night.png")
    }

    /// Starfield sky dome texture.
    pub fn sky_texture(&self) -> PathBuf {
        self.images_dir().join("skydome.png")
    }

    /// Raw cloud-cover download target.
    pub fn clouds_raw(&self) -> PathBuf {
        self.images_dir().join("clouds.jpg")
    }

    /// Processed (alpha-derived, flipped) cloud texture.
    pub fn clouds_processed(&self) -> PathBuf {
        self.images_dir().join("clouds.png")
    }

    /// Day/night blend vertex shader source.
    pub fn vertex_shader(&self) -> PathBuf {
        self.data_dir().join("earth.vert")
    }

    /// Day/night blend fragment shader source.
    pub fn fragment_shader(&self) -> PathBuf {
        self.data_dir().join("earth.frag")
    }

    /// Create the data and image directories if they are missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.data_dir())?;
        std::fs::create_dir_all(self.images_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths_are_rooted() {
        let layout = DataLayout::with_root("/tmp/terra-test");
        assert!(layout.day_texture().starts_with("/tmp/terra-test"));
        assert!(layout.vertex_shader().ends_with("data/earth.vert"));
        assert!(layout.clouds_raw().ends_with("images/clouds.jpg"));
        assert!(layout.clouds_processed().ends_with("images/clouds.png"));
    }

    #[test]
    fn test_ensure_dirs_creates_both_directories() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::with_root(dir.path().join("terra"));
        layout.ensure_dirs().unwrap();
        assert!(layout.data_dir().is_dir());
        assert!(layout.images_dir().is_dir());
    }

    #[test]
    fn test_raw_and_processed_cloud_paths_differ() {
        let layout = DataLayout::with_root("/x");
        assert_ne!(layout.clouds_raw(), layout.clouds_processed());
    }
}
