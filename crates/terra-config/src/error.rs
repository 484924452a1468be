//! Configuration error types.

/// Errors raised while loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the settings file from disk.
    #[error("failed to read settings: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the settings file to disk.
    #[error("failed to write settings: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse settings: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize settings to RON.
    #[error("failed to serialize settings: {0}")]
    SerializeError(#[source] ron::Error),

    /// The platform reported no per-user data directory.
    #[error("no per-user data directory available on this platform")]
    NoDataDir,
}
