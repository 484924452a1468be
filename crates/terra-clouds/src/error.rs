//! Cloud refresh error types.

/// Errors raised while downloading the raw cloud image.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request failed (DNS, TLS, connection, or status error).
    #[error("cloud download failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    /// Reading the response body or writing the cache file failed.
    #[error("cloud download I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker thread terminated without reporting a result.
    #[error("cloud download worker terminated unexpectedly")]
    WorkerLost,
}

/// Errors raised while transforming the raw image into the overlay texture.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Decoding the raw download or encoding the processed file failed.
    #[error("cloud image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// The decoded buffer does not match its declared dimensions.
    #[error("cloud image has inconsistent dimensions {width}x{height} for {len} bytes")]
    BadDimensions { width: u32, height: u32, len: usize },
}
