//! Graphics-specific error types.

use thiserror::Error;

/// Graphics backend error type.
#[derive(Error, Debug)]
pub enum GfxError {
    /// Device or immediate context creation failed. Fatal; there is no
    /// software fallback.
    #[error("Device creation error: {0}")]
    Device(String),

    /// Swap chain creation failed.
    #[error("Swap chain error: {0}")]
    SwapChain(String),

    /// Fetching or wrapping the back buffer failed.
    #[error("Back buffer error: {0}")]
    BackBuffer(String),

    /// Resizing the swap chain buffers failed.
    #[error("Resize error: {0}")]
    ResizeBuffers(String),

    /// Present failed for a reason other than device loss.
    #[error("Present error: {0}")]
    Present(String),

    /// The device was removed or reset; the whole device context set must
    /// be recreated.
    #[error("Device lost: {0}")]
    DeviceLost(String),
}

/// Result type alias for graphics operations.
pub type GfxResult<T> = std::result::Result<T, GfxError>;
