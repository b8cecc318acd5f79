//! Error types for the paperjet library

use thiserror::Error;

/// Printer and encoding error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Image with a zero width or height
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },

    /// Malformed base64/hex raw passthrough payload
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Code page name not in the supported table
    #[error("Unsupported code page: {0}")]
    UnsupportedCodePage(String),

    /// Transport-level delivery failure (no retry is ever attempted)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Timeout waiting for the printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// IO error during delivery
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
