//! Raw ESC/POS passthrough decoding
//!
//! Escape hatch for commands outside the encoder's table. Payloads arrive as
//! base64 or hex text; malformed input fails with `InvalidEncoding` and
//! produces no bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{PrintError, PrintResult};

/// Decode a base64 payload into raw command bytes
pub fn decode_base64(input: &str) -> PrintResult<Vec<u8>> {
    STANDARD
        .decode(input.trim())
        .map_err(|e| PrintError::InvalidEncoding(format!("base64: {e}")))
}

/// Decode a hex payload into raw command bytes
pub fn decode_hex(input: &str) -> PrintResult<Vec<u8>> {
    hex::decode(input.trim())
        .map_err(|e| PrintError::InvalidEncoding(format!("hex: {e}")))
}
