//! # Codec
//!
//! Base64 helpers for every binary field crossing the core boundary
//! (ciphertext, IV, tag, key, public key, signature).
//!
//! Standard alphabet, padded, canonical: `decode(encode(b)) == b` for all
//! byte strings, and any string that is not the canonical encoding of some
//! byte string is rejected with [`Error::MalformedInput`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Encode bytes as standard padded base64
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 field
///
/// `field` names the input in the error message (e.g. `"iv"`).
pub fn decode(field: &str, encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| Error::malformed(format!("{} is not valid base64: {}", field, e)))
}

/// Decode a base64 field that must be exactly `N` bytes long
pub fn decode_fixed<const N: usize>(field: &str, encoded: &str) -> Result<[u8; N]> {
    let bytes = decode(field, encoded)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| Error::malformed(format!("{} must be {} bytes, got {}", field, N, len)))
}

/// Decode secret material; the intermediate buffer is wiped on drop
pub fn decode_secret<const N: usize>(field: &str, encoded: &str) -> Result<Zeroizing<[u8; N]>> {
    let bytes = Zeroizing::new(decode(field, encoded)?);
    if bytes.len() != N {
        return Err(Error::malformed(format!(
            "{} must be {} bytes, got {}",
            field,
            N,
            bytes.len()
        )));
    }
    let mut out = Zeroizing::new([0u8; N]);
    out.copy_from_slice(&bytes);
    Ok(out)
}
