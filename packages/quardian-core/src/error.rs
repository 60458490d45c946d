//! # Error Handling
//!
//! Error types for Quardian Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Client Errors (caller must fix and resend)                        │
//! │  │   ├── MalformedInput        - Bad base64, wrong length, bad scheme  │
//! │  │   └── AuthenticationFailed  - AEAD tag did not verify               │
//! │  │                                                                      │
//! │  └── Server Errors (internal fault)                                    │
//! │      ├── CryptoFailure         - Underlying primitive failed           │
//! │      └── Storage               - Job sink could not record/count       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A signature that does not verify is **not** an error: `verify` returns
//! `Ok(false)` for a well-formed but non-matching triple.
//!
//! `AuthenticationFailed` deliberately carries no detail. Tampered
//! ciphertext, a wrong key, a wrong nonce and a wrong tag all produce the
//! same value.

use thiserror::Error;

/// Result type alias for Quardian Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Quardian Core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Client Errors (100-299)
    // ========================================================================

    /// A caller-supplied field could not be decoded or has the wrong length
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The authentication tag did not verify during decryption
    #[error("Authentication failed")]
    AuthenticationFailed,

    // ========================================================================
    // Server Errors (300-499)
    // ========================================================================

    /// An underlying cryptographic primitive failed
    #[error("Cryptographic failure: {0}")]
    CryptoFailure(String),

    /// The job sink failed to record or count operations
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Shorthand for a malformed-input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }

    /// Numeric error code
    ///
    /// - 100-199: Input
    /// - 200-299: Authentication
    /// - 300-399: Crypto
    /// - 400-499: Storage
    pub fn code(&self) -> i32 {
        match self {
            Error::MalformedInput(_) => 100,
            Error::AuthenticationFailed => 200,
            Error::CryptoFailure(_) => 300,
            Error::Storage(_) => 400,
        }
    }

    /// Whether the caller caused this error (client-error response class)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MalformedInput(_) | Error::AuthenticationFailed)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::MalformedInput(format!("invalid base64: {}", err))
    }
}

// ============================================================================
// TESTS
// ============================================================================
