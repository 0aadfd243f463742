//! Unified error type for the library.
//!
//! One enum covers the whole failure surface: native binding, container
//! lifecycle, size validation, IV validation, native status mapping and
//! registry capability mismatches. Errors carry algorithm identifiers and
//! lengths for diagnostics; they never carry key or plaintext bytes.

use crate::algorithm::Algorithm;
use crate::params::SizeRole;
use std::fmt;

pub type Result<T> = std::result::Result<T, CryptoError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The native shared library is absent or unreadable.
    LibraryNotFound { path: String },
    /// A required symbol is missing from the bound native core.
    SymbolNotFound { symbol: String },
    /// Lookup of a handle that was never registered.
    UnknownSymbol { symbol: String },
    /// Operation attempted on a closed container.
    AlreadyClosed,
    /// An input region's length disagrees with the parameter catalog.
    /// Treated as potential tampering, not as a benign usage error.
    SizeMismatch {
        algorithm: Algorithm,
        role: SizeRole,
        expected: usize,
        actual: usize,
    },
    /// IV/nonce argument has the wrong shape or length for the chosen mode.
    InvalidIv(String),
    /// The off-heap region could not be allocated.
    AllocationFailed { bytes: usize },
    /// The native core returned a generic negative status.
    CryptoOperationFailed { algorithm: Algorithm, status: i32 },
    /// AEAD tag mismatch, or a malformed signature/verification input.
    AuthenticationFailed { algorithm: Algorithm },
    /// A registered strategy does not provide the requested capability.
    UnsupportedCapability {
        algorithm: Algorithm,
        requested: &'static str,
    },
    /// The native core caught an internal panic.
    NativePanic { symbol: String },
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LibraryNotFound { path } => {
                write!(f, "native library not found: {}", path)
            }
            Self::SymbolNotFound { symbol } => {
                write!(f, "native symbol not found: {}", symbol)
            }
            Self::UnknownSymbol { symbol } => {
                write!(f, "no handle registered for symbol: {}", symbol)
            }
            Self::AlreadyClosed => write!(f, "container already closed"),
            Self::SizeMismatch { algorithm, role, expected, actual } => write!(
                f,
                "{}: {} length {} does not match expected {}",
                algorithm.name(),
                role,
                actual,
                expected
            ),
            Self::InvalidIv(msg) => write!(f, "invalid iv: {}", msg),
            Self::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {} byte region", bytes)
            }
            Self::CryptoOperationFailed { algorithm, status } => {
                write!(f, "{}: native operation failed (status {})", algorithm.name(), status)
            }
            Self::AuthenticationFailed { algorithm } => {
                write!(f, "{}: authentication failed", algorithm.name())
            }
            Self::UnsupportedCapability { algorithm, requested } => {
                write!(f, "{}: strategy does not support {}", algorithm.name(), requested)
            }
            Self::NativePanic { symbol } => {
                write!(f, "native core panicked in {}", symbol)
            }
        }
    }
}

impl std::error::Error for CryptoError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_never_contains_key_material() {
        let err = CryptoError::SizeMismatch {
            algorithm: Algorithm::Aes256,
            role: SizeRole::EncryptionKey,
            expected: 32,
            actual: 16,
        };
        let msg = err.to_string();
        assert!(msg.contains("AES-256"));
        assert!(msg.contains("32"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn already_closed_is_terse() {
        assert_eq!(CryptoError::AlreadyClosed.to_string(), "container already closed");
    }
}
