//! # quantvault
//!
//! Post-quantum capable cryptography with deterministic secret lifetimes.
//!
//! Every key, plaintext, ciphertext, IV and shared secret handled by this
//! library lives in a [`SecretContainer`]: a fixed-length off-heap region
//! that is wiped through a compiler-opaque primitive before its memory is
//! ever released, closes its children before itself, and survives
//! concurrent close races with exactly one wipe. Dropping a container
//! closes it, so scope exit (normal or panicking) cleans up.
//!
//! Cryptographic operations are resolved through the strategy [`Registry`]
//! and executed by a native core behind a C-ABI boundary (the core built
//! into this crate by default, or an external shared library via
//! `NATIVE_BIN_DIR`).
//!
//! ## Quick start
//!
//! ```rust
//! use quantvault::{Algorithm, Cipher, Registry, SecretContainer};
//!
//! let registry = Registry::global().unwrap();
//!
//! // AES-256-GCM round trip with a chained IV.
//! let mut cipher = registry
//!     .block_cipher(Algorithm::Aes256)
//!     .unwrap()
//!     .with_mode(quantvault::Mode::Gcm);
//! let key = SecretContainer::new_from(&[0u8; 32]).unwrap();
//! let plaintext = SecretContainer::new_from(b"sealed bytes").unwrap();
//!
//! let ciphertext = cipher.encrypt(&key, &plaintext, true).unwrap();
//! let recovered = cipher.decrypt(&key, &ciphertext, true).unwrap();
//! assert!(recovered.ct_eq(&plaintext).unwrap());
//! ```
//!
//! ## Security properties
//!
//! - **Wipe on close**: segments are zeroed before release, under
//!   concurrency and partial failure.
//! - **Hierarchical lifetimes**: composite results (signature bundles, KEM
//!   outputs) close as one tree, children first.
//! - **Size discipline**: every container length is validated against the
//!   parameter catalog; a mismatch is treated as tampering.
//! - **Hybrid KEM**: X25519 + ML-KEM-768; secure if either holds.
//!
//! ## What's NOT provided
//!
//! - Key management and persistence
//! - PEM/file encodings
//! - Constant-time guarantees beyond those of the underlying core

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

mod arena;
mod bundle;
mod config;
mod container;
mod contracts;
mod error;
mod kdf;
mod params;
mod registry;
mod strategy;

pub mod algorithm;
pub mod native;

// ---------------------------------------------------------------------------
// Public interface
// ---------------------------------------------------------------------------

pub use algorithm::{Algorithm, Category, DigestKind, Family, Mode, Padding};
pub use arena::ArenaMode;
pub use config::LibraryConfig;
pub use container::{SecretContainer, SegmentView};
pub use contracts::{
    AeadCipher, BlockCipher, Cipher, GeneratedKey, IvSource, Kem, KeyAgreement, KeyGenerator,
    SignatureScheme, StreamCipher,
};
pub use error::{CryptoError, Result};
pub use params::{ParameterSizes, SizeRole};
pub use registry::{OperationStrategy, Registry};
pub use strategy::{
    AeadStreamStrategy, BlockCipherStrategy, HybridKemStrategy, KemStrategy, KeyAgreementStrategy,
    KeyGenStrategy, SignatureStrategy, StreamCipherStrategy,
};
