//! Algorithm taxonomy: identities, families, categories, modes and padding.

use crate::native::abi;
use crate::params::{self, ParameterSizes};
use std::fmt;
use std::sync::Once;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Algorithm identifier. Value-typed and globally unique; equality is by
/// identity, which coincides with `name()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Aes128,
    Aes192,
    Aes256,
    Aria128,
    Aria192,
    Aria256,
    ChaCha20,
    ChaCha20Poly1305,
    MlKem512,
    MlKem768,
    MlKem1024,
    MlDsa44,
    MlDsa65,
    MlDsa87,
    SlhDsaShake128s,
    SlhDsaShake128f,
    SlhDsaShake192s,
    SlhDsaShake192f,
    SlhDsaShake256s,
    SlhDsaShake256f,
    X25519,
    HybridX25519MlKem768,
}

/// Construction family grouping an algorithm's variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Aes,
    Aria,
    ChaCha,
    MlKem,
    MlDsa,
    SlhDsa,
    X25519,
    Hybrid,
}

/// Operational category. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    BlockCipher,
    StreamCipher,
    Signature,
    Kem,
    KeyAgreement,
    KeyDerivation,
}

impl Algorithm {
    pub const ALL: &'static [Algorithm] = &[
        Algorithm::Aes128,
        Algorithm::Aes192,
        Algorithm::Aes256,
        Algorithm::Aria128,
        Algorithm::Aria192,
        Algorithm::Aria256,
        Algorithm::ChaCha20,
        Algorithm::ChaCha20Poly1305,
        Algorithm::MlKem512,
        Algorithm::MlKem768,
        Algorithm::MlKem1024,
        Algorithm::MlDsa44,
        Algorithm::MlDsa65,
        Algorithm::MlDsa87,
        Algorithm::SlhDsaShake128s,
        Algorithm::SlhDsaShake128f,
        Algorithm::SlhDsaShake192s,
        Algorithm::SlhDsaShake192f,
        Algorithm::SlhDsaShake256s,
        Algorithm::SlhDsaShake256f,
        Algorithm::X25519,
        Algorithm::HybridX25519MlKem768,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Aes128 => "AES-128",
            Algorithm::Aes192 => "AES-192",
            Algorithm::Aes256 => "AES-256",
            Algorithm::Aria128 => "ARIA-128",
            Algorithm::Aria192 => "ARIA-192",
            Algorithm::Aria256 => "ARIA-256",
            Algorithm::ChaCha20 => "ChaCha20",
            Algorithm::ChaCha20Poly1305 => "ChaCha20-Poly1305",
            Algorithm::MlKem512 => "ML-KEM-512",
            Algorithm::MlKem768 => "ML-KEM-768",
            Algorithm::MlKem1024 => "ML-KEM-1024",
            Algorithm::MlDsa44 => "ML-DSA-44",
            Algorithm::MlDsa65 => "ML-DSA-65",
            Algorithm::MlDsa87 => "ML-DSA-87",
            Algorithm::SlhDsaShake128s => "SLH-DSA-SHAKE-128s",
            Algorithm::SlhDsaShake128f => "SLH-DSA-SHAKE-128f",
            Algorithm::SlhDsaShake192s => "SLH-DSA-SHAKE-192s",
            Algorithm::SlhDsaShake192f => "SLH-DSA-SHAKE-192f",
            Algorithm::SlhDsaShake256s => "SLH-DSA-SHAKE-256s",
            Algorithm::SlhDsaShake256f => "SLH-DSA-SHAKE-256f",
            Algorithm::X25519 => "X25519",
            Algorithm::HybridX25519MlKem768 => "X25519+ML-KEM-768",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Algorithm::Aes128 | Algorithm::Aes192 | Algorithm::Aes256 => Family::Aes,
            Algorithm::Aria128 | Algorithm::Aria192 | Algorithm::Aria256 => Family::Aria,
            Algorithm::ChaCha20 | Algorithm::ChaCha20Poly1305 => Family::ChaCha,
            Algorithm::MlKem512 | Algorithm::MlKem768 | Algorithm::MlKem1024 => Family::MlKem,
            Algorithm::MlDsa44 | Algorithm::MlDsa65 | Algorithm::MlDsa87 => Family::MlDsa,
            Algorithm::SlhDsaShake128s
            | Algorithm::SlhDsaShake128f
            | Algorithm::SlhDsaShake192s
            | Algorithm::SlhDsaShake192f
            | Algorithm::SlhDsaShake256s
            | Algorithm::SlhDsaShake256f => Family::SlhDsa,
            Algorithm::X25519 => Family::X25519,
            Algorithm::HybridX25519MlKem768 => Family::Hybrid,
        }
    }

    pub fn category(&self) -> Category {
        match self.family() {
            Family::Aes | Family::Aria => Category::BlockCipher,
            Family::ChaCha => Category::StreamCipher,
            Family::MlKem | Family::Hybrid => Category::Kem,
            Family::MlDsa | Family::SlhDsa => Category::Signature,
            Family::X25519 => Category::KeyAgreement,
        }
    }

    pub fn is_post_quantum(&self) -> bool {
        matches!(
            self.family(),
            Family::MlKem | Family::MlDsa | Family::SlhDsa | Family::Hybrid
        )
    }

    pub fn parameter_sizes(&self) -> &'static ParameterSizes {
        match self {
            Algorithm::Aes128 => &params::AES_128,
            Algorithm::Aes192 => &params::AES_192,
            Algorithm::Aes256 => &params::AES_256,
            Algorithm::Aria128 => &params::ARIA_128,
            Algorithm::Aria192 => &params::ARIA_192,
            Algorithm::Aria256 => &params::ARIA_256,
            Algorithm::ChaCha20 => &params::CHACHA20,
            Algorithm::ChaCha20Poly1305 => &params::CHACHA20_POLY1305,
            Algorithm::MlKem512 => &params::ML_KEM_512,
            Algorithm::MlKem768 => &params::ML_KEM_768,
            Algorithm::MlKem1024 => &params::ML_KEM_1024,
            Algorithm::MlDsa44 => &params::ML_DSA_44,
            Algorithm::MlDsa65 => &params::ML_DSA_65,
            Algorithm::MlDsa87 => &params::ML_DSA_87,
            Algorithm::SlhDsaShake128s => &params::SLH_DSA_SHAKE_128S,
            Algorithm::SlhDsaShake128f => &params::SLH_DSA_SHAKE_128F,
            Algorithm::SlhDsaShake192s => &params::SLH_DSA_SHAKE_192S,
            Algorithm::SlhDsaShake192f => &params::SLH_DSA_SHAKE_192F,
            Algorithm::SlhDsaShake256s => &params::SLH_DSA_SHAKE_256S,
            Algorithm::SlhDsaShake256f => &params::SLH_DSA_SHAKE_256F,
            Algorithm::X25519 => &params::X25519,
            Algorithm::HybridX25519MlKem768 => &params::HYBRID_X25519_ML_KEM_768,
        }
    }

    /// Native symbol prefix for algorithms backed by per-variant symbols.
    pub(crate) fn symbol_prefix(&self) -> &'static str {
        match self {
            Algorithm::Aes128 => "aes_128",
            Algorithm::Aes192 => "aes_192",
            Algorithm::Aes256 => "aes_256",
            Algorithm::Aria128 => "aria_128",
            Algorithm::Aria192 => "aria_192",
            Algorithm::Aria256 => "aria_256",
            Algorithm::ChaCha20 => "chacha20",
            Algorithm::ChaCha20Poly1305 => "chacha20_poly1305",
            Algorithm::MlKem512 => "ml_kem_512",
            Algorithm::MlKem768 => "ml_kem_768",
            Algorithm::MlKem1024 => "ml_kem_1024",
            Algorithm::MlDsa44 => "ml_dsa_44",
            Algorithm::MlDsa65 => "ml_dsa_65",
            Algorithm::MlDsa87 => "ml_dsa_87",
            Algorithm::X25519 => "x25519",
            _ => "",
        }
    }

    /// Nonce length for stream-family algorithms.
    pub(crate) fn nonce_len(&self) -> usize {
        match self {
            Algorithm::ChaCha20 => 8,
            Algorithm::ChaCha20Poly1305 => 12,
            _ => 0,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Block cipher modes of operation
// ---------------------------------------------------------------------------

/// Modes of operation for block ciphers. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
    Ctr,
    Gcm,
    Ccm,
}

impl Mode {
    pub fn is_aead(&self) -> bool {
        matches!(self, Mode::Gcm | Mode::Ccm)
    }

    /// IV/nonce length the mode expects: 16 bytes for the classic modes,
    /// 12 for AEAD, none for ECB.
    pub fn iv_len(&self) -> usize {
        match self {
            Mode::Ecb => 0,
            Mode::Cbc | Mode::Cfb | Mode::Ofb | Mode::Ctr => 16,
            Mode::Gcm | Mode::Ccm => 12,
        }
    }

    /// Identifier travelling in the packed block-cipher mode argument.
    /// AEAD modes use dedicated symbols and have no identifier here.
    pub(crate) fn abi_id(&self) -> Option<i32> {
        match self {
            Mode::Ecb => Some(abi::MODE_ECB),
            Mode::Cbc => Some(abi::MODE_CBC),
            Mode::Cfb => Some(abi::MODE_CFB),
            Mode::Ofb => Some(abi::MODE_OFB),
            Mode::Ctr => Some(abi::MODE_CTR),
            Mode::Gcm | Mode::Ccm => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mode::Ecb => "ECB",
            Mode::Cbc => "CBC",
            Mode::Cfb => "CFB",
            Mode::Ofb => "OFB",
            Mode::Ctr => "CTR",
            Mode::Gcm => "GCM",
            Mode::Ccm => "CCM",
        };
        write!(f, "{}", label)
    }
}

/// ECB leaks plaintext structure; it stays reachable for standards
/// compliance but the first use always warns, and nothing silences it.
static ECB_WARNING: Once = Once::new();

pub(crate) fn warn_ecb_once(algorithm: Algorithm) {
    ECB_WARNING.call_once(|| {
        tracing::warn!(
            algorithm = algorithm.name(),
            "ECB mode selected: identical plaintext blocks produce identical \
             ciphertext blocks; prefer an authenticated mode"
        );
    });
}

// ---------------------------------------------------------------------------
// Padding
// ---------------------------------------------------------------------------

/// Padding schemes. `Pkcs1` and `OaepMgf1` are reserved for asymmetric
/// primitives; block ciphers reject them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Padding {
    Pkcs7,
    Iso7816,
    Iso10126,
    Zero,
    None,
    Pkcs1,
    OaepMgf1,
}

impl Padding {
    pub fn is_asymmetric(&self) -> bool {
        matches!(self, Padding::Pkcs1 | Padding::OaepMgf1)
    }

    pub(crate) fn abi_id(&self) -> Option<i32> {
        match self {
            Padding::None => Some(abi::PAD_NONE),
            Padding::Pkcs7 => Some(abi::PAD_PKCS7),
            Padding::Iso7816 => Some(abi::PAD_ISO7816),
            Padding::Iso10126 => Some(abi::PAD_ISO10126),
            Padding::Zero => Some(abi::PAD_ZERO),
            Padding::Pkcs1 | Padding::OaepMgf1 => None,
        }
    }

    /// Whether the scheme pads up to a whole block (changing the
    /// ciphertext length) in ECB/CBC.
    pub(crate) fn expands(&self) -> bool {
        !matches!(self, Padding::None)
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Padding::Pkcs7 => "PKCS7",
            Padding::Iso7816 => "ISO7816",
            Padding::Iso10126 => "ISO10126",
            Padding::Zero => "ZERO",
            Padding::None => "NONE",
            Padding::Pkcs1 => "PKCS1",
            Padding::OaepMgf1 => "OAEP-MGF1",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

/// Digest selection carried by the block-cipher builder. Used by the
/// asymmetric padding schemes; the symmetric modes ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DigestKind {
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_partition_the_taxonomy() {
        for alg in Algorithm::ALL {
            match alg.category() {
                Category::BlockCipher => {
                    assert!(alg.parameter_sizes().encryption_key.is_some())
                }
                Category::StreamCipher => {
                    assert!(alg.parameter_sizes().encryption_key.is_some())
                }
                Category::Kem => assert!(alg.parameter_sizes().ciphertext.is_some()),
                Category::Signature => assert!(alg.parameter_sizes().signature.is_some()),
                Category::KeyAgreement => {
                    assert!(alg.parameter_sizes().shared_secret.is_some())
                }
                Category::KeyDerivation => {}
            }
        }
    }

    #[test]
    fn post_quantum_flag_tracks_family() {
        assert!(Algorithm::MlKem768.is_post_quantum());
        assert!(Algorithm::SlhDsaShake128s.is_post_quantum());
        assert!(Algorithm::HybridX25519MlKem768.is_post_quantum());
        assert!(!Algorithm::Aes256.is_post_quantum());
        assert!(!Algorithm::X25519.is_post_quantum());
    }

    #[test]
    fn aead_modes_use_short_ivs() {
        assert_eq!(Mode::Gcm.iv_len(), 12);
        assert_eq!(Mode::Ccm.iv_len(), 12);
        assert_eq!(Mode::Cbc.iv_len(), 16);
        assert_eq!(Mode::Ecb.iv_len(), 0);
        assert!(Mode::Gcm.is_aead());
        assert!(!Mode::Ctr.is_aead());
    }

    #[test]
    fn asymmetric_padding_has_no_block_identifier() {
        assert_eq!(Padding::Pkcs1.abi_id(), None);
        assert_eq!(Padding::OaepMgf1.abi_id(), None);
        assert!(Padding::Pkcs1.is_asymmetric());
    }
}
