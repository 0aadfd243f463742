//! Parameter catalog: authoritative per-algorithm size constants.
//!
//! Sizes are in bytes. The container subsystem rejects any region whose
//! length disagrees with these values; a mismatch is treated as potential
//! tampering rather than a usage error.

use std::fmt;

/// Which size constant an input or output region is being validated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeRole {
    EncryptionKey,
    DecryptionKey,
    PublicKey,
    PrivateKey,
    Ciphertext,
    SharedSecret,
    Signature,
}

impl fmt::Display for SizeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SizeRole::EncryptionKey => "encryption key",
            SizeRole::DecryptionKey => "decryption key",
            SizeRole::PublicKey => "public key",
            SizeRole::PrivateKey => "private key",
            SizeRole::Ciphertext => "ciphertext",
            SizeRole::SharedSecret => "shared secret",
            SizeRole::Signature => "signature",
        };
        write!(f, "{}", label)
    }
}

/// Fixed sizes for whichever roles apply to an algorithm. Symmetric
/// ciphertext lengths are input-dependent and therefore absent here; the
/// strategies derive them from mode and padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterSizes {
    pub encryption_key: Option<usize>,
    pub decryption_key: Option<usize>,
    pub public_key: Option<usize>,
    pub private_key: Option<usize>,
    pub ciphertext: Option<usize>,
    pub shared_secret: Option<usize>,
    pub signature: Option<usize>,
}

impl ParameterSizes {
    pub fn get(&self, role: SizeRole) -> Option<usize> {
        match role {
            SizeRole::EncryptionKey => self.encryption_key,
            SizeRole::DecryptionKey => self.decryption_key,
            SizeRole::PublicKey => self.public_key,
            SizeRole::PrivateKey => self.private_key,
            SizeRole::Ciphertext => self.ciphertext,
            SizeRole::SharedSecret => self.shared_secret,
            SizeRole::Signature => self.signature,
        }
    }
}

const fn symmetric(key: usize) -> ParameterSizes {
    ParameterSizes {
        encryption_key: Some(key),
        decryption_key: Some(key),
        public_key: None,
        private_key: None,
        ciphertext: None,
        shared_secret: None,
        signature: None,
    }
}

const fn kem(pk: usize, sk: usize, ct: usize, ss: usize) -> ParameterSizes {
    ParameterSizes {
        encryption_key: None,
        decryption_key: None,
        public_key: Some(pk),
        private_key: Some(sk),
        ciphertext: Some(ct),
        shared_secret: Some(ss),
        signature: None,
    }
}

const fn signature(pk: usize, sk: usize, sig: usize) -> ParameterSizes {
    ParameterSizes {
        encryption_key: None,
        decryption_key: None,
        public_key: Some(pk),
        private_key: Some(sk),
        ciphertext: None,
        shared_secret: None,
        signature: Some(sig),
    }
}

pub(crate) static AES_128: ParameterSizes = symmetric(16);
pub(crate) static AES_192: ParameterSizes = symmetric(24);
pub(crate) static AES_256: ParameterSizes = symmetric(32);
pub(crate) static ARIA_128: ParameterSizes = symmetric(16);
pub(crate) static ARIA_192: ParameterSizes = symmetric(24);
pub(crate) static ARIA_256: ParameterSizes = symmetric(32);
pub(crate) static CHACHA20: ParameterSizes = symmetric(32);
pub(crate) static CHACHA20_POLY1305: ParameterSizes = symmetric(32);

pub(crate) static ML_KEM_512: ParameterSizes = kem(800, 1632, 768, 32);
pub(crate) static ML_KEM_768: ParameterSizes = kem(1184, 2400, 1088, 32);
pub(crate) static ML_KEM_1024: ParameterSizes = kem(1568, 3168, 1568, 32);

pub(crate) static ML_DSA_44: ParameterSizes = signature(1312, 2560, 2420);
pub(crate) static ML_DSA_65: ParameterSizes = signature(1952, 4032, 3309);
pub(crate) static ML_DSA_87: ParameterSizes = signature(2592, 4896, 4627);

// SLH-DSA (FIPS 205), SHAKE parameter sets. Catalogued but not yet wired to
// a native implementation.
pub(crate) static SLH_DSA_SHAKE_128S: ParameterSizes = signature(32, 64, 7856);
pub(crate) static SLH_DSA_SHAKE_128F: ParameterSizes = signature(32, 64, 17088);
pub(crate) static SLH_DSA_SHAKE_192S: ParameterSizes = signature(48, 96, 16224);
pub(crate) static SLH_DSA_SHAKE_192F: ParameterSizes = signature(48, 96, 35664);
pub(crate) static SLH_DSA_SHAKE_256S: ParameterSizes = signature(64, 128, 29792);
pub(crate) static SLH_DSA_SHAKE_256F: ParameterSizes = signature(64, 128, 49856);

pub(crate) static X25519: ParameterSizes = kem(32, 32, 32, 32);

/// Hybrid X25519 + ML-KEM-768: concatenated keys and ciphertext, combined
/// 32-byte secret after key derivation.
pub(crate) static HYBRID_X25519_ML_KEM_768: ParameterSizes = kem(
    32 + 1184, // x25519_pk || mlkem_ek
    32 + 2400, // x25519_sk || mlkem_dk
    32 + 1088, // x25519_ephemeral_pk || mlkem_ct
    32,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kem_rows_match_fips_203() {
        assert_eq!(ML_KEM_512.public_key, Some(800));
        assert_eq!(ML_KEM_768.ciphertext, Some(1088));
        assert_eq!(ML_KEM_1024.private_key, Some(3168));
        assert_eq!(ML_KEM_768.shared_secret, Some(32));
    }

    #[test]
    fn signature_rows_match_fips_204() {
        assert_eq!(ML_DSA_44.signature, Some(2420));
        assert_eq!(ML_DSA_65.signature, Some(3309));
        assert_eq!(ML_DSA_87.signature, Some(4627));
    }

    #[test]
    fn hybrid_concatenates_component_sizes() {
        assert_eq!(HYBRID_X25519_ML_KEM_768.public_key, Some(1216));
        assert_eq!(HYBRID_X25519_ML_KEM_768.private_key, Some(2432));
        assert_eq!(HYBRID_X25519_ML_KEM_768.ciphertext, Some(1120));
    }
}
