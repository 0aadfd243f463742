//! Hybrid shared-secret combiner.
//!
//! ikm  = x25519_ss[32] || mlkem_ss[32]
//! info = DOMAIN || SHA3-256(x25519_ephemeral_pk || mlkem_ct)
//! key  = HKDF-SHA256(ikm, salt=None, info=info, len=32)
//!
//! Binding the transcript hash into the info string ties the derived key
//! to the exact encapsulation that produced it.

use hkdf::Hkdf;
use sha2::Sha256;
use sha3::{Digest, Sha3_256};
use zeroize::Zeroizing;

use crate::algorithm::Algorithm;
use crate::error::{CryptoError, Result};

/// Domain-separation tag. Provisional until pinned by the outer protocol
/// specification.
pub(crate) const HYBRID_KDF_DOMAIN: &[u8] = b"quantvault-hybrid-x25519-mlkem768-v1";

pub(crate) const COMBINED_SECRET_LEN: usize = 32;

/// Hash of the encapsulation transcript (ephemeral public key plus KEM
/// ciphertext).
pub(crate) fn transcript_hash(eph_pk: &[u8], mlkem_ct: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(eph_pk);
    hasher.update(mlkem_ct);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Derive the combined 32-byte secret from the two component secrets.
pub(crate) fn combine_shared_secrets(
    x25519_ss: &[u8],
    mlkem_ss: &[u8],
    transcript: &[u8; 32],
) -> Result<Zeroizing<[u8; COMBINED_SECRET_LEN]>> {
    let mut ikm = Zeroizing::new([0u8; 64]);
    ikm[..32].copy_from_slice(x25519_ss);
    ikm[32..].copy_from_slice(mlkem_ss);

    let mut info = Vec::with_capacity(HYBRID_KDF_DOMAIN.len() + transcript.len());
    info.extend_from_slice(HYBRID_KDF_DOMAIN);
    info.extend_from_slice(transcript);

    let hk = Hkdf::<Sha256>::new(None, &*ikm);
    let mut out = Zeroizing::new([0u8; COMBINED_SECRET_LEN]);
    hk.expand(&info, &mut *out).map_err(|_| CryptoError::CryptoOperationFailed {
        algorithm: Algorithm::HybridX25519MlKem768,
        status: -1,
    })?;
    Ok(out)
}
