//! Hybrid X25519 + ML-KEM-768 KEM.
//!
//! Key and ciphertext layouts concatenate the component encodings:
//!
//!   public key  = x25519_pk[32]           || mlkem_ek[1184]   (1216)
//!   private key = x25519_sk[32]           || mlkem_dk[2400]   (2432)
//!   ciphertext  = x25519_ephemeral_pk[32] || mlkem_ct[1088]   (1120)
//!
//! The combined shared secret is derived from both component secrets with
//! the transcript-bound KDF; security holds if either primitive does.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::algorithm::Algorithm;
use crate::container::SecretContainer;
use crate::contracts::Kem;
use crate::error::Result;
use crate::kdf;
use crate::native::NativeLibrary;
use crate::params::SizeRole;

use super::{map_status, require_len};

const X25519_KEY_LEN: usize = 32;
const MLKEM_CT_LEN: usize = 1088;
const SHARED_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct HybridKemStrategy {
    library: &'static NativeLibrary,
}

impl HybridKemStrategy {
    pub(crate) fn new(library: &'static NativeLibrary) -> Self {
        Self { library }
    }
}

impl Kem for HybridKemStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HybridX25519MlKem768
    }

    /// Composite result: combined secret at the root, ephemeral X25519
    /// public key at child 0, ML-KEM ciphertext at child 1.
    fn encapsulate(&self, public_key: &SecretContainer) -> Result<Arc<SecretContainer>> {
        let alg = self.algorithm();
        require_len(alg, SizeRole::PublicKey, public_key.byte_length())?;

        let secret = SecretContainer::new_empty(SHARED_SECRET_LEN)?;
        let eph_public = secret.add_child(X25519_KEY_LEN)?;
        let kem_ciphertext = secret.add_child(MLKEM_CT_LEN)?;
        // The ephemeral private key never leaves this frame.
        let eph_private = SecretContainer::new_empty(X25519_KEY_LEN)?;

        let mut x_ss = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
        let mut m_ss = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
        let transcript;
        {
            let pk_view = public_key.segment_view()?;
            let mut eph_pk_view = eph_public.segment_view()?;
            let mut eph_sk_view = eph_private.segment_view()?;
            let mut ct_view = kem_ciphertext.segment_view()?;

            let keygen = self.library.get("x25519_keygen")?.keygen()?;
            let rc = unsafe { keygen(eph_sk_view.as_mut_ptr(), eph_pk_view.as_mut_ptr()) };
            map_status(alg, "x25519_keygen", rc)?;

            let dh = self.library.get("x25519_dh")?.triple()?;
            let rc = unsafe {
                dh(x_ss.as_mut_ptr(), eph_sk_view.as_mut_ptr(), pk_view.as_ptr())
            };
            map_status(alg, "x25519_dh", rc)?;

            let encapsulate = self.library.get("ml_kem_768_encapsulate")?.triple()?;
            let rc = unsafe {
                encapsulate(
                    ct_view.as_mut_ptr(),
                    m_ss.as_mut_ptr(),
                    pk_view.as_ptr().add(X25519_KEY_LEN),
                )
            };
            map_status(alg, "ml_kem_768_encapsulate", rc)?;

            transcript = kdf::transcript_hash(&eph_pk_view, &ct_view);
        }

        let combined = kdf::combine_shared_secrets(&*x_ss, &*m_ss, &transcript)?;
        secret.segment_view()?.copy_from_slice(&*combined);
        eph_private.close();
        Ok(secret)
    }

    fn decapsulate(
        &self,
        private_key: &SecretContainer,
        ciphertext: &SecretContainer,
    ) -> Result<Arc<SecretContainer>> {
        let alg = self.algorithm();
        require_len(alg, SizeRole::PrivateKey, private_key.byte_length())?;
        require_len(alg, SizeRole::Ciphertext, ciphertext.byte_length())?;

        let secret = SecretContainer::new_empty(SHARED_SECRET_LEN)?;
        let mut x_ss = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
        let mut m_ss = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
        let transcript;
        {
            let sk_view = private_key.segment_view()?;
            let ct_view = ciphertext.segment_view()?;

            let dh = self.library.get("x25519_dh")?.triple()?;
            let rc = unsafe {
                dh(
                    x_ss.as_mut_ptr(),
                    sk_view.as_ptr() as *mut u8,
                    ct_view.as_ptr(),
                )
            };
            map_status(alg, "x25519_dh", rc)?;

            let decapsulate = self.library.get("ml_kem_768_decapsulate")?.triple()?;
            let rc = unsafe {
                decapsulate(
                    m_ss.as_mut_ptr(),
                    ct_view.as_ptr().add(X25519_KEY_LEN) as *mut u8,
                    sk_view.as_ptr().add(X25519_KEY_LEN),
                )
            };
            map_status(alg, "ml_kem_768_decapsulate", rc)?;

            transcript =
                kdf::transcript_hash(&ct_view[..X25519_KEY_LEN], &ct_view[X25519_KEY_LEN..]);
        }

        let combined = kdf::combine_shared_secrets(&*x_ss, &*m_ss, &transcript)?;
        secret.segment_view()?.copy_from_slice(&*combined);
        Ok(secret)
    }
}
