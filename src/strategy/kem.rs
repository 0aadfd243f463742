//! KEM strategy: ML-KEM.

use std::sync::Arc;

use crate::algorithm::Algorithm;
use crate::container::SecretContainer;
use crate::contracts::Kem;
use crate::error::Result;
use crate::native::NativeLibrary;
use crate::params::SizeRole;

use super::{map_status, require_len};

#[derive(Clone)]
pub struct KemStrategy {
    algorithm: Algorithm,
    library: &'static NativeLibrary,
}

impl KemStrategy {
    pub(crate) fn new(algorithm: Algorithm, library: &'static NativeLibrary) -> Self {
        Self { algorithm, library }
    }
}

impl Kem for KemStrategy {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Composite result: shared secret at the root, ciphertext at child 0.
    fn encapsulate(&self, public_key: &SecretContainer) -> Result<Arc<SecretContainer>> {
        require_len(self.algorithm, SizeRole::PublicKey, public_key.byte_length())?;
        let sizes = self.algorithm.parameter_sizes();
        let ss_len = sizes.shared_secret.unwrap_or(0);
        let ct_len = sizes.ciphertext.unwrap_or(0);

        let secret = SecretContainer::new_empty(ss_len)?;
        let ciphertext = secret.add_child(ct_len)?;
        {
            let pk_view = public_key.segment_view()?;
            let mut ss_view = secret.segment_view()?;
            let mut ct_view = ciphertext.segment_view()?;

            let symbol = format!("{}_encapsulate", self.algorithm.symbol_prefix());
            let f = self.library.get(&symbol)?.triple()?;
            let rc = unsafe { f(ct_view.as_mut_ptr(), ss_view.as_mut_ptr(), pk_view.as_ptr()) };
            map_status(self.algorithm, &symbol, rc)?;
        }
        Ok(secret)
    }

    fn decapsulate(
        &self,
        private_key: &SecretContainer,
        ciphertext: &SecretContainer,
    ) -> Result<Arc<SecretContainer>> {
        require_len(self.algorithm, SizeRole::PrivateKey, private_key.byte_length())?;
        require_len(self.algorithm, SizeRole::Ciphertext, ciphertext.byte_length())?;
        let ss_len = self.algorithm.parameter_sizes().shared_secret.unwrap_or(0);

        let secret = SecretContainer::new_empty(ss_len)?;
        {
            let sk_view = private_key.segment_view()?;
            let ct_view = ciphertext.segment_view()?;
            let mut ss_view = secret.segment_view()?;

            let symbol = format!("{}_decapsulate", self.algorithm.symbol_prefix());
            let f = self.library.get(&symbol)?.triple()?;
            let rc = unsafe {
                f(ss_view.as_mut_ptr(), ct_view.as_ptr() as *mut u8, sk_view.as_ptr())
            };
            map_status(self.algorithm, &symbol, rc)?;
        }
        Ok(secret)
    }
}
