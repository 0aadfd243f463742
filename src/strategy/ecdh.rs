//! Key agreement strategy: X25519.

use std::sync::Arc;

use crate::algorithm::Algorithm;
use crate::container::SecretContainer;
use crate::contracts::KeyAgreement;
use crate::error::Result;
use crate::native::NativeLibrary;
use crate::params::SizeRole;

use super::{map_status, require_len};

#[derive(Clone)]
pub struct KeyAgreementStrategy {
    algorithm: Algorithm,
    library: &'static NativeLibrary,
}

impl KeyAgreementStrategy {
    pub(crate) fn new(algorithm: Algorithm, library: &'static NativeLibrary) -> Self {
        Self { algorithm, library }
    }
}

impl KeyAgreement for KeyAgreementStrategy {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn compute_shared(
        &self,
        my_private: &SecretContainer,
        peer_public: &SecretContainer,
    ) -> Result<Arc<SecretContainer>> {
        require_len(self.algorithm, SizeRole::PrivateKey, my_private.byte_length())?;
        require_len(self.algorithm, SizeRole::PublicKey, peer_public.byte_length())?;
        let ss_len = self.algorithm.parameter_sizes().shared_secret.unwrap_or(0);

        let secret = SecretContainer::new_empty(ss_len)?;
        {
            let sk_view = my_private.segment_view()?;
            let pk_view = peer_public.segment_view()?;
            let mut ss_view = secret.segment_view()?;

            let symbol = format!("{}_dh", self.algorithm.symbol_prefix());
            let f = self.library.get(&symbol)?.triple()?;
            let rc = unsafe {
                f(ss_view.as_mut_ptr(), sk_view.as_ptr() as *mut u8, pk_view.as_ptr())
            };
            map_status(self.algorithm, &symbol, rc)?;
        }
        Ok(secret)
    }
}
