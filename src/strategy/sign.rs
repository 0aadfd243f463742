//! Signature strategy: ML-DSA.

use std::sync::Arc;

use crate::algorithm::Algorithm;
use crate::container::SecretContainer;
use crate::contracts::SignatureScheme;
use crate::error::{CryptoError, Result};
use crate::native::{status, NativeLibrary};
use crate::params::SizeRole;

use super::{map_status, require_len};

#[derive(Clone)]
pub struct SignatureStrategy {
    algorithm: Algorithm,
    library: &'static NativeLibrary,
}

impl SignatureStrategy {
    pub(crate) fn new(algorithm: Algorithm, library: &'static NativeLibrary) -> Self {
        Self { algorithm, library }
    }

    fn sizes(&self) -> (usize, usize, usize) {
        let p = self.algorithm.parameter_sizes();
        (
            p.public_key.unwrap_or(0),
            p.private_key.unwrap_or(0),
            p.signature.unwrap_or(0),
        )
    }
}

impl SignatureScheme for SignatureStrategy {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn sign(
        &self,
        private_key: &SecretContainer,
        message: &[u8],
    ) -> Result<Arc<SecretContainer>> {
        require_len(self.algorithm, SizeRole::PrivateKey, private_key.byte_length())?;
        let (_, _, sig_len) = self.sizes();

        let bundle = SecretContainer::new_empty(sig_len)?;
        {
            let sk_view = private_key.segment_view()?;
            let mut sig_view = bundle.segment_view()?;

            let symbol = format!("{}_sign", self.algorithm.symbol_prefix());
            let f = self.library.get(&symbol)?.sign()?;
            let rc = unsafe {
                f(
                    sig_view.as_mut_ptr(),
                    message.as_ptr(),
                    message.len() as i64,
                    sk_view.as_ptr(),
                )
            };
            map_status(self.algorithm, &symbol, rc)?;
        }
        // The signed message rides along for the verification round trip.
        bundle.add_child_from(message)?;
        Ok(bundle)
    }

    fn verify(&self, public_key: &SecretContainer, bundle: &SecretContainer) -> Result<bool> {
        require_len(self.algorithm, SizeRole::PublicKey, public_key.byte_length())?;
        require_len(self.algorithm, SizeRole::Signature, bundle.byte_length())?;

        let message = bundle
            .child(0)?
            .ok_or(CryptoError::AuthenticationFailed { algorithm: self.algorithm })?;

        let pk_view = public_key.segment_view()?;
        let sig_view = bundle.segment_view()?;
        let msg_view = message.segment_view()?;

        let symbol = format!("{}_verify", self.algorithm.symbol_prefix());
        let f = self.library.get(&symbol)?.verify()?;
        let rc = unsafe {
            f(
                msg_view.as_ptr(),
                msg_view.len() as i64,
                sig_view.as_ptr(),
                pk_view.as_ptr(),
            )
        };
        // A well-formed but wrong signature reads as `false`; anything
        // else is a failure.
        match rc {
            status::OK => Ok(true),
            status::AUTH => Ok(false),
            _ => map_status(self.algorithm, &symbol, rc).map(|_| false),
        }
    }
}
