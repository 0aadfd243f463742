//! Key generation strategies.

use crate::algorithm::Algorithm;
use crate::container::SecretContainer;
use crate::contracts::{GeneratedKey, KeyGenerator};
use crate::error::Result;
use crate::native::{self, NativeLibrary};

use super::map_status;

#[derive(Clone, Copy)]
enum Kind {
    /// Random key material of the catalog length.
    Symmetric { key_len: usize },
    /// One native keygen call filling both halves of the pair.
    Asymmetric { pk_len: usize, sk_len: usize },
    /// Two component keygens writing into concatenated regions.
    HybridX25519MlKem768,
}

#[derive(Clone)]
pub struct KeyGenStrategy {
    algorithm: Algorithm,
    library: &'static NativeLibrary,
    kind: Kind,
}

impl KeyGenStrategy {
    pub(crate) fn symmetric(algorithm: Algorithm, library: &'static NativeLibrary) -> Self {
        let key_len = algorithm.parameter_sizes().encryption_key.unwrap_or(0);
        Self { algorithm, library, kind: Kind::Symmetric { key_len } }
    }

    pub(crate) fn asymmetric(algorithm: Algorithm, library: &'static NativeLibrary) -> Self {
        let sizes = algorithm.parameter_sizes();
        Self {
            algorithm,
            library,
            kind: Kind::Asymmetric {
                pk_len: sizes.public_key.unwrap_or(0),
                sk_len: sizes.private_key.unwrap_or(0),
            },
        }
    }

    pub(crate) fn hybrid(library: &'static NativeLibrary) -> Self {
        Self {
            algorithm: Algorithm::HybridX25519MlKem768,
            library,
            kind: Kind::HybridX25519MlKem768,
        }
    }
}

impl KeyGenerator for KeyGenStrategy {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn generate(&self) -> Result<GeneratedKey> {
        match self.kind {
            Kind::Symmetric { key_len } => {
                let key = SecretContainer::new_empty(key_len)?;
                {
                    let mut view = key.segment_view()?;
                    unsafe { native::fill_random(view.as_mut_ptr(), key_len)? };
                }
                Ok(GeneratedKey::Symmetric(key))
            }
            Kind::Asymmetric { pk_len, sk_len } => {
                let public_key = SecretContainer::new_empty(pk_len)?;
                let private_key = SecretContainer::new_empty(sk_len)?;
                {
                    let mut pk_view = public_key.segment_view()?;
                    let mut sk_view = private_key.segment_view()?;
                    let symbol = format!("{}_keygen", self.algorithm.symbol_prefix());
                    let f = self.library.get(&symbol)?.keygen()?;
                    let rc = unsafe { f(sk_view.as_mut_ptr(), pk_view.as_mut_ptr()) };
                    map_status(self.algorithm, &symbol, rc)?;
                }
                Ok(GeneratedKey::KeyPair { public_key, private_key })
            }
            Kind::HybridX25519MlKem768 => {
                let sizes = self.algorithm.parameter_sizes();
                let public_key = SecretContainer::new_empty(sizes.public_key.unwrap_or(0))?;
                let private_key = SecretContainer::new_empty(sizes.private_key.unwrap_or(0))?;
                {
                    let mut pk_view = public_key.segment_view()?;
                    let mut sk_view = private_key.segment_view()?;

                    let f = self.library.get("x25519_keygen")?.keygen()?;
                    let rc = unsafe { f(sk_view.as_mut_ptr(), pk_view.as_mut_ptr()) };
                    map_status(self.algorithm, "x25519_keygen", rc)?;

                    let f = self.library.get("ml_kem_768_keygen")?.keygen()?;
                    let rc = unsafe {
                        f(sk_view.as_mut_ptr().add(32), pk_view.as_mut_ptr().add(32))
                    };
                    map_status(self.algorithm, "ml_kem_768_keygen", rc)?;
                }
                Ok(GeneratedKey::KeyPair { public_key, private_key })
            }
        }
    }
}
