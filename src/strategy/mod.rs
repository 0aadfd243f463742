//! Operation strategies.
//!
//! Every strategy follows the same shape: validate input container lengths
//! against the parameter catalog, allocate output containers, fetch the
//! native handle, invoke it with segment addresses, translate the status
//! code, and hand the outputs back. Containers allocated along the way are
//! owned by the operation until it returns, so any failure path wipes them
//! on the way out.

mod block;
mod ecdh;
mod hybrid;
mod kem;
mod keygen;
mod sign;
mod stream;

pub use block::BlockCipherStrategy;
pub use ecdh::KeyAgreementStrategy;
pub use hybrid::HybridKemStrategy;
pub use kem::KemStrategy;
pub use keygen::KeyGenStrategy;
pub use sign::SignatureStrategy;
pub use stream::{AeadStreamStrategy, StreamCipherStrategy};

use crate::algorithm::Algorithm;
use crate::container::SecretContainer;
use crate::contracts::IvSource;
use crate::error::{CryptoError, Result};
use crate::native::{self, status};
use crate::params::SizeRole;
use zeroize::Zeroizing;

/// Validate a container length against the parameter catalog.
pub(crate) fn require_len(algorithm: Algorithm, role: SizeRole, actual: usize) -> Result<()> {
    let expected = algorithm.parameter_sizes().get(role).unwrap_or(0);
    if actual != expected {
        return Err(CryptoError::SizeMismatch { algorithm, role, expected, actual });
    }
    Ok(())
}

/// Translate a native status into the library error space. Non-negative
/// returns pass through (they carry produced lengths).
pub(crate) fn map_status(algorithm: Algorithm, symbol: &str, rc: i32) -> Result<i32> {
    if rc >= 0 {
        return Ok(rc);
    }
    Err(match rc {
        status::AUTH => CryptoError::AuthenticationFailed { algorithm },
        status::PANIC => CryptoError::NativePanic { symbol: symbol.to_string() },
        _ => CryptoError::CryptoOperationFailed { algorithm, status: rc },
    })
}

/// IV staged on a cipher strategy, consumed by the next operation.
#[derive(Clone, Default)]
pub(crate) struct StagedIv(Option<Zeroizing<Vec<u8>>>);

impl StagedIv {
    /// Ingest an IV source, validating its length against the mode.
    pub(crate) fn stage(&mut self, source: IvSource, expected_len: usize) -> Result<()> {
        let bytes = match source {
            // Ownership taken: the buffer is wiped when the staged IV is
            // consumed or replaced.
            IvSource::Bytes(bytes) => Zeroizing::new(bytes),
            IvSource::Generate(len) => {
                if len != expected_len {
                    return Err(CryptoError::InvalidIv(format!(
                        "requested {} random bytes, mode takes {}",
                        len, expected_len
                    )));
                }
                Self::generate(len)?
            }
            IvSource::Container(container) => {
                Zeroizing::new(container.segment_view()?.to_vec())
            }
        };
        if bytes.len() != expected_len {
            return Err(CryptoError::InvalidIv(format!(
                "got {} bytes, mode takes {}",
                bytes.len(),
                expected_len
            )));
        }
        self.0 = Some(bytes);
        Ok(())
    }

    /// Fresh IV from the native CSPRNG.
    pub(crate) fn generate(len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(vec![0u8; len]);
        unsafe { native::fill_random(buf.as_mut_ptr(), len)? };
        Ok(buf)
    }

    pub(crate) fn take(&mut self) -> Option<Zeroizing<Vec<u8>>> {
        self.0.take()
    }
}

/// Copy a byte range out of one container into a fresh exact-length one.
/// Used where the native call produces fewer bytes than the scratch region
/// it wrote into (padded decryption).
pub(crate) fn shrink_to(
    scratch: &SecretContainer,
    produced: usize,
) -> Result<std::sync::Arc<SecretContainer>> {
    let view = scratch.segment_view()?;
    SecretContainer::new_from(&view[..produced])
}
