//! Stream cipher strategies: raw ChaCha20 and the ChaCha20-Poly1305 AEAD.

use std::sync::Arc;

use crate::algorithm::Algorithm;
use crate::container::SecretContainer;
use crate::contracts::{AeadCipher, Cipher, IvSource, StreamCipher};
use crate::error::{CryptoError, Result};
use crate::native::NativeLibrary;
use crate::params::SizeRole;

use super::{map_status, require_len, StagedIv};

const TAG: usize = 16;

// ---------------------------------------------------------------------------
// Raw ChaCha20
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct StreamCipherStrategy {
    algorithm: Algorithm,
    library: &'static NativeLibrary,
    iv: StagedIv,
}

impl StreamCipherStrategy {
    pub(crate) fn new(algorithm: Algorithm, library: &'static NativeLibrary) -> Self {
        Self { algorithm, library, iv: StagedIv::default() }
    }

    fn nonce_len(&self) -> usize {
        self.algorithm.nonce_len()
    }

    fn apply(
        &mut self,
        op: &str,
        key: &SecretContainer,
        input: &SecretContainer,
        chain_iv: bool,
        infer_iv: bool,
    ) -> Result<Arc<SecretContainer>> {
        require_len(self.algorithm, SizeRole::EncryptionKey, key.byte_length())?;
        let nonce_len = self.nonce_len();
        let in_len = input.byte_length();

        let staged = if infer_iv {
            if in_len <= nonce_len {
                return Err(CryptoError::InvalidIv(format!(
                    "ciphertext of {} bytes cannot carry a {}-byte chained nonce",
                    in_len, nonce_len
                )));
            }
            None
        } else {
            match self.iv.take() {
                Some(nonce) => Some(nonce),
                None if chain_iv || op == "encrypt" => Some(StagedIv::generate(nonce_len)?),
                None => {
                    return Err(CryptoError::InvalidIv(
                        "no nonce staged and inference disabled".into(),
                    ))
                }
            }
        };

        let body_off = if staged.is_none() { nonce_len } else { 0 };
        let body_len = in_len - body_off;
        let prefix = if chain_iv { nonce_len } else { 0 };

        let out = SecretContainer::new_empty(prefix + body_len)?;
        let produced = {
            let key_view = key.segment_view()?;
            let in_view = input.segment_view()?;
            let mut out_view = out.segment_view()?;
            if let (true, Some(nonce)) = (chain_iv, staged.as_deref()) {
                out_view[..nonce_len].copy_from_slice(nonce);
            }
            let nonce_ptr = match (&staged, body_off) {
                (Some(nonce), _) => nonce.as_ptr(),
                (None, _) => in_view.as_ptr(),
            };
            let body_ptr = unsafe { in_view.as_ptr().add(body_off) };

            let symbol = format!("{}_{}", self.algorithm.symbol_prefix(), op);
            let f = self.library.get(&symbol)?.stream()?;
            let rc = unsafe {
                f(
                    out_view.as_mut_ptr().add(prefix),
                    body_ptr,
                    body_len as i64,
                    key_view.as_ptr(),
                    nonce_ptr,
                )
            };
            map_status(self.algorithm, &symbol, rc)?
        };

        if produced as usize != body_len {
            return Err(CryptoError::CryptoOperationFailed {
                algorithm: self.algorithm,
                status: produced,
            });
        }
        Ok(out)
    }

    fn stream_apply(
        &mut self,
        op: &str,
        key: &SecretContainer,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        require_len(self.algorithm, SizeRole::EncryptionKey, key.byte_length())?;
        if output.len() < input.len() {
            return Err(CryptoError::SizeMismatch {
                algorithm: self.algorithm,
                role: SizeRole::Ciphertext,
                expected: input.len(),
                actual: output.len(),
            });
        }
        let nonce = self
            .iv
            .take()
            .ok_or_else(|| CryptoError::InvalidIv("stream operation requires a staged nonce".into()))?;

        let key_view = key.segment_view()?;
        let symbol = format!("{}_{}", self.algorithm.symbol_prefix(), op);
        let f = self.library.get(&symbol)?.stream()?;
        let rc = unsafe {
            f(
                output.as_mut_ptr(),
                input.as_ptr(),
                input.len() as i64,
                key_view.as_ptr(),
                nonce.as_ptr(),
            )
        };
        Ok(map_status(self.algorithm, &symbol, rc)? as usize)
    }
}

impl Cipher for StreamCipherStrategy {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn iv(&mut self, source: IvSource) -> Result<()> {
        self.iv.stage(source, self.nonce_len())
    }

    fn encrypt(
        &mut self,
        key: &SecretContainer,
        plaintext: &SecretContainer,
        chain_iv: bool,
    ) -> Result<Arc<SecretContainer>> {
        self.apply("encrypt", key, plaintext, chain_iv, false)
    }

    fn decrypt(
        &mut self,
        key: &SecretContainer,
        ciphertext: &SecretContainer,
        infer_iv: bool,
    ) -> Result<Arc<SecretContainer>> {
        self.apply("decrypt", key, ciphertext, false, infer_iv)
    }
}

impl StreamCipher for StreamCipherStrategy {
    fn stream_encrypt(
        &mut self,
        key: &SecretContainer,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        self.stream_apply("encrypt", key, input, output)
    }

    fn stream_decrypt(
        &mut self,
        key: &SecretContainer,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize> {
        self.stream_apply("decrypt", key, input, output)
    }
}

// ---------------------------------------------------------------------------
// ChaCha20-Poly1305
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AeadStreamStrategy {
    algorithm: Algorithm,
    library: &'static NativeLibrary,
    iv: StagedIv,
    aad: Vec<u8>,
}

impl AeadStreamStrategy {
    pub(crate) fn new(algorithm: Algorithm, library: &'static NativeLibrary) -> Self {
        Self { algorithm, library, iv: StagedIv::default(), aad: Vec::new() }
    }

    fn nonce_len(&self) -> usize {
        self.algorithm.nonce_len()
    }
}

impl Cipher for AeadStreamStrategy {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn iv(&mut self, source: IvSource) -> Result<()> {
        self.iv.stage(source, self.nonce_len())
    }

    fn encrypt(
        &mut self,
        key: &SecretContainer,
        plaintext: &SecretContainer,
        chain_iv: bool,
    ) -> Result<Arc<SecretContainer>> {
        require_len(self.algorithm, SizeRole::EncryptionKey, key.byte_length())?;
        let nonce_len = self.nonce_len();
        let nonce = match self.iv.take() {
            Some(nonce) => nonce,
            None => StagedIv::generate(nonce_len)?,
        };

        let plain_len = plaintext.byte_length();
        let body_len = plain_len + TAG;
        let prefix = if chain_iv { nonce_len } else { 0 };

        let out = SecretContainer::new_empty(prefix + body_len)?;
        let produced = {
            let key_view = key.segment_view()?;
            let plain_view = plaintext.segment_view()?;
            let mut out_view = out.segment_view()?;
            if chain_iv {
                out_view[..nonce_len].copy_from_slice(&nonce);
            }

            let symbol = format!("{}_encrypt", self.algorithm.symbol_prefix());
            let f = self.library.get(&symbol)?.aead()?;
            let rc = unsafe {
                f(
                    out_view.as_mut_ptr().add(prefix),
                    plain_view.as_ptr(),
                    plain_len as i64,
                    key_view.as_ptr(),
                    nonce.as_ptr(),
                    self.aad.as_ptr(),
                    self.aad.len() as i64,
                )
            };
            map_status(self.algorithm, &symbol, rc)?
        };

        if produced as usize != body_len {
            return Err(CryptoError::CryptoOperationFailed {
                algorithm: self.algorithm,
                status: produced,
            });
        }
        Ok(out)
    }

    fn decrypt(
        &mut self,
        key: &SecretContainer,
        ciphertext: &SecretContainer,
        infer_iv: bool,
    ) -> Result<Arc<SecretContainer>> {
        require_len(self.algorithm, SizeRole::DecryptionKey, key.byte_length())?;
        let nonce_len = self.nonce_len();
        let ct_len = ciphertext.byte_length();

        let staged = if infer_iv {
            if ct_len <= nonce_len + TAG {
                return Err(CryptoError::AuthenticationFailed { algorithm: self.algorithm });
            }
            None
        } else {
            Some(self.iv.take().ok_or_else(|| {
                CryptoError::InvalidIv("no nonce staged and inference disabled".into())
            })?)
        };

        let body_off = if staged.is_none() { nonce_len } else { 0 };
        let body_len = ct_len - body_off;
        if body_len < TAG {
            return Err(CryptoError::AuthenticationFailed { algorithm: self.algorithm });
        }

        let out = SecretContainer::new_empty(body_len - TAG)?;
        let produced = {
            let key_view = key.segment_view()?;
            let ct_view = ciphertext.segment_view()?;
            let mut out_view = out.segment_view()?;
            let nonce_ptr = match &staged {
                Some(nonce) => nonce.as_ptr(),
                None => ct_view.as_ptr(),
            };
            let body_ptr = unsafe { ct_view.as_ptr().add(body_off) };

            let symbol = format!("{}_decrypt", self.algorithm.symbol_prefix());
            let f = self.library.get(&symbol)?.aead()?;
            let rc = unsafe {
                f(
                    out_view.as_mut_ptr(),
                    body_ptr,
                    body_len as i64,
                    key_view.as_ptr(),
                    nonce_ptr,
                    self.aad.as_ptr(),
                    self.aad.len() as i64,
                )
            };
            map_status(self.algorithm, &symbol, rc)?
        };

        if produced as usize != body_len - TAG {
            return Err(CryptoError::CryptoOperationFailed {
                algorithm: self.algorithm,
                status: produced,
            });
        }
        Ok(out)
    }
}

impl AeadCipher for AeadStreamStrategy {
    fn update_aad(&mut self, aad: &[u8]) {
        self.aad.extend_from_slice(aad);
    }
}
