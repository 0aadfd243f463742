//! Block cipher strategy: AES and ARIA across every supported mode.

use std::sync::Arc;

use crate::algorithm::{self, Algorithm, DigestKind, Mode, Padding};
use crate::container::SecretContainer;
use crate::contracts::{AeadCipher, BlockCipher, Cipher, IvSource};
use crate::error::{CryptoError, Result};
use crate::native::{abi, NativeLibrary};
use crate::params::SizeRole;

use super::{map_status, require_len, shrink_to, StagedIv};

const BLOCK: usize = 16;
const TAG: usize = 16;

#[derive(Clone)]
pub struct BlockCipherStrategy {
    algorithm: Algorithm,
    library: &'static NativeLibrary,
    mode: Mode,
    padding: Padding,
    digest: DigestKind,
    iv: StagedIv,
    aad: Vec<u8>,
}

impl BlockCipherStrategy {
    pub(crate) fn new(algorithm: Algorithm, library: &'static NativeLibrary) -> Self {
        Self {
            algorithm,
            library,
            mode: Mode::Cbc,
            padding: Padding::Pkcs7,
            digest: DigestKind::default(),
            iv: StagedIv::default(),
            aad: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Asymmetric padding schemes are rejected here; they never apply to a
    /// block cipher.
    pub fn with_padding(mut self, padding: Padding) -> Result<Self> {
        if padding.is_asymmetric() {
            return Err(CryptoError::UnsupportedCapability {
                algorithm: self.algorithm,
                requested: "asymmetric padding",
            });
        }
        self.padding = padding;
        Ok(self)
    }

    pub fn with_digest(mut self, digest: DigestKind) -> Self {
        self.digest = digest;
        self
    }

    /// Ciphertext body length the encrypt path will produce (without a
    /// chained IV prefix).
    fn encrypted_body_len(&self, plain_len: usize) -> usize {
        match self.mode {
            Mode::Ecb | Mode::Cbc => {
                if self.padding.expands() {
                    (plain_len / BLOCK + 1) * BLOCK
                } else {
                    plain_len
                }
            }
            Mode::Cfb | Mode::Ofb | Mode::Ctr => plain_len,
            Mode::Gcm | Mode::Ccm => plain_len + TAG,
        }
    }

    fn aead_symbol(&self, op: &str) -> String {
        let mode = match self.mode {
            Mode::Gcm => "gcm",
            _ => "ccm",
        };
        format!("{}_{}_{}", self.algorithm.symbol_prefix(), mode, op)
    }

    fn packed_mode(&self) -> Result<i32> {
        let mode = self.mode.abi_id().ok_or(CryptoError::UnsupportedCapability {
            algorithm: self.algorithm,
            requested: "AEAD mode through the block path",
        })?;
        let padding = self.padding.abi_id().ok_or(CryptoError::UnsupportedCapability {
            algorithm: self.algorithm,
            requested: "asymmetric padding",
        })?;
        Ok(abi::pack_mode(mode, padding))
    }

    /// Resolve the IV for an operation: the staged one if present, a fresh
    /// one from the native CSPRNG when encrypting without one.
    fn resolve_iv(&mut self, generate_if_missing: bool) -> Result<Option<zeroize::Zeroizing<Vec<u8>>>> {
        let iv_len = self.mode.iv_len();
        if iv_len == 0 {
            return Ok(None);
        }
        match self.iv.take() {
            Some(iv) if iv.len() == iv_len => Ok(Some(iv)),
            Some(iv) => Err(CryptoError::InvalidIv(format!(
                "staged iv has {} bytes, {} takes {}",
                iv.len(),
                self.mode,
                iv_len
            ))),
            None if generate_if_missing => Ok(Some(StagedIv::generate(iv_len)?)),
            None => Err(CryptoError::InvalidIv(format!(
                "no iv staged for {} and inference disabled",
                self.mode
            ))),
        }
    }
}

impl Cipher for BlockCipherStrategy {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn iv(&mut self, source: IvSource) -> Result<()> {
        self.iv.stage(source, self.mode.iv_len())
    }

    fn encrypt(
        &mut self,
        key: &SecretContainer,
        plaintext: &SecretContainer,
        chain_iv: bool,
    ) -> Result<Arc<SecretContainer>> {
        if self.mode == Mode::Ecb {
            algorithm::warn_ecb_once(self.algorithm);
        }
        require_len(self.algorithm, SizeRole::EncryptionKey, key.byte_length())?;

        let iv = self.resolve_iv(true)?;
        let iv_len = self.mode.iv_len();
        let plain_len = plaintext.byte_length();
        let body_len = self.encrypted_body_len(plain_len);
        let prefix = if chain_iv { iv_len } else { 0 };

        let out = SecretContainer::new_empty(prefix + body_len)?;
        let produced = {
            let key_view = key.segment_view()?;
            let plain_view = plaintext.segment_view()?;
            let mut out_view = out.segment_view()?;
            if let (true, Some(iv)) = (chain_iv, iv.as_deref()) {
                out_view[..iv_len].copy_from_slice(iv);
            }
            let iv_ptr = iv.as_deref().map_or(std::ptr::null(), |iv| iv.as_ptr());
            let body_ptr = unsafe { out_view.as_mut_ptr().add(prefix) };

            if self.mode.is_aead() {
                let symbol = self.aead_symbol("encrypt");
                let f = self.library.get(&symbol)?.aead()?;
                let rc = unsafe {
                    f(
                        body_ptr,
                        plain_view.as_ptr(),
                        plain_len as i64,
                        key_view.as_ptr(),
                        iv_ptr,
                        self.aad.as_ptr(),
                        self.aad.len() as i64,
                    )
                };
                map_status(self.algorithm, &symbol, rc)?
            } else {
                let symbol = format!("{}_encrypt", self.algorithm.symbol_prefix());
                let f = self.library.get(&symbol)?.block()?;
                let packed = self.packed_mode()?;
                let rc = unsafe {
                    f(
                        body_ptr,
                        plain_view.as_ptr(),
                        plain_len as i64,
                        key_view.as_ptr(),
                        iv_ptr,
                        packed,
                    )
                };
                map_status(self.algorithm, &symbol, rc)?
            }
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
        if self.mode == Mode::Ecb {
            algorithm::warn_ecb_once(self.algorithm);
        }
        require_len(self.algorithm, SizeRole::DecryptionKey, key.byte_length())?;

        let iv_len = self.mode.iv_len();
        let ct_len = ciphertext.byte_length();

        // An explicitly staged IV; `None` means the prefix of the
        // ciphertext carries it (inference).
        let staged = if iv_len == 0 {
            None
        } else if infer_iv {
            if ct_len <= iv_len {
                return Err(CryptoError::InvalidIv(format!(
                    "ciphertext of {} bytes cannot carry a {}-byte chained iv",
                    ct_len, iv_len
                )));
            }
            None
        } else {
            Some(self.resolve_iv(false)?.expect("iv_len checked nonzero"))
        };

        let body_off = if iv_len > 0 && staged.is_none() { iv_len } else { 0 };
        let body_len = ct_len - body_off;

        let padded = matches!(self.mode, Mode::Ecb | Mode::Cbc) && self.padding.expands();
        let out_len = match self.mode {
            Mode::Gcm | Mode::Ccm => {
                if body_len < TAG {
                    return Err(CryptoError::AuthenticationFailed { algorithm: self.algorithm });
                }
                body_len - TAG
            }
            _ => body_len,
        };

        let out = SecretContainer::new_empty(out_len)?;
        let produced = {
            let key_view = key.segment_view()?;
            let ct_view = ciphertext.segment_view()?;
            let mut out_view = out.segment_view()?;

            let iv_ptr = match (&staged, body_off) {
                (Some(iv), _) => iv.as_ptr(),
                (None, 0) => std::ptr::null(),
                (None, _) => ct_view.as_ptr(),
            };
            let body_ptr = unsafe { ct_view.as_ptr().add(body_off) };

            if self.mode.is_aead() {
                let symbol = self.aead_symbol("decrypt");
                let f = self.library.get(&symbol)?.aead()?;
                let rc = unsafe {
                    f(
                        out_view.as_mut_ptr(),
                        body_ptr,
                        body_len as i64,
                        key_view.as_ptr(),
                        iv_ptr,
                        self.aad.as_ptr(),
                        self.aad.len() as i64,
                    )
                };
                map_status(self.algorithm, &symbol, rc)?
            } else {
                let symbol = format!("{}_decrypt", self.algorithm.symbol_prefix());
                let f = self.library.get(&symbol)?.block()?;
                let packed = self.packed_mode()?;
                let rc = unsafe {
                    f(
                        out_view.as_mut_ptr(),
                        body_ptr,
                        body_len as i64,
                        key_view.as_ptr(),
                        iv_ptr,
                        packed,
                    )
                };
                map_status(self.algorithm, &symbol, rc)?
            }
        } as usize;

        if padded && produced != out_len {
            // Padding stripped; re-home the plaintext in an exact-length
            // region and wipe the scratch.
            let exact = shrink_to(&out, produced)?;
            out.close();
            return Ok(exact);
        }
        if produced != out_len {
            return Err(CryptoError::CryptoOperationFailed {
                algorithm: self.algorithm,
                status: produced as i32,
            });
        }
        Ok(out)
    }
}

impl BlockCipher for BlockCipherStrategy {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn padding(&self) -> Padding {
        self.padding
    }

    fn digest(&self) -> DigestKind {
        self.digest
    }
}

impl AeadCipher for BlockCipherStrategy {
    fn update_aad(&mut self, aad: &[u8]) {
        self.aad.extend_from_slice(aad);
    }
}
