//! Block cipher entry points: AES and ARIA.
//!
//! Block-shape symbols (`aes_128_encrypt`, …) carry the packed mode/padding
//! argument and a 16-byte IV (ignored for ECB). AEAD symbols
//! (`aes_128_gcm_encrypt`, …) follow the AEAD shape with a 12-byte nonce.
//!
//! Output sizing contract: encryption output must hold the input rounded up
//! one whole block when padding is in effect (plus the 16-byte tag for
//! AEAD); decryption output must hold the whole input. The returned status
//! is the produced length, or negative on failure.

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::{Aead, Nonce, Payload};
use aes_gcm::AesGcm;
use aria::{Aria128, Aria192, Aria256};
use ccm::Ccm;
use cipher::block_padding::{Iso10126, Iso7816, NoPadding, Padding, Pkcs7, ZeroPadding};
use cipher::{
    AsyncStreamCipher, BlockCipher, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut,
    BlockSizeUser, KeyInit, KeyIvInit, StreamCipher,
};

use super::{fixed_in, guarded, slice_in, slice_out};
use crate::native::{abi, status};

const BLOCK: usize = 16;
const TAG: usize = 16;

// ---------------------------------------------------------------------------
// Padded one-shot helpers
// ---------------------------------------------------------------------------

fn encrypt_padded<M, P>(m: M, msg: &[u8], out: &mut [u8]) -> i32
where
    M: BlockEncryptMut,
    P: Padding<M::BlockSize>,
{
    match m.encrypt_padded_b2b_mut::<P>(msg, out) {
        Ok(ct) => ct.len() as i32,
        Err(_) => status::CIPHER,
    }
}

fn decrypt_padded<M, P>(m: M, ct: &[u8], out: &mut [u8]) -> i32
where
    M: BlockDecryptMut,
    P: Padding<M::BlockSize>,
{
    match m.decrypt_padded_b2b_mut::<P>(ct, out) {
        Ok(pt) => pt.len() as i32,
        Err(_) => status::CIPHER,
    }
}

fn dispatch_encrypt<M: BlockEncryptMut>(m: M, pad: i32, msg: &[u8], out: &mut [u8]) -> i32 {
    match pad {
        abi::PAD_NONE => encrypt_padded::<M, NoPadding>(m, msg, out),
        abi::PAD_PKCS7 => encrypt_padded::<M, Pkcs7>(m, msg, out),
        abi::PAD_ISO7816 => encrypt_padded::<M, Iso7816>(m, msg, out),
        abi::PAD_ISO10126 => encrypt_padded::<M, Iso10126>(m, msg, out),
        abi::PAD_ZERO => encrypt_padded::<M, ZeroPadding>(m, msg, out),
        _ => status::CIPHER,
    }
}

fn dispatch_decrypt<M: BlockDecryptMut>(m: M, pad: i32, ct: &[u8], out: &mut [u8]) -> i32 {
    match pad {
        abi::PAD_NONE => decrypt_padded::<M, NoPadding>(m, ct, out),
        abi::PAD_PKCS7 => decrypt_padded::<M, Pkcs7>(m, ct, out),
        abi::PAD_ISO7816 => decrypt_padded::<M, Iso7816>(m, ct, out),
        abi::PAD_ISO10126 => decrypt_padded::<M, Iso10126>(m, ct, out),
        abi::PAD_ZERO => decrypt_padded::<M, ZeroPadding>(m, ct, out),
        _ => status::CIPHER,
    }
}

/// Output length the encrypt path will produce.
fn encrypted_len(mode: i32, pad: i32, msg_len: usize) -> Result<usize, i32> {
    match mode {
        abi::MODE_ECB | abi::MODE_CBC => {
            if pad == abi::PAD_NONE {
                if msg_len % BLOCK != 0 {
                    return Err(status::CIPHER);
                }
                Ok(msg_len)
            } else {
                Ok((msg_len / BLOCK + 1) * BLOCK)
            }
        }
        abi::MODE_CFB | abi::MODE_OFB | abi::MODE_CTR => Ok(msg_len),
        _ => Err(status::CIPHER),
    }
}

// ---------------------------------------------------------------------------
// Generic block implementations
// ---------------------------------------------------------------------------

unsafe fn block_encrypt_impl<C>(
    out_ptr: *mut u8,
    in_ptr: *const u8,
    in_len: i64,
    key_ptr: *const u8,
    iv_ptr: *const u8,
    packed: i32,
    key_len: usize,
) -> i32
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt + KeyInit + BlockSizeUser<BlockSize = U16>,
{
    let body = || -> Result<i32, i32> {
        let msg = slice_in(in_ptr, in_len)?;
        let key = fixed_in(key_ptr, key_len)?;
        let (mode, pad) = abi::unpack_mode(packed);
        let out_len = encrypted_len(mode, pad, msg.len())?;
        let out = slice_out(out_ptr, out_len)?;

        let rc = match mode {
            abi::MODE_ECB => {
                let m = ecb::Encryptor::<C>::new_from_slice(key)
                    .map_err(|_| status::BAD_LENGTH)?;
                dispatch_encrypt(m, pad, msg, out)
            }
            abi::MODE_CBC => {
                let iv = fixed_in(iv_ptr, BLOCK)?;
                let m = cbc::Encryptor::<C>::new_from_slices(key, iv)
                    .map_err(|_| status::BAD_LENGTH)?;
                dispatch_encrypt(m, pad, msg, out)
            }
            abi::MODE_CFB => {
                let iv = fixed_in(iv_ptr, BLOCK)?;
                out[..msg.len()].copy_from_slice(msg);
                let m = cfb_mode::Encryptor::<C>::new_from_slices(key, iv)
                    .map_err(|_| status::BAD_LENGTH)?;
                m.encrypt(&mut out[..msg.len()]);
                msg.len() as i32
            }
            abi::MODE_OFB => {
                let iv = fixed_in(iv_ptr, BLOCK)?;
                out[..msg.len()].copy_from_slice(msg);
                let mut m = ofb::Ofb::<C>::new_from_slices(key, iv)
                    .map_err(|_| status::BAD_LENGTH)?;
                m.apply_keystream(&mut out[..msg.len()]);
                msg.len() as i32
            }
            abi::MODE_CTR => {
                let iv = fixed_in(iv_ptr, BLOCK)?;
                out[..msg.len()].copy_from_slice(msg);
                let mut m = ctr::Ctr128BE::<C>::new_from_slices(key, iv)
                    .map_err(|_| status::BAD_LENGTH)?;
                m.apply_keystream(&mut out[..msg.len()]);
                msg.len() as i32
            }
            _ => status::CIPHER,
        };
        Ok(rc)
    };
    match body() {
        Ok(rc) => rc,
        Err(rc) => rc,
    }
}

unsafe fn block_decrypt_impl<C>(
    out_ptr: *mut u8,
    in_ptr: *const u8,
    in_len: i64,
    key_ptr: *const u8,
    iv_ptr: *const u8,
    packed: i32,
    key_len: usize,
) -> i32
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt + KeyInit + BlockSizeUser<BlockSize = U16>,
{
    let body = || -> Result<i32, i32> {
        let ct = slice_in(in_ptr, in_len)?;
        let key = fixed_in(key_ptr, key_len)?;
        let (mode, pad) = abi::unpack_mode(packed);
        let out = slice_out(out_ptr, ct.len())?;

        let rc = match mode {
            abi::MODE_ECB => {
                if ct.len() % BLOCK != 0 {
                    return Err(status::BAD_LENGTH);
                }
                let m = ecb::Decryptor::<C>::new_from_slice(key)
                    .map_err(|_| status::BAD_LENGTH)?;
                dispatch_decrypt(m, pad, ct, out)
            }
            abi::MODE_CBC => {
                if ct.len() % BLOCK != 0 {
                    return Err(status::BAD_LENGTH);
                }
                let iv = fixed_in(iv_ptr, BLOCK)?;
                let m = cbc::Decryptor::<C>::new_from_slices(key, iv)
                    .map_err(|_| status::BAD_LENGTH)?;
                dispatch_decrypt(m, pad, ct, out)
            }
            abi::MODE_CFB => {
                let iv = fixed_in(iv_ptr, BLOCK)?;
                out[..ct.len()].copy_from_slice(ct);
                let m = cfb_mode::Decryptor::<C>::new_from_slices(key, iv)
                    .map_err(|_| status::BAD_LENGTH)?;
                m.decrypt(&mut out[..ct.len()]);
                ct.len() as i32
            }
            abi::MODE_OFB => {
                let iv = fixed_in(iv_ptr, BLOCK)?;
                out[..ct.len()].copy_from_slice(ct);
                let mut m = ofb::Ofb::<C>::new_from_slices(key, iv)
                    .map_err(|_| status::BAD_LENGTH)?;
                m.apply_keystream(&mut out[..ct.len()]);
                ct.len() as i32
            }
            abi::MODE_CTR => {
                let iv = fixed_in(iv_ptr, BLOCK)?;
                out[..ct.len()].copy_from_slice(ct);
                let mut m = ctr::Ctr128BE::<C>::new_from_slices(key, iv)
                    .map_err(|_| status::BAD_LENGTH)?;
                m.apply_keystream(&mut out[..ct.len()]);
                ct.len() as i32
            }
            _ => status::CIPHER,
        };
        Ok(rc)
    };
    match body() {
        Ok(rc) => rc,
        Err(rc) => rc,
    }
}

// ---------------------------------------------------------------------------
// Generic AEAD implementations
// ---------------------------------------------------------------------------

unsafe fn aead_encrypt_impl<A>(
    out_ptr: *mut u8,
    in_ptr: *const u8,
    in_len: i64,
    key_ptr: *const u8,
    nonce_ptr: *const u8,
    aad_ptr: *const u8,
    aad_len: i64,
    key_len: usize,
    nonce_len: usize,
) -> i32
where
    A: Aead + KeyInit,
{
    let body = || -> Result<i32, i32> {
        let msg = slice_in(in_ptr, in_len)?;
        let key = fixed_in(key_ptr, key_len)?;
        let nonce = fixed_in(nonce_ptr, nonce_len)?;
        let aad = slice_in(aad_ptr, aad_len)?;
        let out = slice_out(out_ptr, msg.len() + TAG)?;

        let cipher = A::new_from_slice(key).map_err(|_| status::BAD_LENGTH)?;
        let ct = cipher
            .encrypt(Nonce::<A>::from_slice(nonce), Payload { msg, aad })
            .map_err(|_| status::CIPHER)?;
        out[..ct.len()].copy_from_slice(&ct);
        Ok(ct.len() as i32)
    };
    match body() {
        Ok(rc) => rc,
        Err(rc) => rc,
    }
}

unsafe fn aead_decrypt_impl<A>(
    out_ptr: *mut u8,
    in_ptr: *const u8,
    in_len: i64,
    key_ptr: *const u8,
    nonce_ptr: *const u8,
    aad_ptr: *const u8,
    aad_len: i64,
    key_len: usize,
    nonce_len: usize,
) -> i32
where
    A: Aead + KeyInit,
{
    let body = || -> Result<i32, i32> {
        let ct = slice_in(in_ptr, in_len)?;
        if ct.len() < TAG {
            return Err(status::AUTH);
        }
        let key = fixed_in(key_ptr, key_len)?;
        let nonce = fixed_in(nonce_ptr, nonce_len)?;
        let aad = slice_in(aad_ptr, aad_len)?;
        let out = slice_out(out_ptr, ct.len() - TAG)?;

        let cipher = A::new_from_slice(key).map_err(|_| status::BAD_LENGTH)?;
        let pt = cipher
            .decrypt(Nonce::<A>::from_slice(nonce), Payload { msg: ct, aad })
            .map_err(|_| status::AUTH)?;
        out[..pt.len()].copy_from_slice(&pt);
        Ok(pt.len() as i32)
    };
    match body() {
        Ok(rc) => rc,
        Err(rc) => rc,
    }
}

// ---------------------------------------------------------------------------
// Exported symbols
// ---------------------------------------------------------------------------

macro_rules! block_symbols {
    ($enc:ident, $dec:ident, $cipher:ty, $key_len:expr) => {
        pub(crate) unsafe extern "C" fn $enc(
            out: *mut u8,
            input: *const u8,
            in_len: i64,
            key: *const u8,
            iv: *const u8,
            mode: i32,
        ) -> i32 {
            guarded(|| unsafe {
                block_encrypt_impl::<$cipher>(out, input, in_len, key, iv, mode, $key_len)
            })
        }

        pub(crate) unsafe extern "C" fn $dec(
            out: *mut u8,
            input: *const u8,
            in_len: i64,
            key: *const u8,
            iv: *const u8,
            mode: i32,
        ) -> i32 {
            guarded(|| unsafe {
                block_decrypt_impl::<$cipher>(out, input, in_len, key, iv, mode, $key_len)
            })
        }
    };
}

macro_rules! aead_symbols {
    ($enc:ident, $dec:ident, $aead:ty, $key_len:expr) => {
        pub(crate) unsafe extern "C" fn $enc(
            out: *mut u8,
            input: *const u8,
            in_len: i64,
            key: *const u8,
            nonce: *const u8,
            aad: *const u8,
            aad_len: i64,
        ) -> i32 {
            guarded(|| unsafe {
                aead_encrypt_impl::<$aead>(out, input, in_len, key, nonce, aad, aad_len, $key_len, 12)
            })
        }

        pub(crate) unsafe extern "C" fn $dec(
            out: *mut u8,
            input: *const u8,
            in_len: i64,
            key: *const u8,
            nonce: *const u8,
            aad: *const u8,
            aad_len: i64,
        ) -> i32 {
            guarded(|| unsafe {
                aead_decrypt_impl::<$aead>(out, input, in_len, key, nonce, aad, aad_len, $key_len, 12)
            })
        }
    };
}

block_symbols!(aes_128_encrypt, aes_128_decrypt, Aes128, 16);
block_symbols!(aes_192_encrypt, aes_192_decrypt, Aes192, 24);
block_symbols!(aes_256_encrypt, aes_256_decrypt, Aes256, 32);
block_symbols!(aria_128_encrypt, aria_128_decrypt, Aria128, 16);
block_symbols!(aria_192_encrypt, aria_192_decrypt, Aria192, 24);
block_symbols!(aria_256_encrypt, aria_256_decrypt, Aria256, 32);

aead_symbols!(aes_128_gcm_encrypt, aes_128_gcm_decrypt, AesGcm<Aes128, U12>, 16);
aead_symbols!(aes_192_gcm_encrypt, aes_192_gcm_decrypt, AesGcm<Aes192, U12>, 24);
aead_symbols!(aes_256_gcm_encrypt, aes_256_gcm_decrypt, AesGcm<Aes256, U12>, 32);
aead_symbols!(aria_128_gcm_encrypt, aria_128_gcm_decrypt, AesGcm<Aria128, U12>, 16);
aead_symbols!(aria_192_gcm_encrypt, aria_192_gcm_decrypt, AesGcm<Aria192, U12>, 24);
aead_symbols!(aria_256_gcm_encrypt, aria_256_gcm_decrypt, AesGcm<Aria256, U12>, 32);

aead_symbols!(aes_128_ccm_encrypt, aes_128_ccm_decrypt, Ccm<Aes128, U16, U12>, 16);
aead_symbols!(aes_192_ccm_encrypt, aes_192_ccm_decrypt, Ccm<Aes192, U16, U12>, 24);
aead_symbols!(aes_256_ccm_encrypt, aes_256_ccm_decrypt, Ccm<Aes256, U16, U12>, 32);
aead_symbols!(aria_128_ccm_encrypt, aria_128_ccm_decrypt, Ccm<Aria128, U16, U12>, 16);
aead_symbols!(aria_192_ccm_encrypt, aria_192_ccm_decrypt, Ccm<Aria192, U16, U12>, 24);
aead_symbols!(aria_256_ccm_encrypt, aria_256_ccm_decrypt, Ccm<Aria256, U16, U12>, 32);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::abi::pack_mode;

    #[test]
    fn cbc_pkcs7_roundtrip() {
        let key = [0x11u8; 32];
        let iv = [0x22u8; 16];
        let msg = b"three phase close protocol";
        let mut ct = [0u8; 32];
        let mode = pack_mode(abi::MODE_CBC, abi::PAD_PKCS7);
        let n = unsafe {
            aes_256_encrypt(
                ct.as_mut_ptr(),
                msg.as_ptr(),
                msg.len() as i64,
                key.as_ptr(),
                iv.as_ptr(),
                mode,
            )
        };
        assert_eq!(n, 32);
        let mut pt = [0u8; 32];
        let m = unsafe {
            aes_256_decrypt(
                pt.as_mut_ptr(),
                ct.as_ptr(),
                n as i64,
                key.as_ptr(),
                iv.as_ptr(),
                mode,
            )
        };
        assert_eq!(m as usize, msg.len());
        assert_eq!(&pt[..msg.len()], msg);
    }

    #[test]
    fn ctr_is_length_preserving() {
        let key = [7u8; 16];
        let iv = [9u8; 16];
        let msg = [0xA5u8; 13];
        let mut ct = [0u8; 13];
        let mode = pack_mode(abi::MODE_CTR, abi::PAD_NONE);
        let n = unsafe {
            aes_128_encrypt(ct.as_mut_ptr(), msg.as_ptr(), 13, key.as_ptr(), iv.as_ptr(), mode)
        };
        assert_eq!(n, 13);
        assert_ne!(ct, msg);
    }

    #[test]
    fn gcm_tamper_is_auth_failure() {
        let key = [0u8; 32];
        let nonce = [0u8; 12];
        let msg = b"Hello, AES!";
        let mut ct = [0u8; 11 + 16];
        let n = unsafe {
            aes_256_gcm_encrypt(
                ct.as_mut_ptr(),
                msg.as_ptr(),
                msg.len() as i64,
                key.as_ptr(),
                nonce.as_ptr(),
                b"hdr".as_ptr(),
                3,
            )
        };
        assert_eq!(n as usize, msg.len() + TAG);
        ct[5] ^= 0x01;
        let mut pt = [0u8; 11];
        let rc = unsafe {
            aes_256_gcm_decrypt(
                pt.as_mut_ptr(),
                ct.as_ptr(),
                n as i64,
                key.as_ptr(),
                nonce.as_ptr(),
                b"hdr".as_ptr(),
                3,
            )
        };
        assert_eq!(rc, status::AUTH);
    }

    #[test]
    fn null_pointer_is_reported() {
        let key = [0u8; 16];
        let iv = [0u8; 16];
        let mode = pack_mode(abi::MODE_CBC, abi::PAD_PKCS7);
        let rc = unsafe {
            aes_128_encrypt(
                std::ptr::null_mut(),
                b"x".as_ptr(),
                1,
                key.as_ptr(),
                iv.as_ptr(),
                mode,
            )
        };
        assert_eq!(rc, status::BAD_POINTER);
    }

    #[test]
    fn no_padding_rejects_partial_block() {
        let key = [0u8; 16];
        let iv = [0u8; 16];
        let mut ct = [0u8; 16];
        let mode = pack_mode(abi::MODE_CBC, abi::PAD_NONE);
        let rc = unsafe {
            aes_128_encrypt(ct.as_mut_ptr(), b"short".as_ptr(), 5, key.as_ptr(), iv.as_ptr(), mode)
        };
        assert_eq!(rc, status::CIPHER);
    }
}
