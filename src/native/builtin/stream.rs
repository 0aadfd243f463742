//! Stream cipher entry points: ChaCha20 and ChaCha20-Poly1305.
//!
//! Raw ChaCha20 uses the original 8-byte nonce; the AEAD uses the IETF
//! 12-byte nonce. Output sizing: raw keystream application is
//! length-preserving; the AEAD adds/strips the 16-byte tag.

use chacha20::ChaCha20Legacy;
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::ChaCha20Poly1305;
use cipher::{KeyInit, KeyIvInit, StreamCipher};

use super::{fixed_in, guarded, slice_in, slice_out};
use crate::native::status;

const KEY_LEN: usize = 32;
const RAW_NONCE_LEN: usize = 8;
const AEAD_NONCE_LEN: usize = 12;
const TAG: usize = 16;

unsafe fn chacha20_apply(
    out_ptr: *mut u8,
    in_ptr: *const u8,
    in_len: i64,
    key_ptr: *const u8,
    nonce_ptr: *const u8,
) -> i32 {
    let body = || -> Result<i32, i32> {
        let msg = slice_in(in_ptr, in_len)?;
        let key = fixed_in(key_ptr, KEY_LEN)?;
        let nonce = fixed_in(nonce_ptr, RAW_NONCE_LEN)?;
        let out = slice_out(out_ptr, msg.len())?;

        out.copy_from_slice(msg);
        let mut cipher =
            ChaCha20Legacy::new_from_slices(key, nonce).map_err(|_| status::BAD_LENGTH)?;
        cipher.apply_keystream(out);
        Ok(msg.len() as i32)
    };
    match body() {
        Ok(rc) => rc,
        Err(rc) => rc,
    }
}

pub(crate) unsafe extern "C" fn chacha20_encrypt(
    out: *mut u8,
    input: *const u8,
    in_len: i64,
    key: *const u8,
    nonce: *const u8,
) -> i32 {
    guarded(|| unsafe { chacha20_apply(out, input, in_len, key, nonce) })
}

pub(crate) unsafe extern "C" fn chacha20_decrypt(
    out: *mut u8,
    input: *const u8,
    in_len: i64,
    key: *const u8,
    nonce: *const u8,
) -> i32 {
    guarded(|| unsafe { chacha20_apply(out, input, in_len, key, nonce) })
}

pub(crate) unsafe extern "C" fn chacha20_poly1305_encrypt(
    out: *mut u8,
    input: *const u8,
    in_len: i64,
    key: *const u8,
    nonce: *const u8,
    aad: *const u8,
    aad_len: i64,
) -> i32 {
    guarded(|| unsafe {
        let body = || -> Result<i32, i32> {
            let msg = slice_in(input, in_len)?;
            let key = fixed_in(key, KEY_LEN)?;
            let nonce = fixed_in(nonce, AEAD_NONCE_LEN)?;
            let aad = slice_in(aad, aad_len)?;
            let out = slice_out(out, msg.len() + TAG)?;

            let cipher = ChaCha20Poly1305::new_from_slice(key).map_err(|_| status::BAD_LENGTH)?;
            let ct = cipher
                .encrypt(chacha20poly1305::Nonce::from_slice(nonce), Payload { msg, aad })
                .map_err(|_| status::CIPHER)?;
            out[..ct.len()].copy_from_slice(&ct);
            Ok(ct.len() as i32)
        };
        match body() {
            Ok(rc) => rc,
            Err(rc) => rc,
        }
    })
}

pub(crate) unsafe extern "C" fn chacha20_poly1305_decrypt(
    out: *mut u8,
    input: *const u8,
    in_len: i64,
    key: *const u8,
    nonce: *const u8,
    aad: *const u8,
    aad_len: i64,
) -> i32 {
    guarded(|| unsafe {
        let body = || -> Result<i32, i32> {
            let ct = slice_in(input, in_len)?;
            if ct.len() < TAG {
                return Err(status::AUTH);
            }
            let key = fixed_in(key, KEY_LEN)?;
            let nonce = fixed_in(nonce, AEAD_NONCE_LEN)?;
            let aad = slice_in(aad, aad_len)?;
            let out = slice_out(out, ct.len() - TAG)?;

            let cipher = ChaCha20Poly1305::new_from_slice(key).map_err(|_| status::BAD_LENGTH)?;
            let pt = cipher
                .decrypt(chacha20poly1305::Nonce::from_slice(nonce), Payload { msg: ct, aad })
                .map_err(|_| status::AUTH)?;
            out[..pt.len()].copy_from_slice(&pt);
            Ok(pt.len() as i32)
        };
        match body() {
            Ok(rc) => rc,
            Err(rc) => rc,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chacha20_roundtrips() {
        let key = [0x42u8; 32];
        let nonce = [0x01u8; 8];
        let msg = b"stream cipher state";
        let mut ct = [0u8; 19];
        let n = unsafe {
            chacha20_encrypt(ct.as_mut_ptr(), msg.as_ptr(), 19, key.as_ptr(), nonce.as_ptr())
        };
        assert_eq!(n, 19);
        assert_ne!(&ct[..], &msg[..]);
        let mut pt = [0u8; 19];
        let m = unsafe {
            chacha20_decrypt(pt.as_mut_ptr(), ct.as_ptr(), 19, key.as_ptr(), nonce.as_ptr())
        };
        assert_eq!(m, 19);
        assert_eq!(&pt[..], &msg[..]);
    }

    #[test]
    fn poly1305_tag_binds_aad() {
        let key = [0x01u8; 32];
        let nonce = [0u8; 12];
        let msg = b"bound";
        let mut ct = [0u8; 5 + 16];
        let n = unsafe {
            chacha20_poly1305_encrypt(
                ct.as_mut_ptr(),
                msg.as_ptr(),
                5,
                key.as_ptr(),
                nonce.as_ptr(),
                b"aad".as_ptr(),
                3,
            )
        };
        assert_eq!(n, 21);
        let mut pt = [0u8; 5];
        let rc = unsafe {
            chacha20_poly1305_decrypt(
                pt.as_mut_ptr(),
                ct.as_ptr(),
                21,
                key.as_ptr(),
                nonce.as_ptr(),
                b"other".as_ptr(),
                5,
            )
        };
        assert_eq!(rc, status::AUTH);
    }
}
