//! Built-in native core.
//!
//! The C-ABI surface compiled into this crate: `extern "C"` entry points
//! over vetted cryptographic crates. Every body runs under `catch_unwind`
//! so a panic becomes the `-6` status instead of unwinding across the call
//! boundary. Callers are trusted to size output regions per the ABI
//! contract documented on each shape; pointers are null-checked, nothing
//! more.

pub(crate) mod block;
pub(crate) mod ecdh;
pub(crate) mod kem;
pub(crate) mod sign;
pub(crate) mod stream;

use super::{status, NativeFn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// Wipe primitive + audit instrumentation
// ---------------------------------------------------------------------------

static WIPE_COUNT: AtomicU64 = AtomicU64::new(0);
static WIPE_LOG: Mutex<Vec<usize>> = Mutex::new(Vec::new());
const WIPE_LOG_CAP: usize = 64;

/// Zero `len` bytes at `ptr` with a volatile overwrite the optimizer cannot
/// elide. Each invocation is counted and its length recorded in a bounded
/// audit log so release ordering and double-wipe absence are observable.
pub unsafe extern "C" fn wipe(ptr: *mut u8, len: i64) {
    let _ = panic::catch_unwind(AssertUnwindSafe(|| {
        if ptr.is_null() || len < 0 {
            return;
        }
        std::slice::from_raw_parts_mut(ptr, len as usize).zeroize();
        WIPE_COUNT.fetch_add(1, Ordering::Relaxed);
        let mut log = WIPE_LOG.lock().unwrap_or_else(|e| e.into_inner());
        log.push(len as usize);
        if log.len() > WIPE_LOG_CAP {
            let excess = log.len() - WIPE_LOG_CAP;
            log.drain(..excess);
        }
    }));
}

/// Total number of wipe invocations in this process.
pub fn wipe_invocations() -> u64 {
    WIPE_COUNT.load(Ordering::Relaxed)
}

/// The lengths of the most recent wipes, oldest first.
pub fn recent_wipes() -> Vec<usize> {
    WIPE_LOG.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Fill `len` bytes at `ptr` from the OS CSPRNG.
pub unsafe extern "C" fn random_bytes(ptr: *mut u8, len: i64) -> i32 {
    guarded(|| {
        if ptr.is_null() {
            return status::BAD_POINTER;
        }
        if len < 0 {
            return status::BAD_LENGTH;
        }
        let out = unsafe { std::slice::from_raw_parts_mut(ptr, len as usize) };
        match getrandom::getrandom(out) {
            Ok(()) => status::OK,
            Err(_) => status::GENERIC,
        }
    })
}

// ---------------------------------------------------------------------------
// Shared plumbing for the entry points
// ---------------------------------------------------------------------------

/// Run a symbol body, converting panics into the panic status.
pub(crate) fn guarded(body: impl FnOnce() -> i32) -> i32 {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(rc) => rc,
        Err(_) => status::PANIC,
    }
}

/// Input region of `len` bytes. A zero length never dereferences `ptr`.
pub(crate) unsafe fn slice_in<'a>(ptr: *const u8, len: i64) -> Result<&'a [u8], i32> {
    if len < 0 {
        return Err(status::BAD_LENGTH);
    }
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(status::BAD_POINTER);
    }
    Ok(std::slice::from_raw_parts(ptr, len as usize))
}

/// Output region of `len` bytes.
pub(crate) unsafe fn slice_out<'a>(ptr: *mut u8, len: usize) -> Result<&'a mut [u8], i32> {
    if len == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        return Err(status::BAD_POINTER);
    }
    Ok(std::slice::from_raw_parts_mut(ptr, len))
}

/// Fixed-length input region whose size is implied by the symbol contract.
pub(crate) unsafe fn fixed_in<'a>(ptr: *const u8, len: usize) -> Result<&'a [u8], i32> {
    if ptr.is_null() {
        return Err(status::BAD_POINTER);
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

// ---------------------------------------------------------------------------
// Symbol table
// ---------------------------------------------------------------------------

/// Resolve a symbol of the built-in core by name.
pub(crate) fn lookup(symbol: &str) -> Option<NativeFn> {
    Some(match symbol {
        "wipe" => NativeFn::Wipe(wipe),
        "random_bytes" => NativeFn::Fill(random_bytes),

        "aes_128_encrypt" => NativeFn::Block(block::aes_128_encrypt),
        "aes_128_decrypt" => NativeFn::Block(block::aes_128_decrypt),
        "aes_192_encrypt" => NativeFn::Block(block::aes_192_encrypt),
        "aes_192_decrypt" => NativeFn::Block(block::aes_192_decrypt),
        "aes_256_encrypt" => NativeFn::Block(block::aes_256_encrypt),
        "aes_256_decrypt" => NativeFn::Block(block::aes_256_decrypt),
        "aria_128_encrypt" => NativeFn::Block(block::aria_128_encrypt),
        "aria_128_decrypt" => NativeFn::Block(block::aria_128_decrypt),
        "aria_192_encrypt" => NativeFn::Block(block::aria_192_encrypt),
        "aria_192_decrypt" => NativeFn::Block(block::aria_192_decrypt),
        "aria_256_encrypt" => NativeFn::Block(block::aria_256_encrypt),
        "aria_256_decrypt" => NativeFn::Block(block::aria_256_decrypt),

        "aes_128_gcm_encrypt" => NativeFn::Aead(block::aes_128_gcm_encrypt),
        "aes_128_gcm_decrypt" => NativeFn::Aead(block::aes_128_gcm_decrypt),
        "aes_192_gcm_encrypt" => NativeFn::Aead(block::aes_192_gcm_encrypt),
        "aes_192_gcm_decrypt" => NativeFn::Aead(block::aes_192_gcm_decrypt),
        "aes_256_gcm_encrypt" => NativeFn::Aead(block::aes_256_gcm_encrypt),
        "aes_256_gcm_decrypt" => NativeFn::Aead(block::aes_256_gcm_decrypt),
        "aria_128_gcm_encrypt" => NativeFn::Aead(block::aria_128_gcm_encrypt),
        "aria_128_gcm_decrypt" => NativeFn::Aead(block::aria_128_gcm_decrypt),
        "aria_192_gcm_encrypt" => NativeFn::Aead(block::aria_192_gcm_encrypt),
        "aria_192_gcm_decrypt" => NativeFn::Aead(block::aria_192_gcm_decrypt),
        "aria_256_gcm_encrypt" => NativeFn::Aead(block::aria_256_gcm_encrypt),
        "aria_256_gcm_decrypt" => NativeFn::Aead(block::aria_256_gcm_decrypt),

        "aes_128_ccm_encrypt" => NativeFn::Aead(block::aes_128_ccm_encrypt),
        "aes_128_ccm_decrypt" => NativeFn::Aead(block::aes_128_ccm_decrypt),
        "aes_192_ccm_encrypt" => NativeFn::Aead(block::aes_192_ccm_encrypt),
        "aes_192_ccm_decrypt" => NativeFn::Aead(block::aes_192_ccm_decrypt),
        "aes_256_ccm_encrypt" => NativeFn::Aead(block::aes_256_ccm_encrypt),
        "aes_256_ccm_decrypt" => NativeFn::Aead(block::aes_256_ccm_decrypt),
        "aria_128_ccm_encrypt" => NativeFn::Aead(block::aria_128_ccm_encrypt),
        "aria_128_ccm_decrypt" => NativeFn::Aead(block::aria_128_ccm_decrypt),
        "aria_192_ccm_encrypt" => NativeFn::Aead(block::aria_192_ccm_encrypt),
        "aria_192_ccm_decrypt" => NativeFn::Aead(block::aria_192_ccm_decrypt),
        "aria_256_ccm_encrypt" => NativeFn::Aead(block::aria_256_ccm_encrypt),
        "aria_256_ccm_decrypt" => NativeFn::Aead(block::aria_256_ccm_decrypt),

        "chacha20_encrypt" => NativeFn::Stream(stream::chacha20_encrypt),
        "chacha20_decrypt" => NativeFn::Stream(stream::chacha20_decrypt),
        "chacha20_poly1305_encrypt" => NativeFn::Aead(stream::chacha20_poly1305_encrypt),
        "chacha20_poly1305_decrypt" => NativeFn::Aead(stream::chacha20_poly1305_decrypt),

        "ml_kem_512_keygen" => NativeFn::KeyGen(kem::ml_kem_512_keygen),
        "ml_kem_512_encapsulate" => NativeFn::Triple(kem::ml_kem_512_encapsulate),
        "ml_kem_512_decapsulate" => NativeFn::Triple(kem::ml_kem_512_decapsulate),
        "ml_kem_768_keygen" => NativeFn::KeyGen(kem::ml_kem_768_keygen),
        "ml_kem_768_encapsulate" => NativeFn::Triple(kem::ml_kem_768_encapsulate),
        "ml_kem_768_decapsulate" => NativeFn::Triple(kem::ml_kem_768_decapsulate),
        "ml_kem_1024_keygen" => NativeFn::KeyGen(kem::ml_kem_1024_keygen),
        "ml_kem_1024_encapsulate" => NativeFn::Triple(kem::ml_kem_1024_encapsulate),
        "ml_kem_1024_decapsulate" => NativeFn::Triple(kem::ml_kem_1024_decapsulate),

        "ml_dsa_44_keygen" => NativeFn::KeyGen(sign::ml_dsa_44_keygen),
        "ml_dsa_44_sign" => NativeFn::Sign(sign::ml_dsa_44_sign),
        "ml_dsa_44_verify" => NativeFn::Verify(sign::ml_dsa_44_verify),
        "ml_dsa_65_keygen" => NativeFn::KeyGen(sign::ml_dsa_65_keygen),
        "ml_dsa_65_sign" => NativeFn::Sign(sign::ml_dsa_65_sign),
        "ml_dsa_65_verify" => NativeFn::Verify(sign::ml_dsa_65_verify),
        "ml_dsa_87_keygen" => NativeFn::KeyGen(sign::ml_dsa_87_keygen),
        "ml_dsa_87_sign" => NativeFn::Sign(sign::ml_dsa_87_sign),
        "ml_dsa_87_verify" => NativeFn::Verify(sign::ml_dsa_87_verify),

        "x25519_keygen" => NativeFn::KeyGen(ecdh::x25519_keygen),
        "x25519_dh" => NativeFn::Triple(ecdh::x25519_dh),

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wipe_zeroes_and_counts() {
        let mut buf = [0xABu8; 48];
        let before = wipe_invocations();
        unsafe { wipe(buf.as_mut_ptr(), buf.len() as i64) };
        assert_eq!(buf, [0u8; 48]);
        assert!(wipe_invocations() > before);
        assert_eq!(recent_wipes().last(), Some(&48));
    }

    #[test]
    fn wipe_tolerates_null() {
        unsafe { wipe(std::ptr::null_mut(), 16) };
    }

    #[test]
    fn random_bytes_fills() {
        let mut buf = [0u8; 32];
        let rc = unsafe { random_bytes(buf.as_mut_ptr(), buf.len() as i64) };
        assert_eq!(rc, status::OK);
        assert_ne!(buf, [0u8; 32]);
    }

    #[test]
    fn lookup_covers_every_bundle_symbol() {
        for sym in [
            "wipe",
            "random_bytes",
            "aes_256_encrypt",
            "aria_192_gcm_decrypt",
            "chacha20_encrypt",
            "chacha20_poly1305_decrypt",
            "ml_kem_768_encapsulate",
            "ml_dsa_65_sign",
            "x25519_dh",
        ] {
            assert!(lookup(sym).is_some(), "missing {}", sym);
        }
        assert!(lookup("rsa_2048_encrypt").is_none());
    }
}
