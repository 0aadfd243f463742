//! ML-DSA entry points (FIPS 204).
//!
//! Verification distinguishes "well-formed but wrong" from "malformed":
//! a signature that decodes but does not verify returns the authentication
//! status, which the strategy layer reports as `false`.

use ml_dsa::{
    EncodedSignature, EncodedSigningKey, EncodedVerifyingKey, KeyGen, MlDsa44, MlDsa65, MlDsa87,
    Signature, SigningKey, VerifyingKey,
};
use rand_core::OsRng;

use super::{fixed_in, guarded, slice_in, slice_out};
use crate::native::status;

macro_rules! ml_dsa_symbols {
    ($keygen:ident, $sign:ident, $verify:ident, $p:ty, $pk_len:expr, $sk_len:expr, $sig_len:expr) => {
        pub(crate) unsafe extern "C" fn $keygen(sk_out: *mut u8, pk_out: *mut u8) -> i32 {
            guarded(|| unsafe {
                let body = || -> Result<i32, i32> {
                    let sk = slice_out(sk_out, $sk_len)?;
                    let pk = slice_out(pk_out, $pk_len)?;
                    let kp = <$p>::key_gen(&mut OsRng);
                    sk.copy_from_slice(kp.signing_key().encode().as_slice());
                    pk.copy_from_slice(kp.verifying_key().encode().as_slice());
                    Ok(status::OK)
                };
                match body() {
                    Ok(rc) => rc,
                    Err(rc) => rc,
                }
            })
        }

        pub(crate) unsafe extern "C" fn $sign(
            sig_out: *mut u8,
            msg_in: *const u8,
            msg_len: i64,
            sk_in: *const u8,
        ) -> i32 {
            guarded(|| unsafe {
                let body = || -> Result<i32, i32> {
                    let msg = slice_in(msg_in, msg_len)?;
                    let sk_bytes = fixed_in(sk_in, $sk_len)?;
                    let sig_region = slice_out(sig_out, $sig_len)?;

                    let encoded = EncodedSigningKey::<$p>::try_from(sk_bytes)
                        .map_err(|_| status::BAD_LENGTH)?;
                    let sk = SigningKey::<$p>::decode(&encoded);
                    let sig = sk
                        .sign_deterministic(msg, b"")
                        .map_err(|_| status::GENERIC)?;
                    sig_region.copy_from_slice(sig.encode().as_slice());
                    Ok(status::OK)
                };
                match body() {
                    Ok(rc) => rc,
                    Err(rc) => rc,
                }
            })
        }

        pub(crate) unsafe extern "C" fn $verify(
            msg_in: *const u8,
            msg_len: i64,
            sig_in: *const u8,
            pk_in: *const u8,
        ) -> i32 {
            guarded(|| unsafe {
                let body = || -> Result<i32, i32> {
                    let msg = slice_in(msg_in, msg_len)?;
                    let sig_bytes = fixed_in(sig_in, $sig_len)?;
                    let pk_bytes = fixed_in(pk_in, $pk_len)?;

                    let encoded_pk = EncodedVerifyingKey::<$p>::try_from(pk_bytes)
                        .map_err(|_| status::BAD_LENGTH)?;
                    let vk = VerifyingKey::<$p>::decode(&encoded_pk);

                    let encoded_sig = EncodedSignature::<$p>::try_from(sig_bytes)
                        .map_err(|_| status::BAD_LENGTH)?;
                    // An undecodable signature is "wrong", not "malformed":
                    // a single flipped bit must read as a failed verification.
                    let sig = match Signature::<$p>::decode(&encoded_sig) {
                        Some(sig) => sig,
                        None => return Err(status::AUTH),
                    };

                    if vk.verify_with_context(msg, b"", &sig) {
                        Ok(status::OK)
                    } else {
                        Err(status::AUTH)
                    }
                };
                match body() {
                    Ok(rc) => rc,
                    Err(rc) => rc,
                }
            })
        }
    };
}

ml_dsa_symbols!(ml_dsa_44_keygen, ml_dsa_44_sign, ml_dsa_44_verify, MlDsa44, 1312, 2560, 2420);
ml_dsa_symbols!(ml_dsa_65_keygen, ml_dsa_65_sign, ml_dsa_65_verify, MlDsa65, 1952, 4032, 3309);
ml_dsa_symbols!(ml_dsa_87_keygen, ml_dsa_87_sign, ml_dsa_87_verify, MlDsa87, 2592, 4896, 4627);
