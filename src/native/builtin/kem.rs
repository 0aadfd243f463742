//! ML-KEM entry points (FIPS 203).
//!
//! Key and ciphertext regions use the canonical encodings; the shared
//! secret is always 32 bytes. Decapsulation is implicit-reject and does not
//! signal tampering through the status code.

use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Ciphertext, Encoded, EncodedSizeUser, KemCore, MlKem1024, MlKem512, MlKem768};
use rand_core::OsRng;

use super::{fixed_in, guarded, slice_out};
use crate::native::status;

const SHARED_SECRET_LEN: usize = 32;

macro_rules! ml_kem_symbols {
    ($keygen:ident, $encap:ident, $decap:ident, $kem:ty, $ek_len:expr, $dk_len:expr, $ct_len:expr) => {
        pub(crate) unsafe extern "C" fn $keygen(sk_out: *mut u8, pk_out: *mut u8) -> i32 {
            guarded(|| unsafe {
                let body = || -> Result<i32, i32> {
                    let sk = slice_out(sk_out, $dk_len)?;
                    let pk = slice_out(pk_out, $ek_len)?;
                    let (dk, ek) = <$kem>::generate(&mut OsRng);
                    sk.copy_from_slice(dk.as_bytes().as_slice());
                    pk.copy_from_slice(ek.as_bytes().as_slice());
                    Ok(status::OK)
                };
                match body() {
                    Ok(rc) => rc,
                    Err(rc) => rc,
                }
            })
        }

        pub(crate) unsafe extern "C" fn $encap(
            ct_out: *mut u8,
            ss_out: *mut u8,
            pk_in: *const u8,
        ) -> i32 {
            guarded(|| unsafe {
                let body = || -> Result<i32, i32> {
                    let pk_bytes = fixed_in(pk_in, $ek_len)?;
                    let ct_region = slice_out(ct_out, $ct_len)?;
                    let ss_region = slice_out(ss_out, SHARED_SECRET_LEN)?;

                    let encoded = Encoded::<<$kem as KemCore>::EncapsulationKey>::try_from(
                        pk_bytes,
                    )
                    .map_err(|_| status::BAD_LENGTH)?;
                    let ek = <<$kem as KemCore>::EncapsulationKey>::from_bytes(&encoded);
                    let (ct, ss) =
                        ek.encapsulate(&mut OsRng).map_err(|_| status::GENERIC)?;
                    ct_region.copy_from_slice(ct.as_slice());
                    ss_region.copy_from_slice(ss.as_slice());
                    Ok(status::OK)
                };
                match body() {
                    Ok(rc) => rc,
                    Err(rc) => rc,
                }
            })
        }

        pub(crate) unsafe extern "C" fn $decap(
            ss_out: *mut u8,
            ct_in: *mut u8,
            sk_in: *const u8,
        ) -> i32 {
            guarded(|| unsafe {
                let body = || -> Result<i32, i32> {
                    let ct_bytes = fixed_in(ct_in as *const u8, $ct_len)?;
                    let sk_bytes = fixed_in(sk_in, $dk_len)?;
                    let ss_region = slice_out(ss_out, SHARED_SECRET_LEN)?;

                    let encoded = Encoded::<<$kem as KemCore>::DecapsulationKey>::try_from(
                        sk_bytes,
                    )
                    .map_err(|_| status::BAD_LENGTH)?;
                    let dk = <<$kem as KemCore>::DecapsulationKey>::from_bytes(&encoded);
                    let ct = Ciphertext::<$kem>::try_from(ct_bytes)
                        .map_err(|_| status::BAD_LENGTH)?;
                    let ss = dk.decapsulate(&ct).map_err(|_| status::GENERIC)?;
                    ss_region.copy_from_slice(ss.as_slice());
                    Ok(status::OK)
                };
                match body() {
                    Ok(rc) => rc,
                    Err(rc) => rc,
                }
            })
        }
    };
}

ml_kem_symbols!(
    ml_kem_512_keygen,
    ml_kem_512_encapsulate,
    ml_kem_512_decapsulate,
    MlKem512,
    800,
    1632,
    768
);
ml_kem_symbols!(
    ml_kem_768_keygen,
    ml_kem_768_encapsulate,
    ml_kem_768_decapsulate,
    MlKem768,
    1184,
    2400,
    1088
);
ml_kem_symbols!(
    ml_kem_1024_keygen,
    ml_kem_1024_encapsulate,
    ml_kem_1024_decapsulate,
    MlKem1024,
    1568,
    3168,
    1568
);
