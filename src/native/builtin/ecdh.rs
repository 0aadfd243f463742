//! X25519 entry points.

use rand_core::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use super::{fixed_in, guarded, slice_out};
use crate::native::status;

const KEY_LEN: usize = 32;

pub(crate) unsafe extern "C" fn x25519_keygen(sk_out: *mut u8, pk_out: *mut u8) -> i32 {
    guarded(|| unsafe {
        let body = || -> Result<i32, i32> {
            let sk_region = slice_out(sk_out, KEY_LEN)?;
            let pk_region = slice_out(pk_out, KEY_LEN)?;
            let sk = StaticSecret::random_from_rng(OsRng);
            let pk = PublicKey::from(&sk);
            sk_region.copy_from_slice(&sk.to_bytes());
            pk_region.copy_from_slice(pk.as_bytes());
            Ok(status::OK)
        };
        match body() {
            Ok(rc) => rc,
            Err(rc) => rc,
        }
    })
}

pub(crate) unsafe extern "C" fn x25519_dh(
    ss_out: *mut u8,
    sk_in: *mut u8,
    pk_in: *const u8,
) -> i32 {
    guarded(|| unsafe {
        let body = || -> Result<i32, i32> {
            let sk_bytes = fixed_in(sk_in as *const u8, KEY_LEN)?;
            let pk_bytes = fixed_in(pk_in, KEY_LEN)?;
            let ss_region = slice_out(ss_out, KEY_LEN)?;

            let sk_arr: [u8; KEY_LEN] =
                sk_bytes.try_into().map_err(|_| status::BAD_LENGTH)?;
            let pk_arr: [u8; KEY_LEN] =
                pk_bytes.try_into().map_err(|_| status::BAD_LENGTH)?;
            let sk = StaticSecret::from(sk_arr);
            let pk = PublicKey::from(pk_arr);
            let ss = sk.diffie_hellman(&pk);
            ss_region.copy_from_slice(ss.as_bytes());
            Ok(status::OK)
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
    fn dh_agrees_both_directions() {
        let mut sk_a = [0u8; 32];
        let mut pk_a = [0u8; 32];
        let mut sk_b = [0u8; 32];
        let mut pk_b = [0u8; 32];
        unsafe {
            assert_eq!(x25519_keygen(sk_a.as_mut_ptr(), pk_a.as_mut_ptr()), status::OK);
            assert_eq!(x25519_keygen(sk_b.as_mut_ptr(), pk_b.as_mut_ptr()), status::OK);
        }

        let mut ss_ab = [0u8; 32];
        let mut ss_ba = [0u8; 32];
        unsafe {
            assert_eq!(x25519_dh(ss_ab.as_mut_ptr(), sk_a.as_mut_ptr(), pk_b.as_ptr()), status::OK);
            assert_eq!(x25519_dh(ss_ba.as_mut_ptr(), sk_b.as_mut_ptr(), pk_a.as_ptr()), status::OK);
        }
        assert_eq!(ss_ab, ss_ba);
    }
}
