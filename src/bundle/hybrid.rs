//! Hybrid X25519 + ML-KEM-768 bundle.
//!
//! Reuses the component bundles' symbols (re-registration is a no-op); the
//! composition itself (concatenated layouts and the combining KDF) lives
//! in the strategy.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::native::Layout;
use crate::registry::{OperationStrategy, RegistryBuilder};
use crate::strategy::{HybridKemStrategy, KeyGenStrategy};

use super::{KEYGEN_SIG, TRIPLE_SIG};

pub(crate) fn install(builder: &mut RegistryBuilder) -> Result<()> {
    let lib = builder.library();
    lib.add_returnable_handle("x25519_keygen", Layout::I32, &KEYGEN_SIG)?;
    lib.add_returnable_handle("x25519_dh", Layout::I32, &TRIPLE_SIG)?;
    lib.add_returnable_handle("ml_kem_768_keygen", Layout::I32, &KEYGEN_SIG)?;
    lib.add_returnable_handle("ml_kem_768_encapsulate", Layout::I32, &TRIPLE_SIG)?;
    lib.add_returnable_handle("ml_kem_768_decapsulate", Layout::I32, &TRIPLE_SIG)?;
    builder.install_operation(
        Algorithm::HybridX25519MlKem768,
        OperationStrategy::HybridKem(HybridKemStrategy::new(lib)),
    );
    builder.install_generator(Algorithm::HybridX25519MlKem768, KeyGenStrategy::hybrid(lib));
    Ok(())
}
