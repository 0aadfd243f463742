//! ML-KEM bundle.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::native::Layout;
use crate::registry::{OperationStrategy, RegistryBuilder};
use crate::strategy::{KemStrategy, KeyGenStrategy};

use super::{KEYGEN_SIG, TRIPLE_SIG};

pub(crate) fn install(builder: &mut RegistryBuilder) -> Result<()> {
    let lib = builder.library();
    for alg in [Algorithm::MlKem512, Algorithm::MlKem768, Algorithm::MlKem1024] {
        let prefix = alg.symbol_prefix();
        lib.add_returnable_handle(&format!("{prefix}_keygen"), Layout::I32, &KEYGEN_SIG)?;
        lib.add_returnable_handle(&format!("{prefix}_encapsulate"), Layout::I32, &TRIPLE_SIG)?;
        lib.add_returnable_handle(&format!("{prefix}_decapsulate"), Layout::I32, &TRIPLE_SIG)?;
        builder.install_operation(alg, OperationStrategy::Kem(KemStrategy::new(alg, lib)));
        builder.install_generator(alg, KeyGenStrategy::asymmetric(alg, lib));
    }
    Ok(())
}
