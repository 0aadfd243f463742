//! ML-DSA bundle.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::native::Layout;
use crate::registry::{OperationStrategy, RegistryBuilder};
use crate::strategy::{KeyGenStrategy, SignatureStrategy};

use super::{KEYGEN_SIG, SIGN_SIG, VERIFY_SIG};

pub(crate) fn install(builder: &mut RegistryBuilder) -> Result<()> {
    let lib = builder.library();
    for alg in [Algorithm::MlDsa44, Algorithm::MlDsa65, Algorithm::MlDsa87] {
        let prefix = alg.symbol_prefix();
        lib.add_returnable_handle(&format!("{prefix}_keygen"), Layout::I32, &KEYGEN_SIG)?;
        lib.add_returnable_handle(&format!("{prefix}_sign"), Layout::I32, &SIGN_SIG)?;
        lib.add_returnable_handle(&format!("{prefix}_verify"), Layout::I32, &VERIFY_SIG)?;
        builder
            .install_operation(alg, OperationStrategy::Signature(SignatureStrategy::new(alg, lib)));
        builder.install_generator(alg, KeyGenStrategy::asymmetric(alg, lib));
    }
    Ok(())
}
