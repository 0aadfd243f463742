//! X25519 bundle.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::native::Layout;
use crate::registry::{OperationStrategy, RegistryBuilder};
use crate::strategy::{KeyAgreementStrategy, KeyGenStrategy};

use super::{KEYGEN_SIG, TRIPLE_SIG};

pub(crate) fn install(builder: &mut RegistryBuilder) -> Result<()> {
    let lib = builder.library();
    lib.add_returnable_handle("x25519_keygen", Layout::I32, &KEYGEN_SIG)?;
    lib.add_returnable_handle("x25519_dh", Layout::I32, &TRIPLE_SIG)?;
    builder.install_operation(
        Algorithm::X25519,
        OperationStrategy::KeyAgreement(KeyAgreementStrategy::new(Algorithm::X25519, lib)),
    );
    builder.install_generator(Algorithm::X25519, KeyGenStrategy::asymmetric(Algorithm::X25519, lib));
    Ok(())
}
