//! Strategy bundles: per-family registration units.
//!
//! Each bundle declares its native symbol layouts, registers them with the
//! linker, and installs one operation strategy and one key generator per
//! algorithm in the family. Bundles run once, inside the registry's
//! one-shot initialization; re-registration of symbols shared between
//! bundles is a no-op.

pub(crate) mod aes;
pub(crate) mod aria;
pub(crate) mod chacha;
pub(crate) mod hybrid;
pub(crate) mod mldsa;
pub(crate) mod mlkem;
pub(crate) mod x25519;

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::native::Layout;
use crate::registry::{OperationStrategy, RegistryBuilder};
use crate::strategy::{BlockCipherStrategy, KeyGenStrategy};

pub(crate) const BLOCK_SIG: [Layout; 6] = [
    Layout::Address,
    Layout::Address,
    Layout::I64,
    Layout::Address,
    Layout::Address,
    Layout::I32,
];
pub(crate) const STREAM_SIG: [Layout; 5] = [
    Layout::Address,
    Layout::Address,
    Layout::I64,
    Layout::Address,
    Layout::Address,
];
pub(crate) const AEAD_SIG: [Layout; 7] = [
    Layout::Address,
    Layout::Address,
    Layout::I64,
    Layout::Address,
    Layout::Address,
    Layout::Address,
    Layout::I64,
];
pub(crate) const KEYGEN_SIG: [Layout; 2] = [Layout::Address, Layout::Address];
pub(crate) const TRIPLE_SIG: [Layout; 3] = [Layout::Address, Layout::Address, Layout::Address];
pub(crate) const SIGN_SIG: [Layout; 4] =
    [Layout::Address, Layout::Address, Layout::I64, Layout::Address];
pub(crate) const VERIFY_SIG: [Layout; 4] =
    [Layout::Address, Layout::I64, Layout::Address, Layout::Address];

pub(crate) fn install_all(builder: &mut RegistryBuilder) -> Result<()> {
    aes::install(builder)?;
    aria::install(builder)?;
    chacha::install(builder)?;
    mlkem::install(builder)?;
    mldsa::install(builder)?;
    x25519::install(builder)?;
    hybrid::install(builder)?;
    Ok(())
}

/// Shared by the AES and ARIA bundles: both expose the block shape plus
/// dedicated GCM/CCM symbols per key size.
pub(crate) fn install_block_family(
    builder: &mut RegistryBuilder,
    algorithms: &[Algorithm],
) -> Result<()> {
    let lib = builder.library();
    for &alg in algorithms {
        let prefix = alg.symbol_prefix();
        lib.add_returnable_handle(&format!("{prefix}_encrypt"), Layout::I32, &BLOCK_SIG)?;
        lib.add_returnable_handle(&format!("{prefix}_decrypt"), Layout::I32, &BLOCK_SIG)?;
        for mode in ["gcm", "ccm"] {
            lib.add_returnable_handle(&format!("{prefix}_{mode}_encrypt"), Layout::I32, &AEAD_SIG)?;
            lib.add_returnable_handle(&format!("{prefix}_{mode}_decrypt"), Layout::I32, &AEAD_SIG)?;
        }
        tracing::debug!(algorithm = alg.name(), "registered block cipher bundle entry");
        builder.install_operation(alg, OperationStrategy::Block(BlockCipherStrategy::new(alg, lib)));
        builder.install_generator(alg, KeyGenStrategy::symmetric(alg, lib));
    }
    Ok(())
}
