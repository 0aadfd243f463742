//! AES bundle.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::registry::RegistryBuilder;

pub(crate) fn install(builder: &mut RegistryBuilder) -> Result<()> {
    super::install_block_family(
        builder,
        &[Algorithm::Aes128, Algorithm::Aes192, Algorithm::Aes256],
    )
}
