//! ARIA bundle.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::registry::RegistryBuilder;

pub(crate) fn install(builder: &mut RegistryBuilder) -> Result<()> {
    super::install_block_family(
        builder,
        &[Algorithm::Aria128, Algorithm::Aria192, Algorithm::Aria256],
    )
}
