//! ChaCha20 and ChaCha20-Poly1305 bundle.

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::native::Layout;
use crate::registry::{OperationStrategy, RegistryBuilder};
use crate::strategy::{AeadStreamStrategy, KeyGenStrategy, StreamCipherStrategy};

use super::{AEAD_SIG, STREAM_SIG};

pub(crate) fn install(builder: &mut RegistryBuilder) -> Result<()> {
    let lib = builder.library();

    lib.add_returnable_handle("chacha20_encrypt", Layout::I32, &STREAM_SIG)?;
    lib.add_returnable_handle("chacha20_decrypt", Layout::I32, &STREAM_SIG)?;
    builder.install_operation(
        Algorithm::ChaCha20,
        OperationStrategy::Stream(StreamCipherStrategy::new(Algorithm::ChaCha20, lib)),
    );
    builder.install_generator(
        Algorithm::ChaCha20,
        KeyGenStrategy::symmetric(Algorithm::ChaCha20, lib),
    );

    lib.add_returnable_handle("chacha20_poly1305_encrypt", Layout::I32, &AEAD_SIG)?;
    lib.add_returnable_handle("chacha20_poly1305_decrypt", Layout::I32, &AEAD_SIG)?;
    builder.install_operation(
        Algorithm::ChaCha20Poly1305,
        OperationStrategy::AeadStream(AeadStreamStrategy::new(Algorithm::ChaCha20Poly1305, lib)),
    );
    builder.install_generator(
        Algorithm::ChaCha20Poly1305,
        KeyGenStrategy::symmetric(Algorithm::ChaCha20Poly1305, lib),
    );
    Ok(())
}
