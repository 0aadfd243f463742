//! Capability contracts implemented by the operation strategies.
//!
//! Secrets travel exclusively inside [`SecretContainer`]s; only message
//! bytes (plaintext to sign, raw stream buffers) and associated data cross
//! the boundary as ordinary slices.

use crate::algorithm::Algorithm;
use crate::container::SecretContainer;
use crate::error::Result;
use std::sync::Arc;

/// IV/nonce argument. Raw bytes are taken by value and wiped after being
/// ingested; an integer requests a fresh IV of that length from the native
/// CSPRNG; a container is used in place.
pub enum IvSource {
    Bytes(Vec<u8>),
    Generate(usize),
    Container(Arc<SecretContainer>),
}

/// Symmetric encryption over containers.
///
/// With `chain_iv`, the ciphertext container is laid out `iv || body`
/// (the body already carries the authentication tag for AEAD modes). With
/// `infer_iv`, the first IV-length bytes of the ciphertext are consumed as
/// the IV; without it, an explicitly supplied IV is required, and nothing is
/// ever inferred silently.
pub trait Cipher {
    fn algorithm(&self) -> Algorithm;

    /// Stage the IV for the next operation. It is consumed by that
    /// operation; reuse requires staging it again.
    fn iv(&mut self, source: IvSource) -> Result<()>;

    fn encrypt(
        &mut self,
        key: &SecretContainer,
        plaintext: &SecretContainer,
        chain_iv: bool,
    ) -> Result<Arc<SecretContainer>>;

    fn decrypt(
        &mut self,
        key: &SecretContainer,
        ciphertext: &SecretContainer,
        infer_iv: bool,
    ) -> Result<Arc<SecretContainer>>;
}

/// Block cipher configuration surface. The mode/padding/digest builders
/// live on the concrete strategy type and chain by value.
pub trait BlockCipher: Cipher {
    fn mode(&self) -> crate::algorithm::Mode;
    fn padding(&self) -> crate::algorithm::Padding;
    fn digest(&self) -> crate::algorithm::DigestKind;
}

/// Authenticated encryption with associated data.
pub trait AeadCipher: Cipher {
    /// Append associated data bound by the next operation's tag.
    fn update_aad(&mut self, aad: &[u8]);
}

/// Stream ciphers additionally expose raw buffer-to-buffer streaming.
pub trait StreamCipher: Cipher {
    /// Returns the number of bytes written. Requires a staged IV.
    fn stream_encrypt(
        &mut self,
        key: &SecretContainer,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize>;

    fn stream_decrypt(
        &mut self,
        key: &SecretContainer,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize>;
}

/// Signature scheme. `sign` returns a composite container: the signature
/// at the root, the signed message at child 0.
pub trait SignatureScheme {
    fn algorithm(&self) -> Algorithm;

    fn sign(
        &self,
        private_key: &SecretContainer,
        message: &[u8],
    ) -> Result<Arc<SecretContainer>>;

    /// `Ok(false)` means a well-formed but invalid signature; malformed
    /// inputs fail with an error instead.
    fn verify(&self, public_key: &SecretContainer, bundle: &SecretContainer) -> Result<bool>;
}

/// Key encapsulation. `encapsulate` returns a composite container: the
/// shared secret at the root, the ciphertext at child 0.
pub trait Kem {
    fn algorithm(&self) -> Algorithm;

    fn encapsulate(&self, public_key: &SecretContainer) -> Result<Arc<SecretContainer>>;

    fn decapsulate(
        &self,
        private_key: &SecretContainer,
        ciphertext: &SecretContainer,
    ) -> Result<Arc<SecretContainer>>;
}

/// Diffie-Hellman style key agreement.
pub trait KeyAgreement {
    fn algorithm(&self) -> Algorithm;

    fn compute_shared(
        &self,
        my_private: &SecretContainer,
        peer_public: &SecretContainer,
    ) -> Result<Arc<SecretContainer>>;
}

/// Output of a key generator.
pub enum GeneratedKey {
    Symmetric(Arc<SecretContainer>),
    KeyPair {
        public_key: Arc<SecretContainer>,
        private_key: Arc<SecretContainer>,
    },
}

pub trait KeyGenerator {
    fn algorithm(&self) -> Algorithm;

    fn generate(&self) -> Result<GeneratedKey>;
}
