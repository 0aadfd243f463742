//! Strategy registry.
//!
//! Two maps (algorithm to operation strategy, algorithm to key generator)
//! populated exactly once by the bundles and frozen. Lookups clone a fresh
//! strategy instance so per-operation state (staged IVs, accumulated AAD)
//! never leaks between callers; the capability-typed getters are the single
//! downcast point.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::algorithm::Algorithm;
use crate::bundle;
use crate::contracts::{AeadCipher, Kem};
use crate::error::{CryptoError, Result};
use crate::native::NativeLibrary;
use crate::strategy::{
    AeadStreamStrategy, BlockCipherStrategy, HybridKemStrategy, KemStrategy, KeyAgreementStrategy,
    KeyGenStrategy, SignatureStrategy, StreamCipherStrategy,
};

/// Tagged operation strategy, as installed by a bundle.
#[derive(Clone)]
pub enum OperationStrategy {
    Block(BlockCipherStrategy),
    Stream(StreamCipherStrategy),
    AeadStream(AeadStreamStrategy),
    Signature(SignatureStrategy),
    Kem(KemStrategy),
    HybridKem(HybridKemStrategy),
    KeyAgreement(KeyAgreementStrategy),
}

pub struct Registry {
    operations: HashMap<Algorithm, OperationStrategy>,
    generators: HashMap<Algorithm, KeyGenStrategy>,
}

pub struct RegistryBuilder {
    library: &'static NativeLibrary,
    operations: HashMap<Algorithm, OperationStrategy>,
    generators: HashMap<Algorithm, KeyGenStrategy>,
}

impl RegistryBuilder {
    pub(crate) fn new(library: &'static NativeLibrary) -> Self {
        Self { library, operations: HashMap::new(), generators: HashMap::new() }
    }

    pub(crate) fn library(&self) -> &'static NativeLibrary {
        self.library
    }

    pub(crate) fn install_operation(&mut self, algorithm: Algorithm, strategy: OperationStrategy) {
        self.operations.insert(algorithm, strategy);
    }

    pub(crate) fn install_generator(&mut self, algorithm: Algorithm, generator: KeyGenStrategy) {
        self.generators.insert(algorithm, generator);
    }

    fn finish(self) -> Registry {
        Registry { operations: self.operations, generators: self.generators }
    }
}

impl Registry {
    /// The process-wide registry. The first caller binds the native library
    /// and runs every bundle; racing initializers are serialized and the
    /// first result wins. Registration is impossible afterwards.
    pub fn global() -> Result<&'static Registry> {
        static REGISTRY: OnceLock<std::result::Result<Registry, CryptoError>> = OnceLock::new();
        match REGISTRY.get_or_init(Self::initialize) {
            Ok(registry) => Ok(registry),
            Err(e) => Err(e.clone()),
        }
    }

    fn initialize() -> std::result::Result<Registry, CryptoError> {
        let library = NativeLibrary::bind()?;
        let mut builder = RegistryBuilder::new(library);
        bundle::install_all(&mut builder)?;
        tracing::debug!(
            operations = builder.operations.len(),
            generators = builder.generators.len(),
            "strategy registry initialized"
        );
        Ok(builder.finish())
    }

    pub fn is_registered(&self, algorithm: Algorithm) -> bool {
        self.operations.contains_key(&algorithm)
    }

    /// The raw tagged strategy for an algorithm.
    pub fn operation(&self, algorithm: Algorithm) -> Result<OperationStrategy> {
        self.operations.get(&algorithm).cloned().ok_or(CryptoError::UnsupportedCapability {
            algorithm,
            requested: "registered strategy",
        })
    }

    pub fn key_generator(&self, algorithm: Algorithm) -> Result<KeyGenStrategy> {
        self.generators.get(&algorithm).cloned().ok_or(CryptoError::UnsupportedCapability {
            algorithm,
            requested: "key generator",
        })
    }

    // -- capability-typed getters ------------------------------------------

    pub fn block_cipher(&self, algorithm: Algorithm) -> Result<BlockCipherStrategy> {
        match self.operation(algorithm)? {
            OperationStrategy::Block(s) => Ok(s),
            _ => Err(CryptoError::UnsupportedCapability { algorithm, requested: "block cipher" }),
        }
    }

    pub fn stream_cipher(&self, algorithm: Algorithm) -> Result<StreamCipherStrategy> {
        match self.operation(algorithm)? {
            OperationStrategy::Stream(s) => Ok(s),
            _ => Err(CryptoError::UnsupportedCapability { algorithm, requested: "stream cipher" }),
        }
    }

    /// AEAD view of a registered strategy: the dedicated AEAD stream cipher,
    /// or a block cipher pre-set to GCM.
    pub fn aead_cipher(&self, algorithm: Algorithm) -> Result<Box<dyn AeadCipher>> {
        match self.operation(algorithm)? {
            OperationStrategy::AeadStream(s) => Ok(Box::new(s)),
            OperationStrategy::Block(s) => {
                Ok(Box::new(s.with_mode(crate::algorithm::Mode::Gcm)))
            }
            _ => Err(CryptoError::UnsupportedCapability { algorithm, requested: "AEAD cipher" }),
        }
    }

    pub fn signature(&self, algorithm: Algorithm) -> Result<SignatureStrategy> {
        match self.operation(algorithm)? {
            OperationStrategy::Signature(s) => Ok(s),
            _ => Err(CryptoError::UnsupportedCapability {
                algorithm,
                requested: "signature scheme",
            }),
        }
    }

    pub fn kem(&self, algorithm: Algorithm) -> Result<Box<dyn Kem>> {
        match self.operation(algorithm)? {
            OperationStrategy::Kem(s) => Ok(Box::new(s)),
            OperationStrategy::HybridKem(s) => Ok(Box::new(s)),
            _ => Err(CryptoError::UnsupportedCapability { algorithm, requested: "KEM" }),
        }
    }

    pub fn key_agreement(&self, algorithm: Algorithm) -> Result<KeyAgreementStrategy> {
        match self.operation(algorithm)? {
            OperationStrategy::KeyAgreement(s) => Ok(s),
            _ => Err(CryptoError::UnsupportedCapability { algorithm, requested: "key agreement" }),
        }
    }
}
