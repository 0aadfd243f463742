//! Native core binding and call marshalling.
//!
//! Every cryptographic primitive lives behind a C-ABI surface. The linker
//! resolves named symbols into typed call handles and is the only place
//! that turns a container segment pointer into an `address` argument.
//!
//! Two bindings exist: the built-in core compiled into this crate, and an
//! externally built shared library resolved through `NATIVE_BIN_DIR` with
//! `libloading`. The external library is leaked on load so it stays mapped
//! for the program lifetime; rebinding is idempotent.

pub mod builtin;

use crate::config::{self, LibraryConfig};
use crate::error::{CryptoError, Result};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Native core status codes shared between the marshalling layer and the
/// built-in implementation.
pub(crate) mod status {
    pub const OK: i32 = 0;
    pub const GENERIC: i32 = -1;
    pub const BAD_POINTER: i32 = -2;
    pub const BAD_LENGTH: i32 = -3;
    pub const CIPHER: i32 = -4;
    pub const AUTH: i32 = -5;
    pub const PANIC: i32 = -6;
}

/// Encoding of the block-cipher `mode: i32` argument: mode identifier in the
/// low byte, padding identifier in the second byte. AEAD modes never travel
/// through this argument; they have their own symbols.
pub(crate) mod abi {
    pub const MODE_ECB: i32 = 1;
    pub const MODE_CBC: i32 = 2;
    pub const MODE_CFB: i32 = 3;
    pub const MODE_OFB: i32 = 4;
    pub const MODE_CTR: i32 = 5;

    pub const PAD_NONE: i32 = 0;
    pub const PAD_PKCS7: i32 = 1;
    pub const PAD_ISO7816: i32 = 2;
    pub const PAD_ISO10126: i32 = 3;
    pub const PAD_ZERO: i32 = 4;

    pub fn pack_mode(mode: i32, padding: i32) -> i32 {
        mode | (padding << 8)
    }

    pub fn unpack_mode(packed: i32) -> (i32, i32) {
        (packed & 0xff, (packed >> 8) & 0xff)
    }
}

// ---------------------------------------------------------------------------
// Signature grammar
// ---------------------------------------------------------------------------

/// Marshalling layout tokens. `Address` is an off-heap pointer; the rest are
/// width-preserving primitives required by the C-ABI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    Address,
    I32,
    I64,
    U8,
}

/// The closed set of call shapes every exported symbol conforms to.
/// Registration maps a `(return, params…)` layout pattern onto one of these;
/// anything outside the grammar is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Shape {
    /// `(ptr, len) -> void`
    Wipe,
    /// `(ptr, len) -> i32`
    Fill,
    /// `(out, in, in_len, key, iv, mode) -> i32`
    Block,
    /// `(out, in, in_len, key, nonce) -> i32`
    Stream,
    /// `(out, in, in_len, key, nonce, aad, aad_len) -> i32`
    Aead,
    /// `(sk_out, pk_out) -> i32`
    KeyGen,
    /// `(out, a, b) -> i32`: encapsulate, decapsulate and ECDH
    Triple,
    /// `(sig_out, msg, msg_len, sk) -> i32`
    Sign,
    /// `(msg, msg_len, sig, pk) -> i32`
    Verify,
}

impl Shape {
    /// The pattern-to-shape mapping is injective over the grammar.
    fn classify(ret: Option<Layout>, params: &[Layout]) -> Option<Shape> {
        use Layout::*;
        match (ret, params) {
            (None, [Address, I64]) => Some(Shape::Wipe),
            (Some(I32), [Address, I64]) => Some(Shape::Fill),
            (Some(I32), [Address, Address, I64, Address, Address, I32]) => Some(Shape::Block),
            (Some(I32), [Address, Address, I64, Address, Address]) => Some(Shape::Stream),
            (Some(I32), [Address, Address, I64, Address, Address, Address, I64]) => {
                Some(Shape::Aead)
            }
            (Some(I32), [Address, Address]) => Some(Shape::KeyGen),
            (Some(I32), [Address, Address, Address]) => Some(Shape::Triple),
            (Some(I32), [Address, Address, I64, Address]) => Some(Shape::Sign),
            (Some(I32), [Address, I64, Address, Address]) => Some(Shape::Verify),
            _ => None,
        }
    }
}

pub(crate) type WipeFn = unsafe extern "C" fn(*mut u8, i64);
pub(crate) type FillFn = unsafe extern "C" fn(*mut u8, i64) -> i32;
pub(crate) type BlockFn =
    unsafe extern "C" fn(*mut u8, *const u8, i64, *const u8, *const u8, i32) -> i32;
pub(crate) type StreamFn =
    unsafe extern "C" fn(*mut u8, *const u8, i64, *const u8, *const u8) -> i32;
pub(crate) type AeadFn =
    unsafe extern "C" fn(*mut u8, *const u8, i64, *const u8, *const u8, *const u8, i64) -> i32;
pub(crate) type KeyGenFn = unsafe extern "C" fn(*mut u8, *mut u8) -> i32;
pub(crate) type TripleFn = unsafe extern "C" fn(*mut u8, *mut u8, *const u8) -> i32;
pub(crate) type SignFn = unsafe extern "C" fn(*mut u8, *const u8, i64, *const u8) -> i32;
pub(crate) type VerifyFn = unsafe extern "C" fn(*const u8, i64, *const u8, *const u8) -> i32;

#[derive(Clone, Copy)]
pub(crate) enum NativeFn {
    Wipe(WipeFn),
    Fill(FillFn),
    Block(BlockFn),
    Stream(StreamFn),
    Aead(AeadFn),
    KeyGen(KeyGenFn),
    Triple(TripleFn),
    Sign(SignFn),
    Verify(VerifyFn),
}

impl NativeFn {
    fn shape(&self) -> Shape {
        match self {
            NativeFn::Wipe(_) => Shape::Wipe,
            NativeFn::Fill(_) => Shape::Fill,
            NativeFn::Block(_) => Shape::Block,
            NativeFn::Stream(_) => Shape::Stream,
            NativeFn::Aead(_) => Shape::Aead,
            NativeFn::KeyGen(_) => Shape::KeyGen,
            NativeFn::Triple(_) => Shape::Triple,
            NativeFn::Sign(_) => Shape::Sign,
            NativeFn::Verify(_) => Shape::Verify,
        }
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// A resolved, typed call handle. Cheap to clone; invocation is free-threaded.
#[derive(Clone)]
pub struct Handle {
    name: String,
    f: NativeFn,
}

macro_rules! accessor {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        pub(crate) fn $fn_name(&self) -> Result<$ty> {
            match self.f {
                NativeFn::$variant(f) => Ok(f),
                // A handle resolved under a different shape was effectively
                // never registered under this one.
                _ => Err(CryptoError::UnknownSymbol { symbol: self.name.clone() }),
            }
        }
    };
}

impl Handle {
    pub fn name(&self) -> &str {
        &self.name
    }

    accessor!(wipe, Wipe, WipeFn);
    accessor!(fill, Fill, FillFn);
    accessor!(block, Block, BlockFn);
    accessor!(stream, Stream, StreamFn);
    accessor!(aead, Aead, AeadFn);
    accessor!(keygen, KeyGen, KeyGenFn);
    accessor!(triple, Triple, TripleFn);
    accessor!(sign, Sign, SignFn);
    accessor!(verify, Verify, VerifyFn);
}

// ---------------------------------------------------------------------------
// Library binding
// ---------------------------------------------------------------------------

enum Binding {
    /// The core compiled into this crate.
    Builtin,
    /// An externally built core, mapped for the program lifetime.
    Dynamic(&'static libloading::Library),
}

pub struct NativeLibrary {
    binding: Binding,
    handles: RwLock<HashMap<String, Handle>>,
}

/// File stem of the native core shared library.
pub const CORE_LIBRARY_STEM: &str = "quantvault_core";

impl NativeLibrary {
    /// Resolve the process-wide binding. The first call decides the source
    /// (external library when `NATIVE_BIN_DIR` is set, built-in core
    /// otherwise) and pre-registers the mandatory `wipe` and `random_bytes`
    /// handles; subsequent calls return the same binding.
    pub fn bind() -> Result<&'static NativeLibrary> {
        static INSTANCE: OnceLock<std::result::Result<&'static NativeLibrary, CryptoError>> =
            OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                let lib = NativeLibrary::load(&LibraryConfig::from_env())?;
                let lib: &'static NativeLibrary = Box::leak(Box::new(lib));
                lib.add_void_handle("wipe", &[Layout::Address, Layout::I64])?;
                lib.add_returnable_handle(
                    "random_bytes",
                    Layout::I32,
                    &[Layout::Address, Layout::I64],
                )?;
                Ok(lib)
            })
            .clone()
    }

    fn load(cfg: &LibraryConfig) -> Result<NativeLibrary> {
        let binding = match &cfg.native_bin_dir {
            Some(dir) => {
                let path = dir.join(config::native_library_file(CORE_LIBRARY_STEM));
                // Leaked on purpose: the mapping must outlive every handle.
                let lib = unsafe { libloading::Library::new(&path) }.map_err(|_| {
                    CryptoError::LibraryNotFound { path: path.display().to_string() }
                })?;
                Binding::Dynamic(Box::leak(Box::new(lib)))
            }
            None => Binding::Builtin,
        };
        Ok(NativeLibrary { binding, handles: RwLock::new(HashMap::new()) })
    }

    /// Register a symbol returning no result.
    pub fn add_void_handle(&self, symbol: &str, params: &[Layout]) -> Result<()> {
        self.register(symbol, None, params)
    }

    /// Register a symbol returning a scalar.
    pub fn add_returnable_handle(
        &self,
        symbol: &str,
        ret: Layout,
        params: &[Layout],
    ) -> Result<()> {
        self.register(symbol, Some(ret), params)
    }

    fn register(&self, symbol: &str, ret: Option<Layout>, params: &[Layout]) -> Result<()> {
        let shape = Shape::classify(ret, params).ok_or_else(|| CryptoError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;

        {
            let handles = self.handles.read().unwrap_or_else(|e| e.into_inner());
            if let Some(existing) = handles.get(symbol) {
                // Bundles re-register shared symbols; same shape is a no-op.
                if existing.f.shape() == shape {
                    return Ok(());
                }
                return Err(CryptoError::SymbolNotFound { symbol: symbol.to_string() });
            }
        }

        let f = self.resolve(symbol, shape)?;
        let mut handles = self.handles.write().unwrap_or_else(|e| e.into_inner());
        handles
            .entry(symbol.to_string())
            .or_insert_with(|| Handle { name: symbol.to_string(), f });
        Ok(())
    }

    fn resolve(&self, symbol: &str, shape: Shape) -> Result<NativeFn> {
        match &self.binding {
            Binding::Builtin => builtin::lookup(symbol)
                .filter(|f| f.shape() == shape)
                .ok_or_else(|| CryptoError::SymbolNotFound { symbol: symbol.to_string() }),
            Binding::Dynamic(lib) => {
                let sym = symbol.as_bytes();
                let missing = || CryptoError::SymbolNotFound { symbol: symbol.to_string() };
                // Safety: the declared layout pattern fixed the ABI shape;
                // the external core is trusted to export matching symbols.
                unsafe {
                    Ok(match shape {
                        Shape::Wipe => {
                            NativeFn::Wipe(*lib.get::<WipeFn>(sym).map_err(|_| missing())?)
                        }
                        Shape::Fill => {
                            NativeFn::Fill(*lib.get::<FillFn>(sym).map_err(|_| missing())?)
                        }
                        Shape::Block => {
                            NativeFn::Block(*lib.get::<BlockFn>(sym).map_err(|_| missing())?)
                        }
                        Shape::Stream => {
                            NativeFn::Stream(*lib.get::<StreamFn>(sym).map_err(|_| missing())?)
                        }
                        Shape::Aead => {
                            NativeFn::Aead(*lib.get::<AeadFn>(sym).map_err(|_| missing())?)
                        }
                        Shape::KeyGen => {
                            NativeFn::KeyGen(*lib.get::<KeyGenFn>(sym).map_err(|_| missing())?)
                        }
                        Shape::Triple => {
                            NativeFn::Triple(*lib.get::<TripleFn>(sym).map_err(|_| missing())?)
                        }
                        Shape::Sign => {
                            NativeFn::Sign(*lib.get::<SignFn>(sym).map_err(|_| missing())?)
                        }
                        Shape::Verify => {
                            NativeFn::Verify(*lib.get::<VerifyFn>(sym).map_err(|_| missing())?)
                        }
                    })
                }
            }
        }
    }

    /// Fetch a previously registered handle.
    pub fn get(&self, symbol: &str) -> Result<Handle> {
        self.handles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(symbol)
            .cloned()
            .ok_or_else(|| CryptoError::UnknownSymbol { symbol: symbol.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Wipe entry point for the container subsystem
// ---------------------------------------------------------------------------

/// Zero `len` bytes at `ptr` through the native wipe primitive. Falls back to
/// an in-process volatile overwrite if the binding is unavailable; a close
/// must always wipe, whatever state the linker is in.
///
/// Safety: `ptr` must reference `len` writable bytes.
pub(crate) unsafe fn wipe_region(ptr: *mut u8, len: usize) {
    if len == 0 {
        return;
    }
    let handle = NativeLibrary::bind().and_then(|lib| lib.get("wipe")).and_then(|h| h.wipe());
    match handle {
        Ok(f) => f(ptr, len as i64),
        Err(_) => {
            use zeroize::Zeroize;
            std::slice::from_raw_parts_mut(ptr, len).zeroize();
        }
    }
}

/// Fill `len` bytes at `ptr` from the native CSPRNG.
///
/// Safety: `ptr` must reference `len` writable bytes.
pub(crate) unsafe fn fill_random(ptr: *mut u8, len: usize) -> Result<()> {
    let lib = NativeLibrary::bind()?;
    let f = lib.get("random_bytes")?.fill()?;
    let rc = f(ptr, len as i64);
    if rc == status::OK {
        Ok(())
    } else {
        Err(CryptoError::NativePanic { symbol: "random_bytes".into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_rejects_patterns_outside_grammar() {
        assert_eq!(Shape::classify(Some(Layout::I64), &[Layout::Address]), None);
        assert_eq!(Shape::classify(None, &[Layout::U8]), None);
    }

    #[test]
    fn classify_distinguishes_sign_from_verify() {
        use Layout::*;
        assert_eq!(
            Shape::classify(Some(I32), &[Address, Address, I64, Address]),
            Some(Shape::Sign)
        );
        assert_eq!(
            Shape::classify(Some(I32), &[Address, I64, Address, Address]),
            Some(Shape::Verify)
        );
    }

    #[test]
    fn unknown_symbol_lookup_fails() {
        let lib = NativeLibrary::load(&LibraryConfig::default()).unwrap();
        match lib.get("not_registered") {
            Err(CryptoError::UnknownSymbol { symbol }) => assert_eq!(symbol, "not_registered"),
            other => panic!("unexpected: {:?}", other.map(|h| h.name().to_string())),
        }
    }

    #[test]
    fn missing_external_library_is_reported() {
        let cfg = LibraryConfig {
            native_bin_dir: Some(std::path::PathBuf::from("/nonexistent/native")),
            home_dir: None,
        };
        match NativeLibrary::load(&cfg) {
            Err(CryptoError::LibraryNotFound { path }) => {
                assert!(path.contains("quantvault_core"))
            }
            _ => panic!("expected LibraryNotFound"),
        }
    }

    #[test]
    fn registration_is_idempotent() {
        let lib = NativeLibrary::load(&LibraryConfig::default()).unwrap();
        lib.add_void_handle("wipe", &[Layout::Address, Layout::I64]).unwrap();
        lib.add_void_handle("wipe", &[Layout::Address, Layout::I64]).unwrap();
        assert_eq!(lib.get("wipe").unwrap().name(), "wipe");
    }
}
