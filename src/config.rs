//! Environment-driven configuration.
//!
//! `NATIVE_BIN_DIR`: directory containing an externally built native core
//! shared library. When unset, the built-in core compiled into this crate
//! is used instead.
//!
//! `HOME_DIR`: base directory for library-owned resources (key files,
//! policy documents) that sit outside the cryptographic core itself.

use std::env;
use std::path::PathBuf;

pub const NATIVE_BIN_DIR: &str = "NATIVE_BIN_DIR";
pub const HOME_DIR: &str = "HOME_DIR";

#[derive(Clone, Debug, Default)]
pub struct LibraryConfig {
    pub native_bin_dir: Option<PathBuf>,
    pub home_dir: Option<PathBuf>,
}

impl LibraryConfig {
    pub fn from_env() -> Self {
        Self {
            native_bin_dir: env::var_os(NATIVE_BIN_DIR).map(PathBuf::from),
            home_dir: env::var_os(HOME_DIR).map(PathBuf::from),
        }
    }
}

/// Platform file name for the native core library, e.g. `libquantvault_core.so`.
pub(crate) fn native_library_file(stem: &str) -> String {
    format!("{}{}{}", env::consts::DLL_PREFIX, stem, env::consts::DLL_SUFFIX)
}
