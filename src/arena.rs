//! Allocation regime selection for container segments.
//!
//! `Confined` segments belong to the creating thread: data access from any
//! other thread is a caller bug and panics. `Shared` segments may be read
//! from any thread; the container lock provides the synchronization.
//! `Auto` resolves once per process from environment heuristics.

use std::sync::OnceLock;
use std::thread::{self, ThreadId};

/// Requested allocation regime for a new container segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArenaMode {
    /// Segment data is accessible only from the creating thread.
    Confined,
    /// Segment data is accessible from any thread.
    Shared,
    /// Pick `Shared` when a server-class runtime is detected, else `Confined`.
    #[default]
    Auto,
}

/// The regime a live segment actually runs under.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ResolvedArena {
    Confined(ThreadId),
    Shared,
}

impl ResolvedArena {
    /// Panics when a confined segment's data is touched off-thread.
    /// Close is exempt: wiping must succeed from whatever thread drops last.
    pub(crate) fn assert_data_access(&self) {
        if let ResolvedArena::Confined(owner) = self {
            assert!(
                thread::current().id() == *owner,
                "confined container accessed from a foreign thread"
            );
        }
    }

    pub(crate) fn is_shared(&self) -> bool {
        matches!(self, ResolvedArena::Shared)
    }
}

/// Environment markers set by server-class runtimes. The detection set is
/// deliberately small and closed; the `shared-arenas` build feature overrides
/// it entirely.
const SERVER_ENV_MARKERS: &[&str] = &[
    "TOKIO_WORKER_THREADS",
    "ACTIX_THREADPOOL",
    "ROCKET_PROFILE",
];

fn auto_resolves_shared() -> bool {
    static DETECTED: OnceLock<bool> = OnceLock::new();
    *DETECTED.get_or_init(|| {
        cfg!(feature = "shared-arenas")
            || SERVER_ENV_MARKERS.iter().any(|k| std::env::var_os(k).is_some())
    })
}

pub(crate) fn resolve(mode: ArenaMode) -> ResolvedArena {
    match mode {
        ArenaMode::Confined => ResolvedArena::Confined(thread::current().id()),
        ArenaMode::Shared => ResolvedArena::Shared,
        ArenaMode::Auto => {
            if auto_resolves_shared() {
                ResolvedArena::Shared
            } else {
                ResolvedArena::Confined(thread::current().id())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_modes_resolve_directly() {
        assert!(resolve(ArenaMode::Shared).is_shared());
        assert!(!resolve(ArenaMode::Confined).is_shared());
    }

    #[test]
    fn auto_always_resolves() {
        // Never errors, whatever the environment looks like.
        let _ = resolve(ArenaMode::Auto);
    }

    #[test]
    fn confined_allows_same_thread_access() {
        resolve(ArenaMode::Confined).assert_data_access();
    }
}
