//! Sensitive data containers.
//!
//! A `SecretContainer` owns a fixed-length off-heap byte region holding
//! secret material, plus an ordered list of child containers sharing its
//! lifetime envelope. Closing a container wipes every byte of the whole
//! tree through the native wipe primitive before any memory returns to the
//! allocator, exactly once, from whichever thread closes first. Dropping a
//! container closes it, so scope exit (normal or panicking) never leaks
//! an unwiped region.
//!
//! Close runs in three phases:
//!
//! 1. snapshot and clear the child list under the lock, marking the
//!    container as closing so no new children slip in behind the closer;
//! 2. cascade into the snapshot in reverse insertion order with the lock
//!    released, so a child whose close re-enters this container cannot
//!    deadlock;
//! 3. reacquire the lock, close any straggler children, wipe the segment
//!    and flip the alive flag.

use crate::arena::{self, ArenaMode, ResolvedArena};
use crate::error::{CryptoError, Result};
use crate::native;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Keys and blocks stay aligned for the native core.
const SEGMENT_ALIGN: usize = 16;

// ---------------------------------------------------------------------------
// Off-heap segment
// ---------------------------------------------------------------------------

/// A raw fixed-length allocation. Never a `Vec`: no reallocation, no
/// implicit copies, wiped on drop before the memory is returned.
struct Segment {
    ptr: NonNull<u8>,
    len: usize,
}

// The container lock serializes all access to the segment.
unsafe impl Send for Segment {}
unsafe impl Sync for Segment {}

impl Segment {
    fn alloc(len: usize) -> Result<Segment> {
        if len == 0 {
            return Err(CryptoError::AllocationFailed { bytes: 0 });
        }
        let layout = Layout::from_size_align(len, SEGMENT_ALIGN)
            .map_err(|_| CryptoError::AllocationFailed { bytes: len })?;
        let ptr = unsafe { alloc_zeroed(layout) };
        NonNull::new(ptr)
            .map(|ptr| Segment { ptr, len })
            .ok_or(CryptoError::AllocationFailed { bytes: len })
    }

    fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for Segment {
    fn drop(&mut self) {
        unsafe {
            // Wipe strictly before release, on every drop path.
            native::wipe_region(self.ptr.as_ptr(), self.len);
            dealloc(
                self.ptr.as_ptr(),
                Layout::from_size_align_unchecked(self.len, SEGMENT_ALIGN),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

struct Inner {
    /// `Some` while alive; taken (wiped and released) in close phase 3.
    segment: Option<Segment>,
    /// Ordered; closed in reverse insertion order.
    children: Vec<Arc<SecretContainer>>,
    /// Ingested source buffer, zeroed at construction, re-zeroed and
    /// dropped at close.
    shadow: Option<Vec<u8>>,
    /// Set in close phase 1; blocks new children for the rest of the close.
    closing: bool,
}

pub struct SecretContainer {
    len: usize,
    regime: ResolvedArena,
    alive: AtomicBool,
    inner: Mutex<Inner>,
}

impl SecretContainer {
    // -- construction -------------------------------------------------------

    /// Fresh zero-filled container of `len` bytes.
    pub fn new_empty(len: usize) -> Result<Arc<SecretContainer>> {
        Self::new_empty_in(len, ArenaMode::Auto)
    }

    pub fn new_empty_in(len: usize, mode: ArenaMode) -> Result<Arc<SecretContainer>> {
        Ok(Arc::new(Self::build(len, arena::resolve(mode), None, None)?))
    }

    /// Container seeded with a defensive copy of `bytes`; the caller keeps
    /// the source.
    pub fn new_from(bytes: &[u8]) -> Result<Arc<SecretContainer>> {
        Self::new_from_in(bytes, ArenaMode::Auto)
    }

    pub fn new_from_in(bytes: &[u8], mode: ArenaMode) -> Result<Arc<SecretContainer>> {
        Ok(Arc::new(Self::build(bytes.len(), arena::resolve(mode), Some(bytes), None)?))
    }

    /// Container that takes ownership of `bytes`: the contents move into
    /// the off-heap segment and the source buffer is zeroed immediately.
    /// The emptied buffer is retained and zeroed once more when the
    /// container closes.
    pub fn new_from_owned(bytes: Vec<u8>) -> Result<Arc<SecretContainer>> {
        Self::new_from_owned_in(bytes, ArenaMode::Auto)
    }

    pub fn new_from_owned_in(mut bytes: Vec<u8>, mode: ArenaMode) -> Result<Arc<SecretContainer>> {
        let built = Self::build(bytes.len(), arena::resolve(mode), Some(&bytes), None);
        bytes.zeroize();
        match built {
            Ok(mut container) => {
                container.inner.get_mut().unwrap_or_else(|e| e.into_inner()).shadow = Some(bytes);
                Ok(Arc::new(container))
            }
            Err(e) => Err(e),
        }
    }

    fn build(
        len: usize,
        regime: ResolvedArena,
        init: Option<&[u8]>,
        shadow: Option<Vec<u8>>,
    ) -> Result<SecretContainer> {
        let mut segment = Segment::alloc(len)?;
        if let Some(src) = init {
            segment.as_mut_slice().copy_from_slice(src);
        }
        Ok(SecretContainer {
            len,
            regime,
            alive: AtomicBool::new(true),
            inner: Mutex::new(Inner {
                segment: Some(segment),
                children: Vec::new(),
                shadow,
                closing: false,
            }),
        })
    }

    // -- hierarchy ----------------------------------------------------------

    /// Allocate a child sharing this container's lifetime envelope and
    /// allocation regime.
    pub fn add_child(&self, len: usize) -> Result<Arc<SecretContainer>> {
        self.attach(|regime| Self::build(len, regime, None, None).map(Arc::new))
    }

    /// Child seeded with a defensive copy of `bytes`.
    pub fn add_child_from(&self, bytes: &[u8]) -> Result<Arc<SecretContainer>> {
        self.attach(|regime| Self::build(bytes.len(), regime, Some(bytes), None).map(Arc::new))
    }

    /// Child that takes ownership of `bytes` (see [`Self::new_from_owned`]).
    pub fn add_child_from_owned(&self, mut bytes: Vec<u8>) -> Result<Arc<SecretContainer>> {
        self.attach(|regime| {
            let built = Self::build(bytes.len(), regime, Some(&bytes), None);
            bytes.zeroize();
            match built {
                Ok(mut container) => {
                    container.inner.get_mut().unwrap_or_else(|e| e.into_inner()).shadow =
                        Some(std::mem::take(&mut bytes));
                    Ok(Arc::new(container))
                }
                Err(e) => Err(e),
            }
        })
    }

    fn attach(
        &self,
        make: impl FnOnce(ResolvedArena) -> Result<Arc<SecretContainer>>,
    ) -> Result<Arc<SecretContainer>> {
        let mut inner = self.lock();
        if inner.segment.is_none() || inner.closing {
            return Err(CryptoError::AlreadyClosed);
        }
        let child = make(self.regime)?;
        inner.children.push(child.clone());
        Ok(child)
    }

    /// The i-th child, in insertion order.
    pub fn child(&self, index: usize) -> Result<Option<Arc<SecretContainer>>> {
        let inner = self.lock();
        if inner.segment.is_none() {
            return Err(CryptoError::AlreadyClosed);
        }
        Ok(inner.children.get(index).cloned())
    }

    pub fn child_count(&self) -> Result<usize> {
        let inner = self.lock();
        if inner.segment.is_none() {
            return Err(CryptoError::AlreadyClosed);
        }
        Ok(inner.children.len())
    }

    // -- data access --------------------------------------------------------

    /// Read/write view of the segment. The view holds the container lock,
    /// so a concurrent close waits for it; conversely, a view requested
    /// after close fails rather than reading stale bytes. Hold it only for
    /// the duration of a single cryptographic call.
    pub fn segment_view(&self) -> Result<SegmentView<'_>> {
        self.regime.assert_data_access();
        let guard = self.lock();
        if guard.segment.is_none() {
            return Err(CryptoError::AlreadyClosed);
        }
        Ok(SegmentView { guard })
    }

    /// One-time copy of the segment into a caller-heap buffer.
    ///
    /// This is a confidentiality downgrade: the returned bytes live on the
    /// ordinary heap, outside the wipe guarantees of this container. Wrap
    /// the result in [`zeroize::Zeroizing`] if it must not outlive its use.
    pub fn export_to_heap(&self) -> Result<Vec<u8>> {
        self.regime.assert_data_access();
        let guard = self.lock();
        match guard.segment.as_ref() {
            Some(segment) => {
                tracing::debug!(bytes = self.len, "exporting secret region to heap");
                Ok(segment.as_slice().to_vec())
            }
            None => Err(CryptoError::AlreadyClosed),
        }
    }

    /// Constant-time content equality between two live containers.
    pub fn ct_eq(&self, other: &SecretContainer) -> Result<bool> {
        if self.len != other.len {
            return Ok(false);
        }
        if std::ptr::eq(self, other) {
            return if self.is_alive() { Ok(true) } else { Err(CryptoError::AlreadyClosed) };
        }
        let a = self.segment_view()?;
        let b = other.segment_view()?;
        Ok(a.ct_eq(&*b).into())
    }

    pub fn byte_length(&self) -> usize {
        self.len
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn is_thread_confined(&self) -> bool {
        !self.regime.is_shared()
    }

    // -- close --------------------------------------------------------------

    /// Wipe this container and every transitive child, then release the
    /// segments. Idempotent; never fails; safe to race from any number of
    /// threads; exactly one of them performs the wipe.
    pub fn close(&self) {
        // Phase 1: snapshot under lock.
        let snapshot = {
            let mut inner = self.lock();
            if inner.segment.is_none() && inner.children.is_empty() {
                return;
            }
            inner.closing = true;
            std::mem::take(&mut inner.children)
        };

        // Phase 2: cascade outside the lock, reverse insertion order, so a
        // child whose close re-enters this container cannot deadlock.
        for child in snapshot.iter().rev() {
            child.close();
        }
        drop(snapshot);

        // Phase 3: final wipe under lock.
        let mut inner = self.lock();
        let stragglers = std::mem::take(&mut inner.children);
        for child in stragglers.iter().rev() {
            child.close();
        }
        if let Some(segment) = inner.segment.take() {
            // Segment::drop wipes before the memory is released.
            drop(segment);
            if let Some(shadow) = inner.shadow.as_mut() {
                shadow.zeroize();
            }
            inner.shadow = None;
            self.alive.store(false, Ordering::Release);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking holder must not prevent the wipe.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for SecretContainer {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SecretContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never the contents.
        f.debug_struct("SecretContainer")
            .field("len", &self.len)
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Lock-holding view over a live segment.
pub struct SegmentView<'a> {
    guard: MutexGuard<'a, Inner>,
}

impl Deref for SegmentView<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // Present by construction: the guard was taken with the segment
        // in place and close cannot run while it is held.
        self.guard.segment.as_ref().expect("segment present while view exists").as_slice()
    }
}

impl DerefMut for SegmentView<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.guard
            .segment
            .as_mut()
            .expect("segment present while view exists")
            .as_mut_slice()
    }
}

impl SegmentView<'_> {
    /// Segment address for marshalling. Only the native linker turns this
    /// into a call argument.
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.deref().as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.deref_mut().as_mut_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_allocation_fails() {
        match SecretContainer::new_empty(0) {
            Err(CryptoError::AllocationFailed { bytes: 0 }) => {}
            other => panic!("unexpected: {:?}", other.map(|c| c.byte_length())),
        }
    }

    #[test]
    fn new_container_is_zero_filled() {
        let c = SecretContainer::new_empty(64).unwrap();
        assert!(c.segment_view().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn segment_wipes_before_release() {
        // Observe the wipe through the segment directly, before the
        // allocation is handed back.
        let mut seg = Segment::alloc(32).unwrap();
        seg.as_mut_slice().fill(0xAB);
        let ptr = seg.ptr.as_ptr();
        unsafe { native::wipe_region(ptr, 32) };
        assert!(seg.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn owned_source_is_zeroed_at_construction() {
        let src = vec![0x5Au8; 40];
        let c = SecretContainer::new_from_owned(src).unwrap();
        assert_eq!(&c.segment_view().unwrap()[..4], &[0x5A; 4]);
        // The retained shadow buffer must already be clear.
        let inner = c.lock();
        assert!(inner.shadow.as_ref().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn view_is_writable() {
        let c = SecretContainer::new_empty(16).unwrap();
        c.segment_view().unwrap().fill(0xCD);
        assert_eq!(c.segment_view().unwrap()[15], 0xCD);
    }

    #[test]
    fn ct_eq_compares_contents() {
        let a = SecretContainer::new_from(&[1, 2, 3, 4]).unwrap();
        let b = SecretContainer::new_from(&[1, 2, 3, 4]).unwrap();
        let c = SecretContainer::new_from(&[1, 2, 3, 5]).unwrap();
        assert!(a.ct_eq(&b).unwrap());
        assert!(!a.ct_eq(&c).unwrap());
    }

    #[test]
    fn children_share_the_confinement_regime() {
        let p = SecretContainer::new_empty_in(32, ArenaMode::Confined).unwrap();
        let c = p.add_child(16).unwrap();
        assert!(c.is_thread_confined());
        let p = SecretContainer::new_empty_in(32, ArenaMode::Shared).unwrap();
        let c = p.add_child(16).unwrap();
        assert!(!c.is_thread_confined());
    }
}
