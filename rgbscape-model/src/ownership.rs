//! Exclusive ownership slots
//!
//! Devices and LED groups belong to at most one surface at a time. Each
//! surface draws a unique [`OwnerId`] and claims the slot with a CAS, so two
//! surfaces racing for the same device cannot both win.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity of an owner (a surface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(NonZeroU64);

impl OwnerId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        let raw = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);
        // counter starts at 1 and would need 2^64 allocations to wrap
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Slot holding the current owner, if any
#[derive(Default)]
pub struct Ownership(AtomicU64);

impl Ownership {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Claim the slot. Fails with the current owner if already taken.
    pub fn claim(&self, owner: OwnerId) -> Result<(), OwnerId> {
        self.0
            .compare_exchange(0, owner.get(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|current| match NonZeroU64::new(current) {
                Some(id) => OwnerId(id),
                None => owner,
            })
    }

    /// Release the slot if held by `owner`. Returns true if it was released.
    pub fn release(&self, owner: OwnerId) -> bool {
        self.0
            .compare_exchange(owner.get(), 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn owner(&self) -> Option<OwnerId> {
        NonZeroU64::new(self.0.load(Ordering::Acquire)).map(OwnerId)
    }

    pub fn is_owned(&self) -> bool {
        self.owner().is_some()
    }

    pub fn is_owned_by(&self, owner: OwnerId) -> bool {
        self.owner() == Some(owner)
    }
}

impl fmt::Debug for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ownership").field(&self.owner()).finish()
    }
}
