use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Returns a process-unique, monotonically increasing identifier.
///
/// Units and entities share this counter, so an id is never handed out twice
/// while the process lives, even across separate worlds.
fn next_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Identity of a behavior unit attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(u64);

/// Identity of an entity. An entity is itself a unit, so it converts into a [`UnitId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(u64);

impl UnitId {
    pub(crate) fn next() -> Self {
        Self(next_id())
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl EntityId {
    pub(crate) fn next() -> Self {
        Self(next_id())
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    /// The unit id carried by the entity's own hooks.
    pub fn as_unit(self) -> UnitId {
        UnitId(self.0)
    }
}

impl From<EntityId> for UnitId {
    fn from(id: EntityId) -> Self {
        id.as_unit()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Null-safe identity comparison: two `None`s are equal, `None` never equals `Some`.
pub fn same_unit(a: Option<UnitId>, b: Option<UnitId>) -> bool {
    a == b
}
