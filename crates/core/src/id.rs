//! Identifiers for session entities.

use crate::error::{Error, Result};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a placed infrastructure module.
    ObjectId
);

entity_id!(
    /// Identifier of a route between two placed modules.
    RouteId
);

entity_id!(
    /// Identifier of a ruler measurement.
    MeasurementId
);

/// Monotonic id allocator owned by a session.
///
/// Ids are never reused within a session, even after deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Creates an allocator whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the id the next call to [`allocate`](Self::allocate) will hand out.
    pub fn peek(&self) -> u64 {
        self.next.max(1)
    }

    /// Returns the next raw id and advances the counter.
    ///
    /// Fails without advancing once the id space is used up.
    pub fn allocate(&mut self) -> Result<u64> {
        let id = self.peek();
        self.next = id.checked_add(1).ok_or_else(exhausted)?;
        Ok(id)
    }

    /// Makes sure future ids are strictly greater than `seen`.
    pub fn observe(&mut self, seen: u64) -> Result<()> {
        if seen >= self.next {
            self.next = seen.checked_add(1).ok_or_else(exhausted)?;
        }
        Ok(())
    }
}

fn exhausted() -> Error {
    Error::InvalidInput("id space exhausted".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), Ok(1));
        assert_eq!(ids.allocate(), Ok(2));
        ids.observe(10).unwrap();
        assert_eq!(ids.allocate(), Ok(11));
        ids.observe(3).unwrap();
        assert_eq!(ids.allocate(), Ok(12));
    }

    #[test]
    fn test_default_allocator_starts_at_one() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.peek(), 1);
        assert_eq!(ids.allocate(), Ok(1));
        assert_eq!(ids.peek(), 2);
    }

    #[test]
    fn test_exhausted_id_space() {
        let mut ids = IdAllocator::new();
        assert!(matches!(ids.observe(u64::MAX), Err(Error::InvalidInput(_))));
        assert_eq!(ids.peek(), 1);

        ids.observe(u64::MAX - 2).unwrap();
        assert_eq!(ids.allocate(), Ok(u64::MAX - 1));
        assert!(ids.allocate().is_err());
        assert_eq!(ids.peek(), u64::MAX);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ObjectId::new(42).to_string(), "#42");
        assert_eq!(RouteId::from(3).get(), 3);
    }
}
