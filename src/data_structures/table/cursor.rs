// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Mutation versioning and detached enumeration cursors.

use crate::error::{TableError, TableResult};

/// Structural mutation counter.
///
/// Bumped by every insert, update, removal, eviction and clear. A [`Cursor`] records
/// the value it was created under and refuses to step once it changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Version(u64);

impl Version {
    #[inline]
    pub(crate) fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn get(self) -> u64 {
        self.0
    }
}

/// Detached enumeration position over a single-writer container.
///
/// A cursor borrows nothing, so the container may be mutated while it is alive. The
/// next call to the container's `advance` then fails with
/// [`TableError::ConcurrentModification`] instead of yielding stale entries.
///
/// ```
/// use mauka_tables::data_structures::{LeiLinkedMap, TableConfig};
/// use mauka_tables::error::TableError;
///
/// let mut map = LeiLinkedMap::new(TableConfig::default()).unwrap();
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// let mut cursor = map.cursor();
/// assert_eq!(map.advance(&mut cursor).unwrap(), Some(("a", 1)));
/// map.insert("c", 3);
/// assert!(matches!(
///     map.advance(&mut cursor),
///     Err(TableError::ConcurrentModification { .. })
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct Cursor {
    version: u64,
    position: Option<usize>,
    remaining: usize,
}

impl Cursor {
    pub(crate) fn new(version: Version, start: Option<usize>, remaining: usize) -> Self {
        Self {
            version: version.get(),
            position: start,
            remaining,
        }
    }

    /// Fails if the owning container has been mutated since the cursor was created.
    pub(crate) fn check(&self, current: Version) -> TableResult<()> {
        if self.version != current.get() {
            return Err(TableError::ConcurrentModification {
                expected: self.version,
                found: current.get(),
            });
        }
        Ok(())
    }

    pub(crate) fn position(&self) -> Option<usize> {
        self.position
    }

    /// Moves to `next` after one entry was yielded.
    pub(crate) fn step(&mut self, next: Option<usize>) {
        self.position = next;
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub(crate) fn finish(&mut self) {
        self.position = None;
        self.remaining = 0;
    }

    /// Entries not yet yielded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether the cursor has run past the last entry.
    pub fn is_finished(&self) -> bool {
        self.remaining == 0 || self.position.is_none()
    }
}
