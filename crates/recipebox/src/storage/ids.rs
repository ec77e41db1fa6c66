//! Integer id allocation.
//!
//! Ids are handed out in increasing order and never reclaimed: deleting the
//! highest-numbered record leaves `next_id` where it was.

/// Issues unique integer ids for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    /// Next id to hand out; `None` once `i64::MAX` has been issued.
    next_id: Option<i64>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next_id: Some(1) }
    }
}

impl IdAllocator {
    /// Seed from the ids present in a loaded collection.
    ///
    /// `next_id` becomes `max(ids) + 1`, or `1` for an empty collection.
    #[must_use]
    pub fn seed(ids: impl IntoIterator<Item = i64>) -> Self {
        match ids.into_iter().max() {
            Some(max) => Self {
                next_id: max.checked_add(1),
            },
            None => Self::default(),
        }
    }

    /// The id the next call to [`allocate`](Self::allocate) would return.
    #[must_use]
    pub fn peek(&self) -> Option<i64> {
        self.next_id
    }

    /// Hand out the next id, or `None` if the id space is exhausted.
    pub fn allocate(&mut self) -> Option<i64> {
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        Some(id)
    }

    /// Record an explicitly chosen id so later allocations skip past it.
    pub fn observe(&mut self, id: i64) {
        if let Some(next) = self.next_id {
            if id >= next {
                self.next_id = id.checked_add(1);
            }
        }
    }
}
