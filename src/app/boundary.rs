//! Mutable copy boundary for the matrix renderer
//!
//! The matrix renderer reorders and edits its rows in place while batches
//! arrive as shared, immutable slices. Every record is copied before the hand
//! off. The copy is memoized on the identity of the batch allocation, so a
//! re-render with the same batch does not pay for another O(n) clone.

use std::sync::{Arc, Weak};

/// Element-wise copy of a batch with no shared identity with the input
pub fn to_mutable_copy<T: Clone>(batch: &[T]) -> Vec<T> {
    batch.to_vec()
}

/// Holds the copy made for the most recent batch
///
/// Identity is tracked through a [`Weak`] reference: the caller's records are
/// not kept alive by the holder, yet the allocation address cannot be reused
/// while the weak count is held, so pointer comparison stays sound.
#[derive(Debug)]
pub struct MutableCopy<T> {
    source: Weak<[T]>,
    copy: Vec<T>,
    copies_made: u64,
}

impl<T: Clone> MutableCopy<T> {
    pub fn new() -> Self {
        Self {
            source: detached(),
            copy: Vec::new(),
            copies_made: 0,
        }
    }

    /// Returns the mutable copy for `batch`, recomputing it only when the
    /// batch identity differs from the last call
    pub fn get(&mut self, batch: &Arc<[T]>) -> &mut [T] {
        if !self.is_current(batch) {
            self.copy = to_mutable_copy(batch);
            self.source = Arc::downgrade(batch);
            self.copies_made += 1;
            tracing::debug!(len = self.copy.len(), copies = self.copies_made, "copied transition batch");
        }
        &mut self.copy
    }

    /// True when the held copy was made from this exact allocation
    pub fn is_current(&self, batch: &Arc<[T]>) -> bool {
        std::ptr::addr_eq(self.source.as_ptr(), Arc::as_ptr(batch))
    }

    /// Drops the held copy unless it belongs to `batch`
    pub fn release_unless(&mut self, batch: &Arc<[T]>) {
        if !self.is_current(batch) {
            self.copy = Vec::new();
            self.source = detached();
        }
    }

    /// Number of copies made since construction
    pub fn copies_made(&self) -> u64 {
        self.copies_made
    }
}

fn detached<T>() -> Weak<[T]> {
    Weak::<[T; 0]>::new()
}

impl<T: Clone> Default for MutableCopy<T> {
    fn default() -> Self {
        Self::new()
    }
}
