use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::binary_heap::BinaryHeap;

use super::{Handle, HandleIndex};

#[derive(PartialEq, Eq)]
struct InverseHandleIndex(HandleIndex);

impl PartialOrd for InverseHandleIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InverseHandleIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0)
    }
}

/// `HandlePool` manages the manipulations of a `Handle` collection, which are
/// created with a continuous `index` field. It also have the ability to find
/// out the current status of a specified `Handle`.
///
/// Index `0` is reserved, so the nil handle is never alive.
pub struct HandlePool {
    versions: Vec<HandleIndex>,
    frees: BinaryHeap<InverseHandleIndex>,
}

impl Default for HandlePool {
    fn default() -> Self {
        HandlePool::new()
    }
}

impl HandlePool {
    /// Constructs a new, empty `HandlePool`.
    pub fn new() -> HandlePool {
        HandlePool {
            versions: vec![0],
            frees: BinaryHeap::new(),
        }
    }

    /// Creates a unused `Handle`.
    pub fn create(&mut self) -> Handle {
        if let Some(InverseHandleIndex(index)) = self.frees.pop() {
            // If we have available free slots.
            let index = index as usize;
            self.versions[index] += 1;
            Handle::new(index as HandleIndex, self.versions[index])
        } else {
            // Or we just spawn a new index and corresponding version.
            self.versions.push(1);
            Handle::new(self.versions.len() as HandleIndex - 1, 1)
        }
    }

    /// Returns true if this `Handle` was created by `HandlePool`, and has not been
    /// freed yet.
    pub fn is_alive<T>(&self, handle: T) -> bool
    where
        T: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        self.is_alive_at(index) && (self.versions[index] == handle.version())
    }

    /// Recycles the `Handle` index, and mark its version as dead.
    pub fn free<T>(&mut self, handle: T) -> bool
    where
        T: Borrow<Handle>,
    {
        let handle = handle.borrow();
        if !self.is_alive(handle) {
            false
        } else {
            self.versions[handle.index() as usize] += 1;
            self.frees.push(InverseHandleIndex(handle.index()));
            true
        }
    }

    /// Returns the total number of alive handle in this `HandlePool`.
    #[inline]
    pub fn len(&self) -> usize {
        self.versions.len() - 1 - self.frees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn is_alive_at(&self, index: usize) -> bool {
        index > 0 && (index < self.versions.len()) && ((self.versions[index] & 0x1) == 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn create_and_free() {
        let mut pool = HandlePool::new();
        assert!(pool.is_empty());
        assert!(!pool.is_alive(Handle::nil()));

        let h1 = pool.create();
        let h2 = pool.create();
        assert!(h1.is_valid());
        assert_ne!(h1, h2);
        assert_eq!(pool.len(), 2);

        assert!(pool.free(h1));
        assert!(!pool.free(h1));
        assert!(!pool.is_alive(h1));
        assert!(pool.is_alive(h2));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn recycle() {
        let mut pool = HandlePool::new();
        let h1 = pool.create();
        pool.free(h1);

        let h2 = pool.create();
        assert_eq!(h1.index(), h2.index());
        assert_ne!(h1.version(), h2.version());
        assert!(!pool.is_alive(h1));
        assert!(pool.is_alive(h2));
    }
}
