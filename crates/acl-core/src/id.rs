use std::sync::atomic::{AtomicU32, Ordering};

use crate::entity::ObjectId;
use crate::error::{AclError, AclResult};

/// Monotonic source of [`ObjectId`]s.
///
/// IDs start at 1 and are never reused. `u32::MAX` marks exhaustion, so one
/// allocator hands out at most `2^32 - 2` IDs. The counter is atomic: compiles
/// running on different threads against the same allocator never receive the
/// same ID.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU32,
}

static GLOBAL: IdAllocator = IdAllocator::new();

impl IdAllocator {
    /// Number of IDs a fresh allocator can hand out.
    pub const CAPACITY: u64 = u32::MAX as u64 - 1;

    /// A fresh allocator whose first ID is 1.
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// An allocator whose next ID is `first`. A `first` of 0 is bumped to 1.
    pub const fn starting_at(first: u32) -> Self {
        let first = if first == 0 { 1 } else { first };
        Self {
            next: AtomicU32::new(first),
        }
    }

    /// The process-wide allocator.
    pub fn global() -> &'static IdAllocator {
        &GLOBAL
    }

    /// Take the next ID.
    pub fn allocate(&self) -> AclResult<ObjectId> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current != u32::MAX).then(|| current + 1)
            })
            .map(ObjectId)
            .map_err(|_| AclError::ResourceExhausted {
                limit: Self::CAPACITY,
            })
    }

    /// Reserve `count` consecutive IDs in one step.
    ///
    /// Either the whole block is taken or, when it does not fit below the
    /// exhaustion sentinel, nothing is and the allocator is left unchanged.
    pub fn allocate_block(&self, count: usize) -> AclResult<impl Iterator<Item = ObjectId>> {
        let exhausted = AclError::ResourceExhausted {
            limit: Self::CAPACITY,
        };
        let count = u32::try_from(count).map_err(|_| exhausted.clone())?;
        let first = self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_add(count)
            })
            .map_err(|_| exhausted)?;
        Ok((first..first + count).map(ObjectId))
    }

    /// The ID the next call to [`allocate`](Self::allocate) would return.
    pub fn peek(&self) -> Option<ObjectId> {
        let next = self.next.load(Ordering::SeqCst);
        (next != u32::MAX).then_some(ObjectId(next))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn first_id_is_one() {
        let ids = IdAllocator::new();
        assert_eq!(ids.allocate().unwrap(), ObjectId(1));
        assert_eq!(ids.allocate().unwrap(), ObjectId(2));
    }

    #[test]
    fn zero_is_never_handed_out() {
        let ids = IdAllocator::starting_at(0);
        assert_eq!(ids.allocate().unwrap(), ObjectId(1));
    }

    #[test]
    fn exhaustion_is_an_error_not_a_wrap() {
        let ids = IdAllocator::starting_at(u32::MAX - 1);
        assert_eq!(ids.allocate().unwrap(), ObjectId(u32::MAX - 1));
        assert_eq!(ids.peek(), None);
        let err = ids.allocate().unwrap_err();
        assert!(matches!(err, AclError::ResourceExhausted { .. }));
        // Stays exhausted.
        assert!(ids.allocate().is_err());
    }

    #[test]
    fn blocks_are_consecutive() {
        let ids = IdAllocator::new();
        ids.allocate().unwrap();
        let block: Vec<_> = ids.allocate_block(3).unwrap().collect();
        assert_eq!(block, vec![ObjectId(2), ObjectId(3), ObjectId(4)]);
        assert_eq!(ids.allocate().unwrap(), ObjectId(5));
        assert_eq!(ids.allocate_block(0).unwrap().count(), 0);
    }

    #[test]
    fn oversized_block_takes_nothing() {
        let ids = IdAllocator::starting_at(u32::MAX - 2);
        assert!(matches!(
            ids.allocate_block(3),
            Err(AclError::ResourceExhausted { .. })
        ));
        assert_eq!(ids.peek(), Some(ObjectId(u32::MAX - 2)));

        let block: Vec<_> = ids.allocate_block(2).unwrap().collect();
        assert_eq!(block, vec![ObjectId(u32::MAX - 2), ObjectId(u32::MAX - 1)]);
        assert_eq!(ids.peek(), None);
    }

    #[test]
    fn concurrent_allocation_is_unique() {
        let ids = Arc::new(IdAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || {
                    (0..1000)
                        .map(|_| ids.allocate().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
