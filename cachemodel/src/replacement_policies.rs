use crate::geometry::{allocate, CacheError};

/// A generic trait for replacement policies. Parameterises a Cache.
///
/// Slots are global indices into the cache's block array. Sets are contiguous, so set `s` owns
/// slots `s * ways .. (s + 1) * ways`
pub trait ReplacementPolicy {
    /// Marks a slot as the most recently used in its set
    ///
    /// Called on every hit, and on every miss once the new tag has been installed. Not applicable
    /// for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `slot`: The index of the cache block which was used
    ///
    /// returns: ()
    fn touch(&mut self, _slot: usize) {}

    /// Picks the slot to overwrite on a miss, without changing any state
    ///
    /// The cache follows up with a `touch` on the returned slot once it's been refilled, which is
    /// what moves it out of the victim position
    ///
    /// # Arguments
    ///
    /// * `set_lower_bound_index`: The first slot of the set. Already known by the cache, so passed
    /// in rather than recomputed
    /// * `set`: The cache set
    ///
    /// returns: usize
    fn victim(&self, set_lower_bound_index: usize, set: usize) -> usize;
}

#[derive(Default, Debug)]
/// NoPolicy is used for direct mapped caches. Each set holds exactly one block, so that block is
/// always the victim and there's no recency to track
///
/// As the generic cache implementation is monomorphised, the compiler can completely optimise this
/// away, removing the need for a separate implementation
pub struct NoPolicy;

impl ReplacementPolicy for NoPolicy {
    fn victim(&self, set_lower_bound_index: usize, _set: usize) -> usize {
        set_lower_bound_index
    }
}

const NIL: usize = usize::MAX;

/// Least Recently Used replacement policy
///
/// Each set keeps its slots in a doubly linked list ordered from least to most recently used.
/// The links live in flat arrays indexed by slot, allocated once, so both touching a slot and
/// finding the victim are O(1) regardless of associativity
///
/// Every set starts out in ascending slot order, which decides who gets evicted first from a cold
/// set
#[derive(Debug)]
pub struct LeastRecentlyUsed {
    ways: usize,
    prev: Vec<usize>,
    next: Vec<usize>,
    heads: Vec<usize>,
    tails: Vec<usize>,
}

impl LeastRecentlyUsed {
    pub fn new(num_sets: usize, ways: usize) -> Result<Self, CacheError> {
        let slots = num_sets * ways;
        let block_count = slots as u64;
        let first = |slot: usize| slot % ways == 0;
        let last = |slot: usize| slot % ways == ways - 1;
        Ok(Self {
            ways,
            prev: allocate(slots, block_count, |slot| if first(slot) { NIL } else { slot - 1 })?,
            next: allocate(slots, block_count, |slot| if last(slot) { NIL } else { slot + 1 })?,
            heads: allocate(num_sets, block_count, |set| set * ways)?,
            tails: allocate(num_sets, block_count, |set| set * ways + ways - 1)?,
        })
    }

    /// Walks a set from least to most recently used
    pub fn order(&self, set: usize) -> Order<'_> {
        Order {
            policy: self,
            cursor: self.heads[set],
        }
    }

    pub fn num_sets(&self) -> usize {
        self.heads.len()
    }

    pub fn ways(&self) -> usize {
        self.ways
    }
}

impl ReplacementPolicy for LeastRecentlyUsed {
    fn touch(&mut self, slot: usize) {
        let set = slot / self.ways;
        let tail = self.tails[set];
        if tail == slot {
            return;
        }
        // Not the tail, so there's always a successor
        let (before, after) = (self.prev[slot], self.next[slot]);
        if before == NIL {
            self.heads[set] = after;
        } else {
            self.next[before] = after;
        }
        self.prev[after] = before;

        self.next[tail] = slot;
        self.prev[slot] = tail;
        self.next[slot] = NIL;
        self.tails[set] = slot;
    }

    fn victim(&self, _set_lower_bound_index: usize, set: usize) -> usize {
        self.heads[set]
    }
}

/// Iterator over one set of a [`LeastRecentlyUsed`] policy, least recently used first
pub struct Order<'a> {
    policy: &'a LeastRecentlyUsed,
    cursor: usize,
}

impl<'a> Iterator for Order<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let slot = self.cursor;
        self.cursor = self.policy.next[slot];
        Some(slot)
    }
}
