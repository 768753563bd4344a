use std::fmt::{Display, Formatter};
use log::{debug, trace};
use serde::Serialize;
use crate::decoder::AddressDecoder;
use crate::geometry::{allocate, CacheError, CacheGeometry};
use crate::replacement_policies::{LeastRecentlyUsed, NoPolicy, ReplacementPolicy};
use crate::stats::AccessCounters;

/// A generic trait for cache models
///
/// Every organisation accounts for requests the same way; they only differ in how an address is
/// looked up and which block gets evicted, which lives in `access`
///
/// The trait assumes that aligning addresses to block boundaries is the responsibility of the
/// caller, the offset bits carry no information about hits or misses
pub trait CacheModel {
    /// Counts a read request, returning true on a cache hit, and false otherwise
    ///
    /// # Arguments
    ///
    /// * `address`: The address of the read, aligned to a block boundary
    ///
    /// returns: bool
    fn read_req(&mut self, address: u64) -> bool;

    /// Counts a write request, returning true on a cache hit, and false otherwise
    ///
    /// Writes allocate on a miss exactly like reads do. Nothing is marked dirty
    fn write_req(&mut self, address: u64) -> bool;

    /// Looks the address up and updates the blocks and replacement order, without counting it
    /// as a request
    fn access(&mut self, address: u64) -> Access;

    fn counters(&self) -> &AccessCounters;

    fn geometry(&self) -> &CacheGeometry;

    /// Gets the bit mask used to align an address to its block
    fn get_alignment_bit_mask(&self) -> u64;

    /// Gets the block size in bytes used by this cache
    fn get_line_size(&self) -> u64;

    /// Gets the number of blocks which have never been filled. Useful for analysing cache
    /// performance or debugging
    fn get_uninitialised_line_count(&self) -> usize;
}

/// One cache block. Starts out invalid and is overwritten in place on every miss that picks it
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Block {
    pub valid: bool,
    pub tag: u64,
}

/// What a single access did to the cache
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Access {
    Hit { slot: usize },
    /// The block at `slot` was refilled. `evicted` holds the tag it held before, if it was valid
    Miss { slot: usize, evicted: Option<u64> },
}

impl Access {
    pub fn is_hit(&self) -> bool {
        matches!(self, Access::Hit { .. })
    }

    pub fn slot(&self) -> usize {
        match self {
            Access::Hit { slot } | Access::Miss { slot, .. } => *slot,
        }
    }

    pub fn evicted(&self) -> Option<u64> {
        match self {
            Access::Hit { .. } => None,
            Access::Miss { evicted, .. } => *evicted,
        }
    }
}

/// A generic cache implementation, parameterised by a replacement policy
///
/// All three organisations are the same machine with different geometries: the set index picks
/// a contiguous run of `associativity` blocks, the tag is searched for within that run only, and
/// the policy picks a victim from that run on a miss. A fully associative cache is one set
/// spanning every block, a direct mapped cache is one block per set
///
/// We rely on monomorphisation and the inlining of the replacement policy functions to keep this
/// close to a specialised implementation for each organisation
pub struct Cache<R: ReplacementPolicy> {
    geometry: CacheGeometry,
    decoder: AddressDecoder,
    blocks: Vec<Block>,
    set_size: usize,
    replacement_policy: R,
    counters: AccessCounters,
}

impl<R: ReplacementPolicy> Cache<R> {
    /// Builds a cache with every block invalid
    ///
    /// The policy must have been sized for the same geometry
    pub fn new(geometry: CacheGeometry, policy: R) -> Result<Self, CacheError> {
        let block_count = addressable(geometry.block_count())?;
        Ok(Self {
            decoder: AddressDecoder::new(&geometry),
            blocks: allocate(block_count, geometry.block_count(), |_| Block::default())?,
            // Never more than block_count, which fits
            set_size: geometry.associativity() as usize,
            replacement_policy: policy,
            counters: AccessCounters::default(),
            geometry,
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn replacement_policy(&self) -> &R {
        &self.replacement_policy
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }
}

impl Cache<LeastRecentlyUsed> {
    /// A cache with one recency order per set
    pub fn with_lru(geometry: CacheGeometry) -> Result<Self, CacheError> {
        let num_sets = addressable(geometry.set_count())?;
        let policy = LeastRecentlyUsed::new(num_sets, geometry.associativity() as usize)?;
        Self::new(geometry, policy)
    }
}

fn addressable(count: u64) -> Result<usize, CacheError> {
    usize::try_from(count).map_err(|_| CacheError::Allocation { block_count: count })
}

impl<R: ReplacementPolicy> CacheModel for Cache<R> {
    fn read_req(&mut self, address: u64) -> bool {
        let hit = self.access(address).is_hit();
        self.counters.record_read(hit);
        hit
    }

    fn write_req(&mut self, address: u64) -> bool {
        let hit = self.access(address).is_hit();
        self.counters.record_write(hit);
        hit
    }

    fn access(&mut self, address: u64) -> Access {
        let (set, tag) = self.decoder.address_to_set_and_tag(address);
        let set = set as usize;
        let set_inclusive_lower_bound = set * self.set_size;
        let set_exclusive_upper_bound = set_inclusive_lower_bound + self.set_size;
        // Only search the relevant set
        let mut x = set_inclusive_lower_bound;
        while x < set_exclusive_upper_bound {
            let block = &self.blocks[x];
            if block.valid && block.tag == tag {
                self.replacement_policy.touch(x);
                return Access::Hit { slot: x };
            }
            x += 1;
        }
        // Miss, refill the victim then mark it as most recently used
        let slot = self.replacement_policy.victim(set_inclusive_lower_bound, set);
        let block = &mut self.blocks[slot];
        let evicted = block.valid.then_some(block.tag);
        if let Some(old) = evicted {
            trace!("set {set}: evicting tag {old:#x} from slot {slot} for tag {tag:#x}");
        }
        *block = Block { valid: true, tag };
        self.replacement_policy.touch(slot);
        Access::Miss { slot, evicted }
    }

    fn counters(&self) -> &AccessCounters {
        &self.counters
    }

    fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    fn get_alignment_bit_mask(&self) -> u64 {
        self.decoder.get_alignment_bit_mask()
    }

    fn get_line_size(&self) -> u64 {
        self.geometry.block_size()
    }

    fn get_uninitialised_line_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.valid).count()
    }
}

/// The cache organisations the library models
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub enum Organisation {
    FullyAssociative,
    DirectMapped,
    SetAssociative,
}

impl Display for Organisation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Organisation::FullyAssociative => "fully associative",
            Organisation::DirectMapped => "direct mapped",
            Organisation::SetAssociative => "set associative",
        })
    }
}

/// Enum for the 3 cache organisations provided by the library
///
/// Using trait objects reduces boilerplate, but we would be dispatching dynamically on every
/// event in the trace for every cache. Explicitly branching on the variants lets the compiler
/// reason about the concrete types and inline the replacement policy
pub enum GenericCache {
    FullyAssociative(Cache<LeastRecentlyUsed>),
    DirectMapped(Cache<NoPolicy>),
    SetAssociative(Cache<LeastRecentlyUsed>),
}

impl GenericCache {
    /// `block_count` blocks sharing a single recency order
    pub fn fully_associative(block_count: u64, block_size_exp: u32) -> Result<Self, CacheError> {
        let geometry = CacheGeometry::fully_associative(block_count, block_size_exp)?;
        debug!("Building fully associative cache: {geometry:?}");
        Ok(Self::FullyAssociative(Cache::with_lru(geometry)?))
    }

    /// `block_count` blocks, each address maps to exactly one of them
    pub fn direct_mapped(block_count: u64, block_size_exp: u32) -> Result<Self, CacheError> {
        let geometry = CacheGeometry::direct_mapped(block_count, block_size_exp)?;
        debug!("Building direct mapped cache: {geometry:?}");
        Ok(Self::DirectMapped(Cache::new(geometry, NoPolicy)?))
    }

    /// `1 << set_count_exp` sets of `associativity` blocks, each with its own recency order
    pub fn set_associative(set_count_exp: u32, block_size_exp: u32, associativity: u64) -> Result<Self, CacheError> {
        let geometry = CacheGeometry::set_associative(set_count_exp, block_size_exp, associativity)?;
        debug!("Building set associative cache: {geometry:?}");
        Ok(Self::SetAssociative(Cache::with_lru(geometry)?))
    }

    pub fn organisation(&self) -> Organisation {
        match self {
            GenericCache::FullyAssociative(_) => Organisation::FullyAssociative,
            GenericCache::DirectMapped(_) => Organisation::DirectMapped,
            GenericCache::SetAssociative(_) => Organisation::SetAssociative,
        }
    }

    /// The recency order, for the organisations which keep one
    pub fn replacement_order(&self) -> Option<&LeastRecentlyUsed> {
        match self {
            GenericCache::FullyAssociative(c) | GenericCache::SetAssociative(c) => Some(c.replacement_policy()),
            GenericCache::DirectMapped(_) => None,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        match self {
            GenericCache::FullyAssociative(c) | GenericCache::SetAssociative(c) => c.blocks(),
            GenericCache::DirectMapped(c) => c.blocks(),
        }
    }

    /// Aligns an address to the start of its block in this cache
    pub fn align(&self, address: u64) -> u64 {
        address & self.get_alignment_bit_mask()
    }
}

impl CacheModel for GenericCache {
    fn read_req(&mut self, address: u64) -> bool {
        match self {
            GenericCache::FullyAssociative(c) => c.read_req(address),
            GenericCache::DirectMapped(c) => c.read_req(address),
            GenericCache::SetAssociative(c) => c.read_req(address),
        }
    }

    fn write_req(&mut self, address: u64) -> bool {
        match self {
            GenericCache::FullyAssociative(c) => c.write_req(address),
            GenericCache::DirectMapped(c) => c.write_req(address),
            GenericCache::SetAssociative(c) => c.write_req(address),
        }
    }

    fn access(&mut self, address: u64) -> Access {
        match self {
            GenericCache::FullyAssociative(c) => c.access(address),
            GenericCache::DirectMapped(c) => c.access(address),
            GenericCache::SetAssociative(c) => c.access(address),
        }
    }

    fn counters(&self) -> &AccessCounters {
        match self {
            GenericCache::FullyAssociative(c) => c.counters(),
            GenericCache::DirectMapped(c) => c.counters(),
            GenericCache::SetAssociative(c) => c.counters(),
        }
    }

    fn geometry(&self) -> &CacheGeometry {
        match self {
            GenericCache::FullyAssociative(c) => c.geometry(),
            GenericCache::DirectMapped(c) => c.geometry(),
            GenericCache::SetAssociative(c) => c.geometry(),
        }
    }

    fn get_alignment_bit_mask(&self) -> u64 {
        match self {
            GenericCache::FullyAssociative(c) => c.get_alignment_bit_mask(),
            GenericCache::DirectMapped(c) => c.get_alignment_bit_mask(),
            GenericCache::SetAssociative(c) => c.get_alignment_bit_mask(),
        }
    }

    fn get_line_size(&self) -> u64 {
        match self {
            GenericCache::FullyAssociative(c) => c.get_line_size(),
            GenericCache::DirectMapped(c) => c.get_line_size(),
            GenericCache::SetAssociative(c) => c.get_line_size(),
        }
    }

    fn get_uninitialised_line_count(&self) -> usize {
        match self {
            GenericCache::FullyAssociative(c) => c.get_uninitialised_line_count(),
            GenericCache::DirectMapped(c) => c.get_uninitialised_line_count(),
            GenericCache::SetAssociative(c) => c.get_uninitialised_line_count(),
        }
    }
}
