use std::fmt::{Display, Formatter};
use serde::Serialize;

/// Errors raised while building a cache. Nothing can go wrong once a cache exists, so these are
/// only ever seen at construction time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A parameter which must be non-zero was zero
    Zero(&'static str),
    /// A parameter which must be a power of two wasn't
    NotPowerOfTwo(&'static str, u64),
    /// The number of blocks doesn't match the set count and associativity
    Inconsistent { block_count: u64, set_count: u64, associativity: u64 },
    /// The total number of blocks doesn't fit in a u64
    Overflow { set_count: u64, associativity: u64 },
    /// The block offset and set index use up every address bit, leaving nothing for the tag
    AddressBitsExhausted { block_size_exp: u32, set_count_exp: u32 },
    /// The block and replacement storage couldn't be reserved
    Allocation { block_count: u64 },
}

impl CacheError {
    /// True for errors caused by the geometry itself rather than the host
    pub fn is_configuration(&self) -> bool {
        !matches!(self, CacheError::Allocation { .. })
    }
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Zero(param) => write!(f, "{param} must be greater than zero"),
            CacheError::NotPowerOfTwo(param, value) => write!(f, "{param} ({value}) must be a power of two"),
            CacheError::Inconsistent { block_count, set_count, associativity } => write!(
                f,
                "block count ({block_count}) must equal set count ({set_count}) * associativity ({associativity})"
            ),
            CacheError::Overflow { set_count, associativity } => write!(f, "{set_count} sets of {associativity} blocks overflows the block count"),
            CacheError::AddressBitsExhausted { block_size_exp, set_count_exp } => write!(
                f,
                "block size exponent ({block_size_exp}) plus set count exponent ({set_count_exp}) leaves no tag bits in a {}-bit address",
                u64::BITS
            ),
            CacheError::Allocation { block_count } => write!(f, "couldn't allocate storage for {block_count} cache blocks"),
        }
    }
}

impl std::error::Error for CacheError {}

/// The shape of a cache: how many blocks it holds, how big they are, and how they're grouped
/// into sets
///
/// A geometry can only be obtained through one of the validating constructors, so every
/// geometry in circulation satisfies `block_count == set_count * associativity` with power of two
/// block and set counts
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct CacheGeometry {
    block_count: u64,
    block_size_exp: u32,
    set_count_exp: u32,
    associativity: u64,
}

impl CacheGeometry {
    /// Validates an arbitrary geometry
    pub fn new(block_count: u64, block_size_exp: u32, set_count_exp: u32, associativity: u64) -> Result<Self, CacheError> {
        if block_count == 0 {
            return Err(CacheError::Zero("block count"));
        }
        if associativity == 0 {
            return Err(CacheError::Zero("associativity"));
        }
        if !block_count.is_power_of_two() {
            return Err(CacheError::NotPowerOfTwo("block count", block_count));
        }
        if block_size_exp.checked_add(set_count_exp).map_or(true, |bits| bits >= u64::BITS) {
            return Err(CacheError::AddressBitsExhausted { block_size_exp, set_count_exp });
        }
        let set_count = 1u64 << set_count_exp;
        if set_count.checked_mul(associativity) != Some(block_count) {
            return Err(CacheError::Inconsistent { block_count, set_count, associativity });
        }
        Ok(Self {
            block_count,
            block_size_exp,
            set_count_exp,
            associativity,
        })
    }

    /// One set spanning the whole cache
    pub fn fully_associative(block_count: u64, block_size_exp: u32) -> Result<Self, CacheError> {
        Self::new(block_count, block_size_exp, 0, block_count)
    }

    /// One block per set
    pub fn direct_mapped(block_count: u64, block_size_exp: u32) -> Result<Self, CacheError> {
        if block_count == 0 {
            return Err(CacheError::Zero("block count"));
        }
        if !block_count.is_power_of_two() {
            return Err(CacheError::NotPowerOfTwo("block count", block_count));
        }
        Self::new(block_count, block_size_exp, block_count.trailing_zeros(), 1)
    }

    /// `1 << set_count_exp` sets of `associativity` blocks each
    pub fn set_associative(set_count_exp: u32, block_size_exp: u32, associativity: u64) -> Result<Self, CacheError> {
        if associativity == 0 {
            return Err(CacheError::Zero("associativity"));
        }
        if !associativity.is_power_of_two() {
            return Err(CacheError::NotPowerOfTwo("associativity", associativity));
        }
        let set_count = 1u64
            .checked_shl(set_count_exp)
            .ok_or(CacheError::AddressBitsExhausted { block_size_exp, set_count_exp })?;
        let block_count = set_count
            .checked_mul(associativity)
            .ok_or(CacheError::Overflow { set_count, associativity })?;
        Self::new(block_count, block_size_exp, set_count_exp, associativity)
    }

    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    pub fn block_size_exp(&self) -> u32 {
        self.block_size_exp
    }

    /// Bytes per block
    pub fn block_size(&self) -> u64 {
        1 << self.block_size_exp
    }

    pub fn set_count_exp(&self) -> u32 {
        self.set_count_exp
    }

    pub fn set_count(&self) -> u64 {
        1 << self.set_count_exp
    }

    /// Ways per set
    pub fn associativity(&self) -> u64 {
        self.associativity
    }
}

/// Reserves exactly `len` elements up front, reporting failure instead of aborting
pub(crate) fn allocate<T>(len: usize, block_count: u64, init: impl FnMut(usize) -> T) -> Result<Vec<T>, CacheError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| CacheError::Allocation { block_count })?;
    buffer.extend((0..len).map(init));
    Ok(buffer)
}
