use serde::Deserialize;
use crate::cache::GenericCache;
use crate::geometry::CacheError;

pub const DEFAULT_BLOCK_COUNT: u64 = 512;
pub const DEFAULT_BLOCK_SIZE_EXP: u32 = 6;
pub const DEFAULT_SET_COUNT_EXP: u32 = 7;
pub const DEFAULT_ASSOCIATIVITY: u64 = 4;

/// A set of caches to run side by side over the same trace
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    pub caches: Vec<CacheConfig>,
}

/// A configuration for a single cache. Any omitted parameter takes its default
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub name: String,
    pub kind: CacheKindConfig,
    #[serde(default = "default_block_count")]
    pub block_count: u64,
    #[serde(default = "default_block_size_exp")]
    pub block_size_exp: u32,
    #[serde(default = "default_set_count_exp")]
    pub set_count_exp: u32,
    #[serde(default = "default_associativity")]
    pub associativity: u64,
}

/// The kind of cache - full, direct, or set
///
/// Fully associative and direct mapped caches are sized by `block_count`, set associative caches
/// by `set_count_exp` and `associativity`
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
pub enum CacheKindConfig {
    #[serde(alias = "full")]
    FullyAssociative,
    #[serde(alias = "direct")]
    DirectMapped,
    #[serde(alias = "set")]
    SetAssociative,
}

fn default_block_count() -> u64 {
    DEFAULT_BLOCK_COUNT
}

fn default_block_size_exp() -> u32 {
    DEFAULT_BLOCK_SIZE_EXP
}

fn default_set_count_exp() -> u32 {
    DEFAULT_SET_COUNT_EXP
}

fn default_associativity() -> u64 {
    DEFAULT_ASSOCIATIVITY
}

impl SimulationConfig {
    /// The classic comparison: a fully associative and a direct mapped cache of `block_count`
    /// blocks, plus a set associative cache of `1 << set_count_exp` sets of `associativity` ways
    pub fn comparison(block_count: u64, block_size_exp: u32, set_count_exp: u32, associativity: u64) -> Self {
        let cache = |name: &str, kind| CacheConfig {
            name: name.to_string(),
            kind,
            block_count,
            block_size_exp,
            set_count_exp,
            associativity,
        };
        Self {
            caches: vec![
                cache("Fully Associative Cache", CacheKindConfig::FullyAssociative),
                cache("Directly Mapped Cache", CacheKindConfig::DirectMapped),
                cache("Set-Associative Cache", CacheKindConfig::SetAssociative),
            ],
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::comparison(DEFAULT_BLOCK_COUNT, DEFAULT_BLOCK_SIZE_EXP, DEFAULT_SET_COUNT_EXP, DEFAULT_ASSOCIATIVITY)
    }
}

impl CacheConfig {
    /// Creates a new cache from a cache configuration, rejecting invalid geometries
    pub fn build(&self) -> Result<GenericCache, CacheError> {
        match self.kind {
            CacheKindConfig::FullyAssociative => GenericCache::fully_associative(self.block_count, self.block_size_exp),
            CacheKindConfig::DirectMapped => GenericCache::direct_mapped(self.block_count, self.block_size_exp),
            CacheKindConfig::SetAssociative => GenericCache::set_associative(self.set_count_exp, self.block_size_exp, self.associativity),
        }
    }
}
