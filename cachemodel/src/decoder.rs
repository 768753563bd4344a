use crate::geometry::CacheGeometry;

/// Splits addresses into block offset, set index and tag for one geometry
///
/// Masks and shifts are computed once up front, so decoding is a handful of bit operations
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressDecoder {
    block_size_exp: u32,
    tag_shift: u32,
    set_selection_bit_mask: u64,
    cache_alignment_bit_mask: u64,
}

impl AddressDecoder {
    pub fn new(geometry: &CacheGeometry) -> Self {
        let block_size_exp = geometry.block_size_exp();
        Self {
            block_size_exp,
            // Geometry validation guarantees this is below 64
            tag_shift: block_size_exp + geometry.set_count_exp(),
            set_selection_bit_mask: geometry.set_count() - 1,
            cache_alignment_bit_mask: !(geometry.block_size() - 1),
        }
    }

    /// The byte within the block. Irrelevant for hit/miss determination
    pub fn block_offset(&self, address: u64) -> u64 {
        address & !self.cache_alignment_bit_mask
    }

    /// Rounds an address down to the start of its block
    pub fn align(&self, address: u64) -> u64 {
        address & self.cache_alignment_bit_mask
    }

    /// Which set the address maps to. Always 0 for a fully associative cache
    pub fn set_index(&self, address: u64) -> u64 {
        (address >> self.block_size_exp) & self.set_selection_bit_mask
    }

    /// The bits above the set index
    pub fn tag(&self, address: u64) -> u64 {
        address >> self.tag_shift
    }

    /// Converts an address into a set and a tag in one go
    pub fn address_to_set_and_tag(&self, address: u64) -> (u64, u64) {
        (self.set_index(address), self.tag(address))
    }

    pub fn get_alignment_bit_mask(&self) -> u64 {
        self.cache_alignment_bit_mask
    }
}
