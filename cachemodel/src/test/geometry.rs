use crate::decoder::AddressDecoder;
use crate::geometry::{CacheError, CacheGeometry};

#[test]
fn block_count_is_sets_times_ways() {
    let geometries = [
        CacheGeometry::fully_associative(512, 6).unwrap(),
        CacheGeometry::direct_mapped(512, 6).unwrap(),
        CacheGeometry::set_associative(7, 6, 4).unwrap(),
        CacheGeometry::set_associative(0, 0, 1).unwrap(),
    ];
    for g in geometries {
        assert_eq!(g.block_count(), g.set_count() * g.associativity(), "{g:?}");
    }
}

#[test]
fn organisation_shapes() {
    let full = CacheGeometry::fully_associative(16, 3).unwrap();
    assert_eq!((full.set_count(), full.associativity()), (1, 16));
    let direct = CacheGeometry::direct_mapped(16, 3).unwrap();
    assert_eq!((direct.set_count_exp(), direct.associativity()), (4, 1));
    let set = CacheGeometry::set_associative(2, 3, 4).unwrap();
    assert_eq!((set.block_count(), set.block_size()), (16, 8));
}

#[test]
fn rejects_invalid_geometries() {
    assert_eq!(CacheGeometry::fully_associative(0, 6), Err(CacheError::Zero("block count")));
    assert_eq!(CacheGeometry::direct_mapped(0, 6), Err(CacheError::Zero("block count")));
    assert_eq!(CacheGeometry::set_associative(3, 6, 0), Err(CacheError::Zero("associativity")));
    assert_eq!(CacheGeometry::fully_associative(24, 6), Err(CacheError::NotPowerOfTwo("block count", 24)));
    assert_eq!(CacheGeometry::direct_mapped(100, 6), Err(CacheError::NotPowerOfTwo("block count", 100)));
    assert_eq!(CacheGeometry::set_associative(3, 6, 3), Err(CacheError::NotPowerOfTwo("associativity", 3)));
    assert_eq!(
        CacheGeometry::new(512, 6, 7, 2),
        Err(CacheError::Inconsistent { block_count: 512, set_count: 128, associativity: 2 })
    );
    assert_eq!(
        CacheGeometry::set_associative(60, 6, 1),
        Err(CacheError::AddressBitsExhausted { block_size_exp: 6, set_count_exp: 60 })
    );
    assert_eq!(
        CacheGeometry::set_associative(64, 0, 1),
        Err(CacheError::AddressBitsExhausted { block_size_exp: 0, set_count_exp: 64 })
    );
    assert_eq!(
        CacheGeometry::set_associative(62, 0, 8),
        Err(CacheError::Overflow { set_count: 1 << 62, associativity: 8 })
    );
    assert!(CacheGeometry::fully_associative(1, 64).is_err());
}

#[test]
fn only_allocation_is_not_a_configuration_error() {
    assert!(CacheError::Zero("block count").is_configuration());
    assert!(!CacheError::Allocation { block_count: 1 << 40 }.is_configuration());
}

#[test]
fn decodes_set_and_tag() {
    // 4 sets of 16 byte blocks
    let decoder = AddressDecoder::new(&CacheGeometry::set_associative(2, 4, 2).unwrap());
    let address = 0b1011_10_0110;
    assert_eq!(decoder.block_offset(address), 0b0110);
    assert_eq!(decoder.set_index(address), 0b10);
    assert_eq!(decoder.tag(address), 0b1011);
    assert_eq!(decoder.align(address), 0b1011_10_0000);
    assert_eq!(decoder.address_to_set_and_tag(address), (0b10, 0b1011));
}

#[test]
fn fully_associative_has_single_set() {
    let decoder = AddressDecoder::new(&CacheGeometry::fully_associative(64, 6).unwrap());
    for address in [0u64, 0x40, 0xffff_ffc0, u64::MAX] {
        assert_eq!(decoder.set_index(address), 0);
        assert_eq!(decoder.tag(address), address >> 6);
    }
}

#[test]
fn widest_geometry_keeps_one_tag_bit() {
    let decoder = AddressDecoder::new(&CacheGeometry::new(1, 63, 0, 1).unwrap());
    assert_eq!(decoder.tag(u64::MAX), 1);
    assert_eq!(decoder.set_index(u64::MAX), 0);
}
