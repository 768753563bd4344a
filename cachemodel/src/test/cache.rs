use crate::cache::{Access, CacheModel, GenericCache, Organisation};

fn hits(cache: &mut GenericCache, addresses: &[u64]) -> Vec<bool> {
    addresses.iter().map(|a| cache.read_req(*a)).collect()
}

fn all_organisations() -> Vec<GenericCache> {
    vec![
        GenericCache::fully_associative(8, 2).unwrap(),
        GenericCache::direct_mapped(8, 2).unwrap(),
        GenericCache::set_associative(2, 2, 2).unwrap(),
    ]
}

#[test]
fn fully_associative_evicts_least_recently_used() {
    let mut cache = GenericCache::fully_associative(2, 0).unwrap();
    assert_eq!(hits(&mut cache, &[0, 1, 0, 2]), vec![false, false, true, false]);
    // The hit on 0 left 1 as the least recently used, so 1 went
    assert!(cache.read_req(0));
    assert!(cache.read_req(2));
    assert!(!cache.read_req(1));
}

#[test]
fn fully_associative_reports_evicted_tag() {
    let mut cache = GenericCache::fully_associative(2, 0).unwrap();
    cache.access(0);
    cache.access(1);
    cache.access(0);
    assert_eq!(cache.access(2), Access::Miss { slot: 1, evicted: Some(1) });
}

#[test]
fn direct_mapped_conflicts_on_same_index() {
    let mut cache = GenericCache::direct_mapped(4, 0).unwrap();
    assert_eq!(hits(&mut cache, &[0, 4, 0]), vec![false, false, false]);
    // Other indices are untouched
    assert_eq!(cache.get_uninitialised_line_count(), 3);
}

#[test]
fn direct_mapped_slot_is_set_index() {
    let mut cache = GenericCache::direct_mapped(4, 0).unwrap();
    assert_eq!(cache.access(6), Access::Miss { slot: 2, evicted: None });
    assert_eq!(cache.access(2), Access::Miss { slot: 2, evicted: Some(1) });
    assert_eq!(cache.access(2), Access::Hit { slot: 2 });
}

#[test]
fn set_associative_evicts_within_set() {
    let mut cache = GenericCache::set_associative(1, 0, 2).unwrap();
    let tag_of_zero = 0 >> 1;
    assert!(!cache.read_req(0));
    assert!(!cache.read_req(2));
    let third = cache.access(4);
    assert_eq!(third, Access::Miss { slot: 0, evicted: Some(tag_of_zero) });
    assert!(!cache.read_req(0));
}

#[test]
fn set_associative_sets_are_independent() {
    let mut cache = GenericCache::set_associative(1, 0, 2).unwrap();
    // Fill set 0 then thrash set 1, set 0 must keep its contents
    hits(&mut cache, &[0, 2]);
    hits(&mut cache, &[1, 3, 5, 7, 9]);
    assert_eq!(hits(&mut cache, &[0, 2]), vec![true, true]);
}

#[test]
fn cold_set_fills_in_ascending_slot_order() {
    let mut cache = GenericCache::fully_associative(4, 0).unwrap();
    let slots: Vec<usize> = [10, 20, 30, 40].iter().map(|a| cache.access(*a).slot()).collect();
    assert_eq!(slots, vec![0, 1, 2, 3]);

    let mut cache = GenericCache::set_associative(1, 0, 4).unwrap();
    let slots: Vec<usize> = [1, 3, 5, 7].iter().map(|a| cache.access(*a).slot()).collect();
    assert_eq!(slots, vec![4, 5, 6, 7]);
}

#[test]
fn repeated_read_hits_for_every_organisation() {
    for mut cache in all_organisations() {
        for address in [0u64, 4, 0xdead_beec, u64::MAX & !3] {
            cache.read_req(address);
            assert!(cache.read_req(address), "{:?} missed {address:#x} twice", cache.organisation());
        }
    }
}

#[test]
fn lru_evicts_least_recently_touched_of_k() {
    let k = 4u64;
    let mut cache = GenericCache::fully_associative(k, 0).unwrap();
    for a in 0..k {
        cache.read_req(a);
    }
    // Touch everything but 2 again, making 2 the oldest
    for a in [0, 1, 3] {
        assert!(cache.read_req(a));
    }
    assert_eq!(cache.access(100).evicted(), Some(2));
    for a in [0, 1, 3, 100] {
        assert!(cache.read_req(a));
    }
    assert!(!cache.read_req(2));
}

#[test]
fn direct_mapped_with_one_block_matches_fully_associative() {
    let mut direct = GenericCache::direct_mapped(1, 0).unwrap();
    let mut full = GenericCache::fully_associative(1, 0).unwrap();
    let trace = [3u64, 3, 9, 3, 3, 0, 0, 0, 7, 9, 9, 1];
    for (i, address) in trace.iter().enumerate() {
        let (d, f) = if i % 3 == 0 {
            (direct.write_req(*address), full.write_req(*address))
        } else {
            (direct.read_req(*address), full.read_req(*address))
        };
        assert_eq!(d, f, "diverged at event {i}");
    }
    assert_eq!(direct.counters(), full.counters());
}

#[test]
fn writes_allocate() {
    for mut cache in all_organisations() {
        assert!(!cache.write_req(0x40));
        assert!(cache.read_req(0x40));
        let counters = cache.counters();
        assert_eq!((counters.write_requests, counters.write_hits), (1, 0));
        assert_eq!((counters.read_requests, counters.read_hits), (1, 1));
    }
}

#[test]
fn block_offset_is_ignored() {
    let mut cache = GenericCache::direct_mapped(4, 4).unwrap();
    assert!(!cache.read_req(0x100));
    assert!(cache.read_req(0x10f));
    assert!(!cache.read_req(0x110));
    assert_eq!(cache.align(0x10f), 0x100);
}

#[test]
fn organisation_matches_constructor() {
    let kinds: Vec<Organisation> = all_organisations().iter().map(|c| c.organisation()).collect();
    assert_eq!(kinds, vec![Organisation::FullyAssociative, Organisation::DirectMapped, Organisation::SetAssociative]);
    assert!(GenericCache::direct_mapped(8, 2).unwrap().replacement_order().is_none());
}
