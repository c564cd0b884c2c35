use crate::cache::policy::ReplacementKind;
use crate::cache::{AddressParts, Cache, Victim, WritePolicy};
use crate::error::SimError;

// 256 B memory, 32 B cache, 8 B blocks, 2 ways -> 2 sets of 2 lines.
// Addresses 0, 16, 32, 48 all land in set 0 with tags 0..=3.
fn two_way(write: WritePolicy) -> Cache {
    Cache::new(32, 256, 8, 2, ReplacementKind::LRU, write, 0).unwrap()
}

fn block(fill: u8) -> Vec<u8> {
    vec![fill; 8]
}

#[test]
fn decompose_recombines_losslessly() {
    for ways in [1, 2, 4] {
        let cache = Cache::new(32, 256, 8, ways, ReplacementKind::LRU, WritePolicy::WriteBack, 0)
            .unwrap();
        let g = *cache.geometry();
        for addr in 0..256 {
            let AddressParts { tag, index, offset } = cache.decompose(addr).unwrap();
            let rebuilt = (tag << (g.index_bits + g.offset_bits)) | (index << g.offset_bits) | offset;
            assert_eq!(rebuilt, addr, "{ways}-way, addr {addr}");
            assert!(index < g.num_sets);
            assert_eq!(offset, cache.get_offset(addr));
        }
    }
}

#[test]
fn decompose_splits_fields() {
    let cache = two_way(WritePolicy::WriteBack);
    assert_eq!(
        cache.decompose(0b1011_1101).unwrap(),
        AddressParts {
            tag: 0b1011,
            index: 1,
            offset: 0b101
        }
    );
    assert_eq!(
        cache.decompose(256),
        Err(SimError::AddressOutOfRange {
            address: 256,
            limit: 256
        })
    );
}

#[test]
fn read_miss_has_no_side_effects() {
    let mut cache = two_way(WritePolicy::WriteBack);
    assert_eq!(cache.read(40).unwrap(), None);
    assert_eq!(cache.line_for(40).unwrap(), None);
    assert_eq!(cache.evictions(), 0);
}

#[test]
fn load_then_read_hits() {
    let mut cache = two_way(WritePolicy::WriteBack);
    let data: Vec<u8> = (0..8).collect();
    assert_eq!(cache.load(21, &data).unwrap(), None);
    assert_eq!(cache.read(16).unwrap(), Some(data.clone()));
    assert_eq!(cache.read(23).unwrap(), Some(data));
    let line = cache.line_for(20).unwrap().unwrap();
    assert!(line.valid);
    assert!(!line.dirty);
}

#[test]
fn load_rejects_wrong_block_size() {
    let mut cache = two_way(WritePolicy::WriteBack);
    assert_eq!(
        cache.load(0, &[0u8; 4]),
        Err(SimError::SizeMismatch {
            expected: 8,
            actual: 4
        })
    );
    assert_eq!(cache.read(0).unwrap(), None);
}

#[test]
fn write_miss_does_not_mutate() {
    let mut cache = two_way(WritePolicy::WriteBack);
    assert!(!cache.write(5, 0x77).unwrap());
    assert_eq!(cache.read(5).unwrap(), None);
}

#[test]
fn write_hit_marks_dirty_only_under_write_back() {
    let mut wb = two_way(WritePolicy::WriteBack);
    wb.load(0, &block(0)).unwrap();
    assert!(wb.write(3, 0x42).unwrap());
    let line = wb.line_for(0).unwrap().unwrap();
    assert!(line.dirty);
    assert_eq!(line.data[3], 0x42);

    let mut wt = two_way(WritePolicy::WriteThrough);
    wt.load(0, &block(0)).unwrap();
    assert!(wt.write(3, 0x42).unwrap());
    let line = wt.line_for(0).unwrap().unwrap();
    assert!(!line.dirty);
    assert_eq!(line.data[3], 0x42);
}

#[test]
fn invalid_ways_fill_before_eviction() {
    let mut cache = two_way(WritePolicy::WriteBack);
    assert_eq!(cache.load(0, &block(1)).unwrap(), None);
    assert_eq!(cache.load(16, &block(2)).unwrap(), None);
    assert_eq!(cache.evictions(), 0);
    // set 1 is still empty
    assert_eq!(cache.load(8, &block(3)).unwrap(), None);
    assert_eq!(cache.evictions(), 0);
}

#[test]
fn dirty_victim_is_handed_back() {
    let mut cache = two_way(WritePolicy::WriteBack);
    cache.load(0, &block(1)).unwrap();
    cache.load(16, &block(2)).unwrap();
    assert!(cache.write(0, 0xaa).unwrap());
    cache.read(16).unwrap();

    let victim = cache.load(32, &block(3)).unwrap();
    let mut expected = block(1);
    expected[0] = 0xaa;
    assert_eq!(
        victim,
        Some(Victim {
            address: 0,
            block: expected
        })
    );
    assert_eq!(cache.evictions(), 1);
    assert_eq!(cache.line_for(0).unwrap(), None);
    assert!(!cache.line_for(32).unwrap().unwrap().dirty);
}

#[test]
fn clean_victim_is_dropped_silently() {
    let mut cache = two_way(WritePolicy::WriteBack);
    cache.load(0, &block(1)).unwrap();
    cache.load(16, &block(2)).unwrap();
    assert_eq!(cache.load(32, &block(3)).unwrap(), None);
    assert_eq!(cache.evictions(), 1);
    assert_eq!(cache.line_for(0).unwrap(), None);
}

#[test]
fn victim_address_includes_set_index() {
    let mut cache = two_way(WritePolicy::WriteBack);
    // set 1: 8, 24, 40
    cache.load(8, &block(1)).unwrap();
    cache.write(9, 0x5).unwrap();
    cache.load(24, &block(2)).unwrap();
    let victim = cache.load(40, &block(3)).unwrap().unwrap();
    assert_eq!(victim.address, 8);
    assert_eq!(victim.block[1], 0x5);
}

#[test]
fn reloading_resident_block_keeps_cached_data() {
    let mut cache = two_way(WritePolicy::WriteBack);
    cache.load(0, &block(0)).unwrap();
    cache.write(2, 0x99).unwrap();
    assert_eq!(cache.load(0, &block(0)).unwrap(), None);
    let line = cache.line_for(0).unwrap().unwrap();
    assert_eq!(line.data[2], 0x99);
    assert!(line.dirty);
}

#[test]
fn no_duplicate_tags_in_a_set() {
    let mut cache = two_way(WritePolicy::WriteBack);
    for addr in [0, 16, 0, 32, 16, 0, 48, 0] {
        if cache.read(addr).unwrap().is_none() {
            cache.load(addr, &block(addr as u8)).unwrap();
        }
    }
    let dump = cache.print_section(0, 2).unwrap();
    let tags: Vec<&str> = dump
        .lines()
        .skip(2)
        .map(|row| row.split_whitespace().nth(5).unwrap())
        .collect();
    assert_eq!(tags.len(), 2);
    assert_ne!(tags[0], tags[1]);
}

#[test]
fn print_section_is_read_only() {
    let mut cache = two_way(WritePolicy::WriteBack);
    cache.load(0, &block(0xab)).unwrap();
    let before = cache.print_section(0, 4).unwrap();
    let again = cache.print_section(0, 4).unwrap();
    assert_eq!(before, again);
    assert!(before.contains("AB AB"));
    assert_eq!(before.lines().filter(|l| !l.is_empty()).count(), 5);

    assert_eq!(
        cache.print_section(3, 2),
        Err(SimError::SectionOutOfRange {
            start: 3,
            amount: 2,
            limit: 4
        })
    );
}
