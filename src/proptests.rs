use alloc::vec::Vec;

use proptest::prelude::*;

use crate::HashMap;

#[derive(Debug, Clone, Copy)]
enum Op {
    Insert(u8, u32),
    Remove(u8),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        4 => any::<u8>().prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    // Drives the map with arbitrary operation sequences, checking the
    // geometric invariants after every step and full agreement with the
    // standard map at the end.
    //
    // The lower bound is deliberately not asserted: a fresh 16-bucket table
    // with few entries sits below it, `clear` keeps capacity, and the
    // single halving per erase need not restore it.
    #[test]
    fn operation_sequences_match_the_model(
        ops in prop::collection::vec(op_strategy(), 0..300)
    ) {
        let mut map: HashMap<u8, u32> = HashMap::new();
        let mut model: std::collections::HashMap<u8, u32> = std::collections::HashMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let inserted = map.insert(k, v);
                    prop_assert_eq!(inserted, !model.contains_key(&k));
                    model.entry(k).or_insert(v);
                }
                Op::Remove(k) => {
                    prop_assert_eq!(map.remove(&k), model.remove(&k));
                }
                Op::Clear => {
                    map.clear();
                    model.clear();
                }
            }

            prop_assert!(map.capacity().is_power_of_two());
            prop_assert!(map.capacity() >= 1);
            prop_assert!(map.load_factor() <= map.upper_load_factor());
            prop_assert_eq!(map.len(), model.len());
        }

        // No duplicate keys and nothing missing, in either direction.
        for k in 0..=u8::MAX {
            prop_assert_eq!(map.get(&k), model.get(&k));
        }
        let mut visited = 0usize;
        for (k, v) in map.iter() {
            prop_assert_eq!(model.get(k), Some(v));
            visited += 1;
        }
        prop_assert_eq!(visited, model.len());
    }

    // Bulk loading parallel sequences behaves like inserting them one at a
    // time with overwrite.
    #[test]
    fn bulk_load_matches_sequential_overwrite(
        pairs in prop::collection::vec((any::<u8>(), any::<u32>()), 0..64)
    ) {
        let (keys, values): (Vec<u8>, Vec<u32>) = pairs.iter().copied().unzip();
        let map: HashMap<u8, u32> = HashMap::from_pairs(keys, values).unwrap();

        let mut model = std::collections::HashMap::new();
        for (k, v) in pairs {
            model.insert(k, v);
        }

        prop_assert_eq!(map.len(), model.len());
        prop_assert!(map.capacity().is_power_of_two());
        prop_assert!(map.load_factor() <= map.upper_load_factor());
        for (k, v) in &model {
            prop_assert_eq!(map.get(k), Some(v));
        }
    }
}
