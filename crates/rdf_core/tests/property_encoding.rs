use proptest::prelude::*;
use rdf_core::distinct::collect_partition;
use rdf_core::{
    collect_distinct_values, merge_distinct, CategoricalValueEncodings, DistinctValues,
    InputSchema, Partitioned, RecordEncoder,
};
use std::collections::BTreeSet;

const FEATURES: usize = 4;
const TARGET: usize = 3;

fn schema() -> InputSchema {
    let names = ["a", "b", "c", "y"].iter().map(|s| s.to_string()).collect();
    InputSchema::new(names, [0, 2, 3].into_iter().collect(), TARGET).unwrap()
}

fn token() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

fn record() -> impl Strategy<Value = Vec<String>> {
    (token(), -1000i32..1000, token(), token())
        .prop_map(|(a, b, c, y)| vec![a, b.to_string(), c, y])
}

fn distinct_values() -> impl Strategy<Value = DistinctValues> {
    prop::collection::btree_map(
        0usize..3,
        prop::collection::btree_set(token(), 0..6),
        0..3,
    )
}

proptest! {
    #[test]
    fn merge_is_associative(a in distinct_values(), b in distinct_values(), c in distinct_values()) {
        let left = merge_distinct(merge_distinct(a.clone(), b.clone()), c.clone());
        let right = merge_distinct(a, merge_distinct(b, c));
        prop_assert_eq!(left, right);
    }
}

proptest! {
    #[test]
    fn merge_is_commutative(a in distinct_values(), b in distinct_values()) {
        prop_assert_eq!(merge_distinct(a.clone(), b.clone()), merge_distinct(b, a));
    }
}

proptest! {
    #[test]
    fn encodings_ignore_partition_layout(
        records in prop::collection::vec(record(), 1..60),
        partitions in 1usize..8,
    ) {
        let schema = schema();
        let single = collect_distinct_values(&Partitioned::from_vec(records.clone(), 1), &schema).unwrap();
        let split = collect_distinct_values(&Partitioned::from_vec(records.clone(), partitions), &schema).unwrap();

        let mut reversed_records = records;
        reversed_records.reverse();
        let reversed = collect_distinct_values(&Partitioned::from_vec(reversed_records, partitions), &schema).unwrap();

        let single = CategoricalValueEncodings::build(single);
        prop_assert_eq!(&single, &CategoricalValueEncodings::build(split));
        prop_assert_eq!(&single, &CategoricalValueEncodings::build(reversed));
    }
}

proptest! {
    #[test]
    fn encodings_are_complete_bijections(records in prop::collection::vec(record(), 1..60)) {
        let schema = schema();
        let distinct = collect_partition(&records, &[0, 2, 3], FEATURES).unwrap();
        let encodings = CategoricalValueEncodings::build(distinct);

        for (index, encoding) in encodings.iter() {
            // every value seen maps to a key
            for record in &records {
                prop_assert!(encoding.encode(&record[index]).is_some());
            }
            // codes cover 0..len exactly once
            let codes: BTreeSet<usize> = encoding
                .values()
                .iter()
                .map(|value| encoding.encode(value).unwrap())
                .collect();
            prop_assert_eq!(codes, (0..encoding.len()).collect::<BTreeSet<_>>());
        }

        let encoder = RecordEncoder::new(&schema, &encodings);
        for record in &records {
            let point = encoder.encode(record).unwrap();
            prop_assert_eq!(point.features.len(), FEATURES - 1);
            prop_assert!(!point.label.is_nan());
            prop_assert!(point.label < encodings.target_class_count(&schema).unwrap() as f64);
        }
    }
}
