//! Fold parsed records from every chunk into one taxonomy tree

use taxonomist_domain::{ClassificationRecord, Taxonomy, TaxonomyError};

/// Merge records, in order, into a single taxonomy
///
/// Records sharing their first five labels collect into one leaf list in
/// input order. The same input always produces the same tree.
pub fn merge_records<'a, I>(records: I) -> Result<Taxonomy, TaxonomyError>
where
    I: IntoIterator<Item = &'a ClassificationRecord>,
{
    records
        .into_iter()
        .try_fold(Taxonomy::new(), |mut taxonomy, record| {
            taxonomy.insert(record)?;
            Ok(taxonomy)
        })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn record_strategy() -> impl Strategy<Value = ClassificationRecord> {
        (
            proptest::collection::vec(prop_oneof![Just(""), Just("A"), Just("B")], 0..7),
            proptest::option::of("[a-z]{1,6}"),
        )
            .prop_map(|(path, comment)| ClassificationRecord::from_path(&path, comment.as_deref()))
    }

    proptest! {
        /// Property: merging the same records twice yields identical trees
        #[test]
        fn test_merge_is_deterministic(records in proptest::collection::vec(record_strategy(), 0..50)) {
            let first = merge_records(&records).unwrap();
            let second = merge_records(&records).unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }

        /// Property: merging in two halves equals merging all at once
        #[test]
        fn test_merge_is_a_fold(records in proptest::collection::vec(record_strategy(), 0..50), split in 0usize..50) {
            let split = split.min(records.len());
            let (head, tail) = records.split_at(split);

            let whole = merge_records(&records).unwrap();
            let chained = merge_records(head.iter().chain(tail.iter())).unwrap();
            prop_assert_eq!(whole, chained);
        }
    }
}
