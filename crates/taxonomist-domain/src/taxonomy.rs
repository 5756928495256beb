//! Taxonomy tree module - the merged, fixed-depth hierarchy
//!
//! The tree nests the first [`NESTED_DEPTH`] levels of every record. Each node is
//! either a branch keyed by label or a leaf holding the payloads of every record
//! that shares the same label path. A leaf serializes as `{"items": [...]}`.

use crate::record::ClassificationRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Number of levels used as keys when nesting the tree
pub const NESTED_DEPTH: usize = 5;

/// Errors raised while building a taxonomy tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    /// A path tried to descend through a leaf or stop at a branch
    #[error("Taxonomy shape conflict at label '{label}'")]
    ShapeConflict {
        /// Label where the conflict was found
        label: String,
    },

    /// An insert was attempted with no labels at all
    #[error("Cannot insert an empty label path")]
    EmptyPath,
}

/// Payload stored at the bottom of the tree for each record
///
/// Levels 6 and 7 are requested from the model but are not used as keys, so they
/// travel with the comment and are only serialized when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafEntry {
    /// Free-text comment from the record
    #[serde(rename = "Comment")]
    pub comment: Option<String>,

    /// Sixth level label, if supplied
    #[serde(rename = "Level 6", skip_serializing_if = "Option::is_none")]
    pub level6: Option<String>,

    /// Seventh level label, if supplied
    #[serde(rename = "Level 7", skip_serializing_if = "Option::is_none")]
    pub level7: Option<String>,
}

impl From<&ClassificationRecord> for LeafEntry {
    fn from(record: &ClassificationRecord) -> Self {
        Self {
            comment: record.comment().map(str::to_string),
            level6: record.level(5).as_str().map(str::to_string),
            level7: record.level(6).as_str().map(str::to_string),
        }
    }
}

/// A node in the merged taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TaxonomyNode {
    /// Children keyed by label (absent labels use `"null"`)
    Branch(BTreeMap<String, TaxonomyNode>),
    /// Payloads of every record ending at this path, in first-seen order
    Leaf {
        /// Leaf payloads
        items: Vec<LeafEntry>,
    },
}

impl TaxonomyNode {
    /// Child node for a label, if this is a branch that has one
    pub fn child(&self, label: &str) -> Option<&TaxonomyNode> {
        match self {
            TaxonomyNode::Branch(children) => children.get(label),
            TaxonomyNode::Leaf { .. } => None,
        }
    }

    /// Leaf payloads, if this is a leaf
    pub fn items(&self) -> Option<&[LeafEntry]> {
        match self {
            TaxonomyNode::Leaf { items } => Some(items),
            TaxonomyNode::Branch(_) => None,
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            TaxonomyNode::Branch(children) => children.values().map(TaxonomyNode::leaf_count).sum(),
            TaxonomyNode::Leaf { items } => items.len(),
        }
    }
}

/// The merged taxonomy tree
///
/// # Examples
///
/// ```
/// use taxonomist_domain::{ClassificationRecord, Taxonomy};
///
/// let mut taxonomy = Taxonomy::new();
/// taxonomy.insert(&ClassificationRecord::from_path(&["A", "B"], Some("c1"))).unwrap();
///
/// let items = taxonomy.items(&["A", "B", "null", "null", "null"]).unwrap();
/// assert_eq!(items[0].comment.as_deref(), Some("c1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Taxonomy {
    root: BTreeMap<String, TaxonomyNode>,
}

impl Taxonomy {
    /// Create an empty taxonomy
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one record under its first five level keys
    pub fn insert(&mut self, record: &ClassificationRecord) -> Result<(), TaxonomyError> {
        let path: [&str; NESTED_DEPTH] = std::array::from_fn(|i| record.level(i).as_key());
        insert_at(&mut self.root, &path, LeafEntry::from(record))
    }

    /// Top-level nodes keyed by first-level label
    pub fn root(&self) -> &BTreeMap<String, TaxonomyNode> {
        &self.root
    }

    /// Node reached by following a label path from the root
    pub fn get(&self, path: &[&str]) -> Option<&TaxonomyNode> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.root.get(*first)?, |node, label| node.child(label))
    }

    /// Leaf payloads stored at a full five-label path
    pub fn items(&self, path: &[&str; NESTED_DEPTH]) -> Option<&[LeafEntry]> {
        self.get(path).and_then(TaxonomyNode::items)
    }

    /// Whether no records have been inserted
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Total number of leaf payloads across the tree
    pub fn leaf_count(&self) -> usize {
        self.root.values().map(TaxonomyNode::leaf_count).sum()
    }
}

fn insert_at(
    children: &mut BTreeMap<String, TaxonomyNode>,
    path: &[&str],
    entry: LeafEntry,
) -> Result<(), TaxonomyError> {
    let (label, rest) = path.split_first().ok_or(TaxonomyError::EmptyPath)?;

    let node = children.entry((*label).to_string()).or_insert_with(|| {
        if rest.is_empty() {
            TaxonomyNode::Leaf { items: Vec::new() }
        } else {
            TaxonomyNode::Branch(BTreeMap::new())
        }
    });

    match node {
        TaxonomyNode::Leaf { items } if rest.is_empty() => {
            items.push(entry);
            Ok(())
        }
        TaxonomyNode::Branch(grandchildren) if !rest.is_empty() => {
            insert_at(grandchildren, rest, entry)
        }
        _ => Err(TaxonomyError::ShapeConflict {
            label: (*label).to_string(),
        }),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn record_strategy() -> impl Strategy<Value = ClassificationRecord> {
        (
            proptest::collection::vec(prop_oneof![Just(""), Just("A"), Just("B"), Just("C")], 0..7),
            proptest::option::of("[a-z]{0,8}"),
        )
            .prop_map(|(path, comment)| {
                ClassificationRecord::from_path(&path, comment.as_deref())
            })
    }

    proptest! {
        /// Property: every inserted record lands in exactly one leaf
        #[test]
        fn test_leaf_count_matches_records(records in proptest::collection::vec(record_strategy(), 0..40)) {
            let mut taxonomy = Taxonomy::new();
            for record in &records {
                taxonomy.insert(record).unwrap();
            }
            prop_assert_eq!(taxonomy.leaf_count(), records.len());
        }

        /// Property: every record is reachable at its own five-label path
        #[test]
        fn test_records_reachable_by_path(records in proptest::collection::vec(record_strategy(), 1..20)) {
            let mut taxonomy = Taxonomy::new();
            for record in &records {
                taxonomy.insert(record).unwrap();
            }
            for record in &records {
                let path: [&str; NESTED_DEPTH] = std::array::from_fn(|i| record.level(i).as_key());
                let items = taxonomy.items(&path).unwrap();
                prop_assert!(items.contains(&LeafEntry::from(record)));
            }
        }
    }
}
