//! Label index over a record collection
//!
//! The index maps every label to the positions of the records that carry
//! it. Built once by a full scan (or from a precomputed mapping, which is
//! validated against the same partition invariant) and immutable afterwards.

use crate::data::collection::RecordCollection;
use crate::data::label::{Extracted, LabelSource};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Scalar label type of a collection
pub type LabelOf<C> = <<C as RecordCollection>::Target as LabelSource>::Label;

/// Partition of record positions by label
///
/// Every position `0..len` appears in exactly one label's list; lists keep
/// the order in which positions were seen.
#[derive(Debug, Clone)]
pub struct LabelIndex<C: RecordCollection> {
    collection: C,
    labels_to_indices: HashMap<LabelOf<C>, Vec<usize>>,
    /// Distinct labels in first-appearance order
    labels: Vec<LabelOf<C>>,
}

impl<C: RecordCollection> LabelIndex<C> {
    /// Build the index by scanning every record once
    pub fn new(collection: C) -> Result<Self> {
        let mut labels_to_indices: HashMap<LabelOf<C>, Vec<usize>> = HashMap::new();
        let mut labels = Vec::new();

        for position in 0..collection.len() {
            let target = collection
                .target(position)
                .ok_or(Error::MissingRecord { position })?;

            let label = match target.extract() {
                Extracted::Scalar(label) => label,
                Extracted::Unsupported { shape } => {
                    return Err(Error::UnsupportedLabel { position, shape });
                }
            };

            labels_to_indices
                .entry(label.clone())
                .or_insert_with(|| {
                    labels.push(label);
                    Vec::new()
                })
                .push(position);
        }

        tracing::debug!(
            "Indexed {} records into {} labels",
            collection.len(),
            labels.len()
        );

        Ok(Self {
            collection,
            labels_to_indices,
            labels,
        })
    }

    /// Build the index from a precomputed label to positions mapping
    ///
    /// `order` fixes the label universe order and must list exactly the
    /// mapping's keys. The mapping must partition `0..collection.len()`.
    pub fn with_mapping(
        collection: C,
        labels_to_indices: HashMap<LabelOf<C>, Vec<usize>>,
        order: Vec<LabelOf<C>>,
    ) -> Result<Self> {
        let keys: HashSet<&LabelOf<C>> = labels_to_indices.keys().collect();
        let ordered: HashSet<&LabelOf<C>> = order.iter().collect();
        if ordered.len() != order.len() {
            return Err(Error::InvalidIndex(
                "label order contains duplicates".to_string(),
            ));
        }
        if keys != ordered {
            return Err(Error::InvalidIndex(
                "label order does not match the mapping's labels".to_string(),
            ));
        }

        let len = collection.len();
        let mut seen = vec![false; len];
        for (label, positions) in &labels_to_indices {
            for &position in positions {
                if position >= len {
                    return Err(Error::InvalidIndex(format!(
                        "position {} of label {:?} is out of range for {} records",
                        position, label, len
                    )));
                }
                if seen[position] {
                    return Err(Error::InvalidIndex(format!(
                        "position {} is assigned to more than one label",
                        position
                    )));
                }
                seen[position] = true;
            }
        }
        if let Some(position) = seen.iter().position(|&hit| !hit) {
            return Err(Error::InvalidIndex(format!(
                "position {} is not assigned to any label",
                position
            )));
        }

        Ok(Self {
            collection,
            labels_to_indices,
            labels: order,
        })
    }

    /// Distinct labels in first-appearance order
    pub fn labels(&self) -> &[LabelOf<C>] {
        &self.labels
    }

    /// Number of distinct labels
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Check whether a label is present
    pub fn contains(&self, label: &LabelOf<C>) -> bool {
        self.labels_to_indices.contains_key(label)
    }

    /// Positions of all records carrying `label`
    pub fn positions(&self, label: &LabelOf<C>) -> Option<&[usize]> {
        self.labels_to_indices.get(label).map(Vec::as_slice)
    }

    /// Number of records carrying `label` (zero when absent)
    pub fn population(&self, label: &LabelOf<C>) -> usize {
        self.labels_to_indices.get(label).map_or(0, Vec::len)
    }

    /// Smallest per-label population, or `None` for an empty index
    pub fn min_population(&self) -> Option<usize> {
        self.labels_to_indices.values().map(Vec::len).min()
    }

    /// Full label to positions mapping
    pub fn labels_to_indices(&self) -> &HashMap<LabelOf<C>, Vec<usize>> {
        &self.labels_to_indices
    }

    /// Underlying record collection
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Release the underlying record collection
    pub fn into_inner(self) -> C {
        self.collection
    }
}

impl<C: RecordCollection> RecordCollection for LabelIndex<C> {
    type Feature = C::Feature;
    type Target = C::Target;

    fn len(&self) -> usize {
        self.collection.len()
    }

    fn get(&self, index: usize) -> Option<(Self::Feature, Self::Target)> {
        self.collection.get(index)
    }

    fn feature(&self, index: usize) -> Option<Self::Feature> {
        self.collection.feature(index)
    }

    fn target(&self, index: usize) -> Option<Self::Target> {
        self.collection.target(index)
    }
}
