//! Per-task label encoding
//!
//! Maps the labels of one task onto contiguous indices `0..ways` in task
//! order, so that episode labels can feed a classifier head directly.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Bijection between a task's labels and `0..len`
#[derive(Debug, Clone)]
pub struct LabelEncoder<L> {
    class_to_idx: HashMap<L, usize>,
    idx_to_class: Vec<L>,
}

impl<L: Clone + Eq + Hash + Debug> LabelEncoder<L> {
    /// Create an encoder for the given classes, numbered in input order
    pub fn new(classes: &[L]) -> Result<Self> {
        let mut class_to_idx = HashMap::with_capacity(classes.len());
        for (idx, class) in classes.iter().enumerate() {
            if class_to_idx.insert(class.clone(), idx).is_some() {
                return Err(Error::DuplicateLabel(format!("{:?}", class)));
            }
        }

        Ok(Self {
            class_to_idx,
            idx_to_class: classes.to_vec(),
        })
    }

    /// Encoded index of `class`
    pub fn encode(&self, class: &L) -> Option<usize> {
        self.class_to_idx.get(class).copied()
    }

    /// Class encoded as `idx`
    pub fn decode(&self, idx: usize) -> Option<&L> {
        self.idx_to_class.get(idx)
    }

    /// Number of encoded classes
    pub fn len(&self) -> usize {
        self.idx_to_class.len()
    }

    /// Check whether the encoder is empty
    pub fn is_empty(&self) -> bool {
        self.idx_to_class.is_empty()
    }

    /// Classes in encoding order
    pub fn classes(&self) -> &[L] {
        &self.idx_to_class
    }

    /// Class to index mapping
    pub fn class_to_idx(&self) -> &HashMap<L, usize> {
        &self.class_to_idx
    }
}
