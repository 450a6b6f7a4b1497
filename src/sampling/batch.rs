//! Raw index batches and their layouts
//!
//! A batch is a `ways x per_class` grid of record positions flattened into
//! one sequence. Two flattening conventions exist and downstream consumers
//! rely on one or the other, so the layout is carried with the batch.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ordering convention of a flattened multi-class batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchLayout {
    /// Contiguous per-class blocks: all slots of class 0, then class 1, ...
    Block,
    /// Position-then-class: slot 0 of every class, then slot 1, ...
    Interleaved,
}

impl BatchLayout {
    /// Flat offset of `(class, slot)` in a `ways x per_class` grid
    pub fn offset(self, class: usize, slot: usize, ways: usize, per_class: usize) -> usize {
        match self {
            Self::Block => class * per_class + slot,
            Self::Interleaved => slot * ways + class,
        }
    }
}

impl std::fmt::Display for BatchLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Block => write!(f, "block"),
            Self::Interleaved => write!(f, "interleaved"),
        }
    }
}

/// Flat batch of record positions with their encoded class labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBatch {
    positions: Vec<usize>,
    labels: Vec<usize>,
    ways: usize,
    per_class: usize,
    layout: BatchLayout,
}

impl IndexBatch {
    /// Build a batch from per-class position groups (group `c` gets label `c`)
    pub(crate) fn from_groups(groups: &[Vec<usize>], per_class: usize, layout: BatchLayout) -> Self {
        let ways = groups.len();
        let mut positions = vec![0; ways * per_class];
        let mut labels = vec![0; ways * per_class];

        for (class, group) in groups.iter().enumerate() {
            for (slot, &position) in group.iter().take(per_class).enumerate() {
                let offset = layout.offset(class, slot, ways, per_class);
                positions[offset] = position;
                labels[offset] = class;
            }
        }

        Self {
            positions,
            labels,
            ways,
            per_class,
            layout,
        }
    }

    /// Record positions in layout order
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Encoded class label of each position
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of classes
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Positions drawn per class
    pub fn per_class(&self) -> usize {
        self.per_class
    }

    /// Layout of the flattened sequence
    pub fn layout(&self) -> BatchLayout {
        self.layout
    }

    /// Total number of positions
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position drawn for `class` at `slot`
    pub fn position_at(&self, class: usize, slot: usize) -> Option<usize> {
        if class >= self.ways || slot >= self.per_class {
            return None;
        }
        let offset = self.layout.offset(class, slot, self.ways, self.per_class);
        self.positions.get(offset).copied()
    }

    /// All positions drawn for `class`, in slot order
    pub fn class_positions(&self, class: usize) -> Vec<usize> {
        (0..self.per_class)
            .filter_map(|slot| self.position_at(class, slot))
            .collect()
    }

    fn groups(&self) -> Vec<Vec<usize>> {
        (0..self.ways).map(|c| self.class_positions(c)).collect()
    }

    /// Re-flatten the same grid in another layout
    pub fn into_layout(self, layout: BatchLayout) -> Self {
        if layout == self.layout {
            return self;
        }
        Self::from_groups(&self.groups(), self.per_class, layout)
    }

    /// Split into support (first `shots` slots of each class) and query (the rest)
    pub fn split(&self, shots: usize) -> Result<(IndexBatch, IndexBatch)> {
        if shots > self.per_class {
            return Err(Error::invalid_parameter(
                "shots",
                format!("{} exceeds the {} positions per class", shots, self.per_class),
            ));
        }

        let groups = self.groups();
        let support: Vec<Vec<usize>> = groups.iter().map(|g| g[..shots].to_vec()).collect();
        let query: Vec<Vec<usize>> = groups.iter().map(|g| g[shots..].to_vec()).collect();

        Ok((
            Self::from_groups(&support, shots, self.layout),
            Self::from_groups(&query, self.per_class - shots, self.layout),
        ))
    }
}

/// One sampling interface over both layout strategies
pub trait IndexSampler {
    /// Layout this sampler produces natively
    fn layout(&self) -> BatchLayout;

    /// Draw one batch of record positions
    fn sample_batch<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<IndexBatch>;

    /// Draw one batch and flatten it in the requested layout
    fn sample_batch_as<R: Rng + ?Sized>(&self, rng: &mut R, layout: BatchLayout) -> Result<IndexBatch> {
        Ok(self.sample_batch(rng)?.into_layout(layout))
    }
}
