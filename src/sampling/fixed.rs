//! Fixed-grouping N-way K-shot index sampler
//!
//! Works directly on a flat array of integer label ids aligned with some
//! record collection. Each round picks `ways` label groups and draws
//! `shots + query` positions from each, then flattens the grid in the
//! interleaved layout (slot 0 of every class, then slot 1, ...). Only raw
//! positions are produced; gathering features is up to the caller.

use crate::error::{Error, Result};
use crate::sampling::batch::{BatchLayout, IndexBatch, IndexSampler};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

fn default_episodes() -> usize {
    100
}

fn default_ways() -> usize {
    5
}

fn default_shots() -> usize {
    1
}

/// Configuration for the fixed-grouping sampler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedGroupConfig {
    /// Number of rounds per pass
    #[serde(default = "default_episodes")]
    pub episodes: usize,
    /// Number of label groups per round (N-way)
    #[serde(default = "default_ways")]
    pub ways: usize,
    /// Support positions per group (K-shot)
    #[serde(default = "default_shots")]
    pub shots: usize,
    /// Extra query positions per group
    #[serde(default)]
    pub query: usize,
    /// Fixed label groups to sample from; not supported, must stay unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_classes: Option<Vec<usize>>,
}

impl Default for FixedGroupConfig {
    fn default() -> Self {
        Self {
            episodes: default_episodes(),
            ways: default_ways(),
            shots: default_shots(),
            query: 0,
            fixed_classes: None,
        }
    }
}

impl FixedGroupConfig {
    /// Create a config for the given round count and episode shape
    pub fn new(episodes: usize, ways: usize, shots: usize, query: usize) -> Self {
        Self {
            episodes,
            ways,
            shots,
            query,
            fixed_classes: None,
        }
    }

    /// Builder: request fixed classes (rejected when the sampler is built)
    pub fn with_fixed_classes(mut self, classes: Vec<usize>) -> Self {
        self.fixed_classes = Some(classes);
        self
    }
}

/// Sampler of interleaved index batches over per-label position groups
#[derive(Debug, Clone)]
pub struct FixedGroupSampler {
    /// Positions of label id `i`, in record order; empty for absent ids
    groups: Vec<Vec<usize>>,
    episodes: usize,
    ways: usize,
    shots: usize,
    query: usize,
}

impl FixedGroupSampler {
    /// Group `labels` by id and validate the configuration
    pub fn new(labels: &[usize], config: FixedGroupConfig) -> Result<Self> {
        let FixedGroupConfig {
            episodes,
            ways,
            shots,
            query,
            fixed_classes,
        } = config;

        if let Some(classes) = fixed_classes {
            return Err(Error::Unsupported(format!(
                "fixed_classes ({:?}) is not supported",
                classes
            )));
        }
        if shots < 1 {
            return Err(Error::invalid_parameter("shots", "must be at least 1"));
        }
        if ways == 0 {
            return Err(Error::invalid_parameter("ways", "must be at least 1"));
        }
        if shots.checked_add(query).is_none() {
            return Err(Error::invalid_parameter("query", "shots + query overflows"));
        }

        let max = labels.iter().copied().max().ok_or(Error::EmptyDataset)?;
        let mut groups = vec![Vec::new(); max + 1];
        for (position, &label) in labels.iter().enumerate() {
            groups[label].push(position);
        }

        let present = groups.iter().filter(|g| !g.is_empty()).count();
        if ways > present {
            return Err(Error::TooManyWays {
                ways,
                available: present,
            });
        }

        tracing::debug!(
            "Built {} label groups ({} non-empty) over {} records",
            groups.len(),
            present,
            labels.len()
        );

        Ok(Self {
            groups,
            episodes,
            ways,
            shots,
            query,
        })
    }

    /// Number of rounds per pass
    pub fn len(&self) -> usize {
        self.episodes
    }

    /// Check whether a pass yields no rounds
    pub fn is_empty(&self) -> bool {
        self.episodes == 0
    }

    /// Number of label groups, including empty ones
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Positions of label id `id`
    pub fn group(&self, id: usize) -> Option<&[usize]> {
        self.groups.get(id).map(Vec::as_slice)
    }

    /// Positions drawn per group in each round
    pub fn per_class(&self) -> usize {
        self.shots + self.query
    }

    /// Support positions per group
    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Query positions per group
    pub fn query(&self) -> usize {
        self.query
    }

    /// Groups per round
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Draw one round
    ///
    /// Fails when a chosen group holds fewer than `shots + query` positions,
    /// which includes groups of ids absent from the label array.
    pub fn sample_round<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<IndexBatch> {
        let per_class = self.per_class();
        let chosen = index::sample(rng, self.groups.len(), self.ways);

        let mut drawn = Vec::with_capacity(self.ways);
        for id in chosen.iter() {
            let group = &self.groups[id];
            if group.len() < per_class {
                return Err(Error::insufficient_population(id, group.len(), per_class));
            }
            let picked: Vec<usize> = index::sample(rng, group.len(), per_class)
                .iter()
                .map(|i| group[i])
                .collect();
            drawn.push(picked);
        }

        Ok(IndexBatch::from_groups(&drawn, per_class, BatchLayout::Interleaved))
    }

    /// One pass of `len()` rounds
    pub fn batches<'a, R: Rng + ?Sized>(&'a self, rng: &'a mut R) -> Batches<'a, R> {
        Batches {
            sampler: self,
            rng,
            remaining: self.episodes,
        }
    }

    /// One pass flattened into a single position sequence
    pub fn sample_all<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<usize>> {
        let mut positions = Vec::new();
        for batch in self.batches(rng) {
            positions.extend_from_slice(batch?.positions());
        }
        Ok(positions)
    }
}

impl IndexSampler for FixedGroupSampler {
    fn layout(&self) -> BatchLayout {
        BatchLayout::Interleaved
    }

    fn sample_batch<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<IndexBatch> {
        self.sample_round(rng)
    }
}

/// Iterator over the rounds of one pass
pub struct Batches<'a, R: ?Sized> {
    sampler: &'a FixedGroupSampler,
    rng: &'a mut R,
    remaining: usize,
}

impl<'a, R: Rng + ?Sized> Iterator for Batches<'a, R> {
    type Item = Result<IndexBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.sampler.sample_round(self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, R: Rng + ?Sized> ExactSizeIterator for Batches<'a, R> {}
