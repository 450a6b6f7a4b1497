//! # Few-Shot Tasks
//!
//! This library turns a flat, labeled record collection into a stream of
//! few-shot episodes for meta-learning.
//!
//! ## Overview
//!
//! An episode is a small labeled subset spanning `ways` classes with `shots`
//! examples per class. Sampling happens in two levels:
//!
//! - A task (an ordered tuple of distinct labels) is chosen from a store that
//!   enumerates every ordered permutation, draws a number of random tasks, or
//!   takes an explicit list
//! - Records are drawn per task label without replacement and their labels
//!   are remapped to `0..ways` in task order
//!
//! A second, fixed-grouping sampler works on raw label ids and returns
//! interleaved index batches with extra query slots per class.
//!
//! Randomness is always supplied by the caller, so seeding is under the
//! caller's control.
//!
//! ## Example Usage
//!
//! ```rust
//! use few_shot_tasks::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let records: Vec<(f64, i64)> = (0..30).map(|i| (i as f64, i % 3)).collect();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let config = TaskConfig::new().with_ways(2).with_shots(4);
//! let sampler = EpisodeSampler::new(records, config, &mut rng).unwrap();
//! assert_eq!(sampler.len(), 6);
//!
//! let episode = sampler.sample(&mut rng, None, None).unwrap();
//! assert_eq!(episode.len(), 8);
//! assert_eq!(episode.labels(), vec![0, 0, 0, 0, 1, 1, 1, 1]);
//! ```
//!
//! ## Modules
//!
//! - `data` - Record collections, label extraction and the label index
//! - `tasks` - Task store and per-task label encoding
//! - `sampling` - Episode sampling, traversal and the fixed-grouping sampler
//! - `utils` - Configuration and logging setup

pub mod data;
pub mod error;
pub mod sampling;
pub mod tasks;
pub mod utils;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Data access
    pub use crate::data::{
        ArrayDataset, Extracted, LabelIndex, LabelOf, LabelSource, OrderedFloat, RecordCollection,
    };

    // Tasks
    pub use crate::tasks::{LabelEncoder, Task, TaskConfig, TaskSource, TaskSpecStore};

    // Sampling
    pub use crate::sampling::{
        BatchLayout, Episode, EpisodeSampler, FixedGroupConfig, FixedGroupSampler, IndexBatch,
        IndexSampler, Traversal,
    };

    // Configuration and errors
    pub use crate::error::{Error, Result};
    pub use crate::utils::{setup_logging, Config};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
