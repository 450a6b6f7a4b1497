//! Sampling module
//!
//! This module provides:
//! - Episode sampling with per-class block layout
//! - Sequential traversal of stored tasks
//! - The fixed-grouping index sampler with interleaved layout
//! - Index batches and the shared sampling interface over both layouts

mod batch;
mod episode;
mod fixed;
mod traversal;

pub use batch::{BatchLayout, IndexBatch, IndexSampler};
pub use episode::{Episode, EpisodeSampler};
pub use fixed::{Batches, FixedGroupConfig, FixedGroupSampler};
pub use traversal::Traversal;
