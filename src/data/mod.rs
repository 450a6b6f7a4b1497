//! Data access module
//!
//! This module provides:
//! - The record collection interface consumed by sampling
//! - Reduction of record targets to scalar labels
//! - The label index that partitions record positions by label

mod collection;
mod index;
mod label;

pub use collection::{ArrayDataset, RecordCollection};
pub use index::{LabelIndex, LabelOf};
pub use label::{Extracted, LabelSource};
pub use ordered_float::OrderedFloat;
