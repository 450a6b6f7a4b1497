//! Task specification module
//!
//! This module provides:
//! - Per-task label encoding onto contiguous indices
//! - The task store: enumeration, random generation and validation of tasks

mod encoder;
mod store;

pub use encoder::LabelEncoder;
pub use store::{Task, TaskConfig, TaskSource, TaskSpecStore};
