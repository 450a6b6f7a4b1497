//! Record collections consumed by the label index
//!
//! A record collection is a finite, integer-indexed sequence of
//! `(feature, target)` pairs. The feature type is opaque to sampling; the
//! target must reduce to a scalar label through [`LabelSource`].

use crate::data::label::LabelSource;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2};

/// Read-only, length-known sequence of `(feature, target)` records
pub trait RecordCollection {
    /// Feature component of a record
    type Feature;
    /// Target component of a record
    type Target: LabelSource;

    /// Number of records
    fn len(&self) -> usize;

    /// Check whether the collection holds no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record at `index`, or `None` when out of range
    fn get(&self, index: usize) -> Option<(Self::Feature, Self::Target)>;

    /// Feature of the record at `index`
    fn feature(&self, index: usize) -> Option<Self::Feature> {
        self.get(index).map(|(feature, _)| feature)
    }

    /// Target of the record at `index`
    fn target(&self, index: usize) -> Option<Self::Target> {
        self.get(index).map(|(_, target)| target)
    }
}

impl<F: Clone, T: LabelSource + Clone> RecordCollection for [(F, T)] {
    type Feature = F;
    type Target = T;

    fn len(&self) -> usize {
        <[(F, T)]>::len(self)
    }

    fn get(&self, index: usize) -> Option<(F, T)> {
        <[(F, T)]>::get(self, index).cloned()
    }
}

impl<F: Clone, T: LabelSource + Clone> RecordCollection for Vec<(F, T)> {
    type Feature = F;
    type Target = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<(F, T)> {
        self.as_slice().get(index).cloned()
    }
}

impl<C: RecordCollection + ?Sized> RecordCollection for &C {
    type Feature = C::Feature;
    type Target = C::Target;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Option<(Self::Feature, Self::Target)> {
        (**self).get(index)
    }

    fn feature(&self, index: usize) -> Option<Self::Feature> {
        (**self).feature(index)
    }

    fn target(&self, index: usize) -> Option<Self::Target> {
        (**self).target(index)
    }
}

/// Feature matrix with one label per row
///
/// Row `i` of `features` is the feature vector of record `i`.
#[derive(Debug, Clone)]
pub struct ArrayDataset<T> {
    features: Array2<f64>,
    labels: Vec<T>,
}

impl<T: LabelSource + Clone> ArrayDataset<T> {
    /// Create a dataset from a feature matrix and aligned labels
    pub fn new(features: Array2<f64>, labels: Vec<T>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(Error::DimensionMismatch {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", labels.len()),
            });
        }
        Ok(Self { features, labels })
    }

    /// Feature matrix
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Labels aligned with feature rows
    pub fn labels(&self) -> &[T] {
        &self.labels
    }

    /// Feature dimension
    pub fn feature_dim(&self) -> usize {
        self.features.ncols()
    }
}

impl<T: LabelSource + Clone> RecordCollection for ArrayDataset<T> {
    type Feature = Array1<f64>;
    type Target = T;

    fn len(&self) -> usize {
        self.labels.len()
    }

    fn get(&self, index: usize) -> Option<(Array1<f64>, T)> {
        let label = self.labels.get(index)?.clone();
        Some((self.features.row(index).to_owned(), label))
    }

    fn feature(&self, index: usize) -> Option<Array1<f64>> {
        if index < self.labels.len() {
            Some(self.features.row(index).to_owned())
        } else {
            None
        }
    }

    fn target(&self, index: usize) -> Option<T> {
        self.labels.get(index).cloned()
    }
}
