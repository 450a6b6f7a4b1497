//! Reduction of record targets to scalar labels
//!
//! Records may carry their label as a bare scalar or wrapped in a
//! single-element container (a one-element vector or array). Both forms
//! reduce to the same scalar; anything else is reported as unsupported.
//! Floating-point labels are wrapped in `OrderedFloat` so they can be
//! hashed; `NaN` never equals itself and is rejected.

use ndarray::Array1;
use ordered_float::OrderedFloat;
use std::fmt::Debug;
use std::hash::Hash;

/// Outcome of reducing a target to a scalar label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<L> {
    /// The target reduced to a single hashable value
    Scalar(L),
    /// The target has a shape that cannot be used as a label
    Unsupported { shape: String },
}

impl<L> Extracted<L> {
    /// Returns the scalar, if any
    pub fn scalar(self) -> Option<L> {
        match self {
            Self::Scalar(label) => Some(label),
            Self::Unsupported { .. } => None,
        }
    }

    /// Check whether the extraction produced a scalar
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }
}

/// Anything that can be reduced to a scalar, hashable label
pub trait LabelSource {
    /// Scalar label type produced by extraction
    type Label: Clone + Eq + Hash + Debug;

    /// Reduce this target to a scalar label
    fn extract(&self) -> Extracted<Self::Label>;
}

macro_rules! scalar_label {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LabelSource for $ty {
                type Label = $ty;

                fn extract(&self) -> Extracted<Self::Label> {
                    Extracted::Scalar(self.clone())
                }
            }
        )*
    };
}

scalar_label!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, String);

macro_rules! float_label {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LabelSource for $ty {
                type Label = OrderedFloat<$ty>;

                fn extract(&self) -> Extracted<Self::Label> {
                    if self.is_nan() {
                        Extracted::Unsupported {
                            shape: "NaN".to_string(),
                        }
                    } else {
                        Extracted::Scalar(OrderedFloat(*self))
                    }
                }
            }
        )*
    };
}

float_label!(f32, f64);

impl LabelSource for &str {
    type Label = String;

    fn extract(&self) -> Extracted<Self::Label> {
        Extracted::Scalar((*self).to_string())
    }
}

fn unwrap_single<T: LabelSource>(items: &[T], kind: &str) -> Extracted<T::Label> {
    match items {
        [single] => single.extract(),
        _ => Extracted::Unsupported {
            shape: format!("{} of length {}", kind, items.len()),
        },
    }
}

impl<T: LabelSource> LabelSource for Vec<T> {
    type Label = T::Label;

    fn extract(&self) -> Extracted<Self::Label> {
        unwrap_single(self, "vector")
    }
}

impl<T: LabelSource, const N: usize> LabelSource for [T; N] {
    type Label = T::Label;

    fn extract(&self) -> Extracted<Self::Label> {
        unwrap_single(self, "array")
    }
}

impl<T: LabelSource> LabelSource for Array1<T> {
    type Label = T::Label;

    fn extract(&self) -> Extracted<Self::Label> {
        if self.len() == 1 {
            self[0].extract()
        } else {
            Extracted::Unsupported {
                shape: format!("1-d array of length {}", self.len()),
            }
        }
    }
}
