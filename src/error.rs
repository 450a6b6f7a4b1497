//! Error types for task sampling

use thiserror::Error;

/// Result type alias for sampling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised while indexing records, building task stores and
/// drawing episodes
#[derive(Error, Debug)]
pub enum Error {
    /// A record label could not be reduced to a single scalar value
    #[error("unsupported label at position {position}: {shape} (only scalar labels are supported)")]
    UnsupportedLabel { position: usize, shape: String },

    /// Collection reported a length but could not produce a record inside it
    #[error("record collection returned no record at position {position}")]
    MissingRecord { position: usize },

    /// A precomputed label index does not partition the collection
    #[error("invalid label index: {0}")]
    InvalidIndex(String),

    /// A label sequence that must be duplicate-free contains repeats
    #[error("duplicate label {0} in class list")]
    DuplicateLabel(String),

    /// More ways were requested than classes are available
    #[error("ways ({ways}) exceeds the number of available classes ({available})")]
    TooManyWays { ways: usize, available: usize },

    /// Configured classes contain labels outside the label universe
    #[error("classes contain labels that are not in the dataset: {0}")]
    UnknownClasses(String),

    /// One or more stored task specifications are malformed
    #[error("the following tasks are malformed: {0}")]
    InvalidTasks(String),

    /// The task store holds no tasks to choose from
    #[error("task store is empty; no task to sample")]
    NoTasks,

    /// A task passed to a sampling call is malformed
    #[error("task is malformed: {0}")]
    InvalidTask(String),

    /// Shots were given neither at construction nor at the call site
    #[error("shots is undefined in the configuration and was not passed to sample")]
    MissingShots,

    /// A class has fewer records than a draw needs
    #[error("label {label} has {available} records but {requested} were requested")]
    InsufficientPopulation {
        label: String,
        available: usize,
        requested: usize,
    },

    /// Invalid parameter value
    #[error("invalid parameter {param}: {message}")]
    InvalidParameter { param: String, message: String },

    /// Option that exists in the configuration surface but is not implemented
    #[error("unsupported option: {0}")]
    Unsupported(String),

    /// No records to sample from
    #[error("dataset is empty")]
    EmptyDataset,

    /// Shape of features or labels does not line up
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new invalid parameter error
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a new insufficient population error
    pub fn insufficient_population(
        label: impl std::fmt::Debug,
        available: usize,
        requested: usize,
    ) -> Self {
        Self::InsufficientPopulation {
            label: format!("{:?}", label),
            available,
            requested,
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(err.to_string())
    }
}
