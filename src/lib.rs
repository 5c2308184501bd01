#![doc = include_str!("../README.md")]
use core::fmt::Debug;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

pub mod aggregate;
mod genewalk;
pub mod network;
pub mod node;
pub mod null_distribution;
pub mod orthologs;
mod output;
pub mod parser;
pub mod scorer;
pub mod similarity;
pub mod stats;

pub use aggregate::{AggregatedRecord, GeneWalkTable};
pub use genewalk::{GeneSelection, GeneWalk, GeneWalkConfig};
pub use network::{NetworkBuilder, NetworkIndex};
pub use node::{Node, NodeId, NodeKind};
pub use null_distribution::NullDistribution;
pub use orthologs::{MouseGene, OrthologMap};
pub use scorer::{ReplicateRecord, ReplicateScorer, ReplicateTable};
pub use similarity::{Embedding, SimilarityProvider, SimilarityRanking};

/// Number of replicate embeddings GeneWalk trains by default
const DEFAULT_NUM_REPLICATES: usize = 10;

/// Main Error type for this crate
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum GeneWalkError {
    /// The identifier is not a node of the network
    #[error("node {0} does not exist in the network")]
    UnknownNode(String),
    /// The embedding does not contain a vector for the gene
    #[error("gene {0} is not present in the embedding")]
    UnknownGene(String),
    /// Connectivity buckets are only defined for degrees of at least 1
    #[error("unable to compute connectivity bucket for degree 0")]
    ZeroDegree,
    /// The null distribution does not cover the connectivity bucket
    #[error("null distribution has no sample for bucket {0}")]
    MissingBucket(u32),
    /// Input data or configuration is not valid
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Failed to open, read or write a file
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// Failed to parse an integer value
    #[error("unable to parse Integer")]
    ParseIntError,
    /// Failed to parse a float value
    #[error("unable to parse Float")]
    ParseFloatError,
}

impl From<ParseIntError> for GeneWalkError {
    fn from(_: ParseIntError) -> Self {
        GeneWalkError::ParseIntError
    }
}

impl From<ParseFloatError> for GeneWalkError {
    fn from(_: ParseFloatError) -> Self {
        GeneWalkError::ParseFloatError
    }
}

/// Shortcut for `Result<T, GeneWalkError>`
pub type GeneWalkResult<T> = Result<T, GeneWalkError>;

/// Converts a count into `f64`
///
/// # Panics
///
/// Panics if `n` does not fit into a `u32`. Counts in this crate are
/// numbers of nodes, replicates or sample values, which never get that large.
fn f64_from_usize(n: usize) -> f64 {
    let intermediate: u32 = n
        .try_into()
        .expect("cannot safely create f64 from large usize");
    intermediate.into()
}
