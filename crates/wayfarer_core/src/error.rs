use thiserror::Error;

use crate::problem::{mode::Mode, purpose::Purpose, trip::PersonId};

/// A person's trip chain cannot be split into assignment problems.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("person {person_id}: trips from {trip_id} are bounded by secondary purposes on both sides")]
    MalformedChain { person_id: PersonId, trip_id: usize },
    #[error("person {person_id}: chain is anchored at {purpose} but no {purpose} location is known")]
    MissingAnchor { person_id: PersonId, purpose: Purpose },
}

impl ChainError {
    pub fn person_id(&self) -> PersonId {
        match self {
            ChainError::MalformedChain { person_id, .. }
            | ChainError::MissingAnchor { person_id, .. } => *person_id,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    #[error("{mode}: no travel time buckets")]
    NoBuckets { mode: Mode },
    #[error("{mode}: {bounds} bucket bounds but {buckets} buckets")]
    BucketCountMismatch {
        mode: Mode,
        bounds: usize,
        buckets: usize,
    },
    #[error("{mode}: bucket bounds must be strictly increasing")]
    UnsortedBounds { mode: Mode },
    #[error("{mode}: last bucket bound must be infinite")]
    MissingInfiniteBound { mode: Mode },
    #[error("{mode}: bucket {bucket} is empty")]
    EmptyBucket { mode: Mode, bucket: usize },
    #[error("{mode}: bucket {bucket} has {values} values but {cdf} cdf entries")]
    LengthMismatch {
        mode: Mode,
        bucket: usize,
        values: usize,
        cdf: usize,
    },
    #[error("{mode}: bucket {bucket} values must be sorted")]
    UnsortedValues { mode: Mode, bucket: usize },
    #[error("{mode}: bucket {bucket} cdf must be non-decreasing within [0, 1] and end at 1")]
    InvalidCdf { mode: Mode, bucket: usize },
    #[error("{mode}: survey records have no positive weight")]
    NoWeight { mode: Mode },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    #[error("{purpose} is not a secondary purpose")]
    NotSecondary { purpose: Purpose },
    #[error("{purpose}: {identifiers} identifiers but {locations} locations")]
    LengthMismatch {
        purpose: Purpose,
        identifiers: usize,
        locations: usize,
    },
    #[error("{purpose}: candidate {index} has a non-finite location")]
    NonFiniteLocation { purpose: Purpose, index: usize },
}

#[derive(Error, Debug)]
pub enum AssignmentError {
    #[error("trips must be sorted by person id then trip id (first offending trip: person {person_id}, trip {trip_id})")]
    UnsortedTrips { person_id: PersonId, trip_id: usize },
    #[error("Failed to build worker thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("scenario has neither distance distributions nor survey trips")]
    MissingDistributions,
}
