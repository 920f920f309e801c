use fxhash::FxHashMap;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    define_id_newtype, define_index_newtype,
    error::PoolError,
    problem::{location::Location, purpose::Purpose},
};

define_id_newtype!(DestinationId);
define_index_newtype!(CandidateIdx, Candidate);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub destination_id: DestinationId,
    pub location: Location,
}

/// A facility and the secondary purposes it can host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Facility {
    pub destination_id: DestinationId,
    pub location: Location,
    pub offers: Vec<Purpose>,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexedData {
    candidate_id: CandidateIdx,
}

pub type CandidateIndexObject = GeomWithData<[f64; 2], IndexedData>;

/// Destinations offering one secondary purpose, indexed for nearest neighbour
/// queries.
pub struct CandidatePool {
    purpose: Purpose,
    candidates: Vec<Candidate>,
    tree: RTree<CandidateIndexObject>,
}

impl CandidatePool {
    pub fn new(
        purpose: Purpose,
        identifiers: Vec<DestinationId>,
        locations: Vec<Location>,
    ) -> Result<Self, PoolError> {
        if !purpose.is_secondary() {
            return Err(PoolError::NotSecondary { purpose });
        }

        if identifiers.len() != locations.len() {
            return Err(PoolError::LengthMismatch {
                purpose,
                identifiers: identifiers.len(),
                locations: locations.len(),
            });
        }

        if let Some(index) = locations.iter().position(|location| !location.is_finite()) {
            return Err(PoolError::NonFiniteLocation { purpose, index });
        }

        let candidates = identifiers
            .into_iter()
            .zip(locations)
            .map(|(destination_id, location)| Candidate {
                destination_id,
                location,
            })
            .collect::<Vec<_>>();

        let tree: RTree<CandidateIndexObject> = RTree::bulk_load(
            candidates
                .iter()
                .enumerate()
                .map(|(index, candidate)| {
                    CandidateIndexObject::new(
                        [candidate.location.x(), candidate.location.y()],
                        IndexedData {
                            candidate_id: CandidateIdx::new(index),
                        },
                    )
                })
                .collect(),
        );

        Ok(CandidatePool {
            purpose,
            candidates,
            tree,
        })
    }

    pub fn empty(purpose: Purpose) -> Self {
        CandidatePool {
            purpose,
            candidates: Vec::new(),
            tree: RTree::new(),
        }
    }

    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn candidate(&self, candidate_id: CandidateIdx) -> &Candidate {
        &self.candidates[candidate_id]
    }

    /// Closest candidate by Euclidean distance.
    pub fn nearest(&self, location: &Location) -> Option<&Candidate> {
        self.tree
            .nearest_neighbor(&[location.x(), location.y()])
            .map(|object| self.candidate(object.data.candidate_id))
    }
}

/// Candidate pools of every secondary purpose, read-only for a whole run.
pub struct CandidatePools {
    pools: FxHashMap<Purpose, CandidatePool>,
}

impl CandidatePools {
    pub fn new(pools: Vec<CandidatePool>) -> Self {
        let mut by_purpose = pools
            .into_iter()
            .map(|pool| (pool.purpose(), pool))
            .collect::<FxHashMap<_, _>>();

        for purpose in Purpose::SECONDARY {
            by_purpose
                .entry(purpose)
                .or_insert_with(|| CandidatePool::empty(purpose));
        }

        Self { pools: by_purpose }
    }

    /// Splits facilities into one pool per offered purpose. A mixed-use
    /// facility lands in several pools.
    pub fn from_facilities(facilities: &[Facility]) -> Result<Self, PoolError> {
        let mut columns: FxHashMap<Purpose, (Vec<DestinationId>, Vec<Location>)> =
            FxHashMap::default();

        for facility in facilities {
            for &purpose in &facility.offers {
                if !purpose.is_secondary() {
                    return Err(PoolError::NotSecondary { purpose });
                }

                let (identifiers, locations) = columns.entry(purpose).or_default();
                identifiers.push(facility.destination_id);
                locations.push(facility.location);
            }
        }

        let pools = Purpose::SECONDARY
            .iter()
            .map(|&purpose| {
                let (identifiers, locations) = columns.remove(&purpose).unwrap_or_default();
                CandidatePool::new(purpose, identifiers, locations)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(pools))
    }

    pub fn pool(&self, purpose: Purpose) -> Option<&CandidatePool> {
        self.pools.get(&purpose)
    }

    /// Pools sorted by purpose.
    pub fn iter(&self) -> impl Iterator<Item = &CandidatePool> {
        Purpose::SECONDARY
            .iter()
            .filter_map(|purpose| self.pools.get(purpose))
    }
}
