pub mod criteria;
pub mod feasibility;
pub mod num;
pub mod rank;
pub mod session;
pub mod swipe;

use std::collections::BTreeMap;

pub use arrayvec::ArrayVec;
use ordered_float::NotNan;
use tracing::info;

pub use crate::feasibility::{CostTable, MissingPricePolicy};
pub use crate::num::Rating;
pub use crate::session::{Session, Status};
pub use crate::swipe::{Ballot, BallotBox, Choice, Tally, Verdict};

pub type MemberId = u64;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every candidate destination failed the budget gate for at least one
    /// member. Terminal for the round.
    #[error("no destination is affordable for every member")]
    NoFeasibleDestinations,
    /// Aggregation over zero members has no meaningful result.
    #[error("no member preferences submitted")]
    EmptyPreferenceSet,
    #[error("unknown criterion: {0}")]
    UnknownCriterion(String),
    #[error("expected {expected} criterion values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("destination is not on the shortlist: {0}")]
    UnknownDestination(String),
    #[error("operation requires session status {to:?}, but it is {from:?}")]
    InvalidTransition { from: Status, to: Status },
}

/// A candidate location: the full reference row. `attributes` holds every
/// known criterion column; a session activates a subset and the engine
/// projects it out, rejecting unknown criterion keys.
#[derive(Clone, Debug)]
pub struct Destination {
    pub name: String,
    /// Key into the flight-cost oracle, e.g. an IATA code.
    pub travel_code: String,
    pub attributes: BTreeMap<String, f64>,
}

impl Destination {
    /// Raw attribute values in active-criteria order.
    fn project(&self, criteria: &[String]) -> Result<Vec<f64>, Error> {
        criteria
            .iter()
            .map(|criterion| {
                self.attributes
                    .get(criterion)
                    .copied()
                    .ok_or_else(|| Error::UnknownCriterion(criterion.clone()))
            })
            .collect()
    }
}

/// One participant's input: their ratings in active-criteria order, plus the
/// origin and budget the feasibility filter needs. Either of the latter may
/// be absent, in which case the member does not constrain feasibility.
#[derive(Clone, Debug)]
pub struct MemberPreference {
    pub member: MemberId,
    pub origin: Option<String>,
    pub budget: Option<f64>,
    pub ratings: Vec<Rating>,
}

impl MemberPreference {
    /// Build a preference from a partial per-criterion rating map, filling
    /// criteria the member skipped with the scale midpoint.
    pub fn from_partial(
        member: MemberId,
        criteria: &[String],
        ratings: &BTreeMap<String, Rating>,
        origin: Option<String>,
        budget: Option<f64>,
    ) -> Self {
        let ratings = criteria
            .iter()
            .map(|criterion| ratings.get(criterion).copied().unwrap_or(Rating::MID))
            .collect();
        Self {
            member,
            origin,
            budget,
            ratings,
        }
    }
}

/// One shortlisted destination with its dissimilarity to the group
/// preference vector. Lower is a better match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortlistEntry {
    pub destination: String,
    pub distance: NotNan<f64>,
}

/// Produce the shortlist for a session: feasibility-filter the destinations
/// against every member's budget, normalize the survivors' attributes onto
/// the rating scale, aggregate member ratings into the group preference
/// vector, and keep the `LIMIT` destinations most similar to it.
///
/// The feasibility gate runs first: an unaffordable destination is never
/// ranked, and normalization is relative to the surviving set only.
pub fn compute_shortlist<T: CostTable, const LIMIT: usize>(
    criteria: &[String],
    destinations: &[Destination],
    members: &[MemberPreference],
    costs: &T,
    departure_date: &str,
    policy: MissingPricePolicy,
) -> Result<ArrayVec<ShortlistEntry, LIMIT>, Error> {
    let group_vector = criteria::aggregate(members)?;
    if group_vector.len() != criteria.len() {
        return Err(Error::DimensionMismatch {
            expected: criteria.len(),
            actual: group_vector.len(),
        });
    }

    let surviving = feasibility::filter(destinations, members, costs, departure_date, policy);
    if surviving.is_empty() {
        return Err(Error::NoFeasibleDestinations);
    }

    // Column-major: columns[j][i] is criterion j of surviving destination i.
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(surviving.len()); criteria.len()];
    for destination in &surviving {
        for (column, value) in columns.iter_mut().zip(destination.project(criteria)?) {
            column.push(value);
        }
    }
    let normalized = criteria::normalize_columns(&columns);
    let vectors: Vec<Vec<Rating>> = (0..surviving.len())
        .map(|i| normalized.iter().map(|column| column[i]).collect())
        .collect();

    let shortlist = rank::rank(&surviving, &vectors, &group_vector);
    info!(
        candidates = destinations.len(),
        surviving = surviving.len(),
        shortlist = shortlist.len(),
        "computed shortlist"
    );
    Ok(shortlist)
}

/// Tally the swipe round over a frozen shortlist. Every ballot must name a
/// shortlisted destination.
pub fn compute_winner(shortlist: &[ShortlistEntry], ballots: &BallotBox) -> Result<Tally, Error> {
    for ballot in ballots.ballots() {
        if !shortlist.iter().any(|e| e.destination == ballot.destination) {
            return Err(Error::UnknownDestination(ballot.destination.clone()));
        }
    }
    Ok(swipe::tally(ballots))
}
