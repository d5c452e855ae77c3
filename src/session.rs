use tracing::info;

use crate::feasibility::{CostTable, MissingPricePolicy};
use crate::swipe::{tally, Ballot, BallotBox, Tally};
use crate::{compute_shortlist, Destination, Error, MemberPreference, ShortlistEntry};

/// Session lifecycle. Transitions are one-directional:
/// `Open → Closed → Swiping → Finished`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Collecting member preferences.
    Open,
    /// Shortlist computed and frozen.
    Closed,
    /// Collecting swipe ballots against the frozen shortlist.
    Swiping,
    /// Tally computed, winner(s) published.
    Finished,
}

/// One group decision round: the active criteria, the preferences submitted
/// so far, and (once closed) the frozen shortlist and its swipe ballots.
///
/// All updates take `&mut self`; a store holding sessions must serialize
/// updates per session so that concurrent resubmissions from the same member
/// cannot both persist.
pub struct Session {
    criteria: Vec<String>,
    members: Vec<MemberPreference>,
    shortlist: Vec<ShortlistEntry>,
    ballots: BallotBox,
    status: Status,
}

impl Session {
    pub fn new(criteria: Vec<String>) -> Self {
        Self {
            criteria,
            members: Vec::new(),
            shortlist: Vec::new(),
            ballots: BallotBox::default(),
            status: Status::Open,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn members(&self) -> &[MemberPreference] {
        &self.members
    }

    /// The frozen shortlist. Empty until the session is closed.
    pub fn shortlist(&self) -> &[ShortlistEntry] {
        &self.shortlist
    }

    fn expect(&self, status: Status) -> Result<(), Error> {
        if self.status != status {
            return Err(Error::InvalidTransition {
                from: self.status,
                to: status,
            });
        }
        Ok(())
    }

    /// Record a member's ratings. A resubmission replaces the member's prior
    /// entry. Ratings must match the active criteria dimension.
    pub fn submit_preference(&mut self, preference: MemberPreference) -> Result<(), Error> {
        self.expect(Status::Open)?;
        if preference.ratings.len() != self.criteria.len() {
            return Err(Error::DimensionMismatch {
                expected: self.criteria.len(),
                actual: preference.ratings.len(),
            });
        }
        self.members.retain(|m| m.member != preference.member);
        self.members.push(preference);
        Ok(())
    }

    /// Close the session: run feasibility, normalization, aggregation, and
    /// ranking, then freeze the resulting shortlist.
    ///
    /// Requires at least one submitted preference. `NoFeasibleDestinations`
    /// is terminal for the round: the error propagates, the session stays
    /// `Open`, and the caller is expected to abandon it.
    pub fn close<T: CostTable, const LIMIT: usize>(
        &mut self,
        destinations: &[Destination],
        costs: &T,
        departure_date: &str,
        policy: MissingPricePolicy,
    ) -> Result<&[ShortlistEntry], Error> {
        self.expect(Status::Open)?;
        if self.members.is_empty() {
            return Err(Error::EmptyPreferenceSet);
        }
        let shortlist = compute_shortlist::<T, LIMIT>(
            &self.criteria,
            destinations,
            &self.members,
            costs,
            departure_date,
            policy,
        )?;
        self.shortlist = shortlist.into_iter().collect();
        self.status = Status::Closed;
        info!(shortlist = self.shortlist.len(), "session closed");
        Ok(&self.shortlist)
    }

    /// Open the swipe round over the frozen shortlist.
    pub fn begin_swiping(&mut self) -> Result<(), Error> {
        self.expect(Status::Closed)?;
        // An empty shortlist cannot happen via `close`, which propagates
        // `NoFeasibleDestinations` instead; this guards sessions restored
        // from an external store.
        if self.shortlist.is_empty() {
            return Err(Error::NoFeasibleDestinations);
        }
        self.status = Status::Swiping;
        Ok(())
    }

    /// Record one swipe ballot. The destination must be on the frozen
    /// shortlist; a resubmission replaces the member's prior ballot for that
    /// destination.
    pub fn submit_ballot(&mut self, ballot: Ballot) -> Result<(), Error> {
        self.expect(Status::Swiping)?;
        if !self.shortlist.iter().any(|e| e.destination == ballot.destination) {
            return Err(Error::UnknownDestination(ballot.destination));
        }
        self.ballots.insert(ballot);
        Ok(())
    }

    /// Finish the round and compute the tally.
    pub fn finish(&mut self) -> Result<Tally, Error> {
        self.expect(Status::Swiping)?;
        self.status = Status::Finished;
        let tally = tally(&self.ballots);
        info!(verdict = ?tally.verdict, "session finished");
        Ok(tally)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::feasibility::StaticCostTable;
    use crate::swipe::{Choice, Verdict};
    use crate::Rating;
    use std::collections::BTreeMap;

    const DATE: &str = "2025-08-01";

    fn destination(name: &str, code: &str, nightlife: f64, fun: f64) -> Destination {
        Destination {
            name: name.to_string(),
            travel_code: code.to_string(),
            attributes: BTreeMap::from([
                ("adult_nightlife".to_string(), nightlife),
                ("fun".to_string(), fun),
            ]),
        }
    }

    fn preference(member: u64, ratings: &[f64], origin: &str, budget: f64) -> MemberPreference {
        MemberPreference {
            member,
            origin: Some(origin.to_string()),
            budget: Some(budget),
            ratings: ratings.iter().map(|r| Rating::new(*r).unwrap()).collect(),
        }
    }

    fn session() -> Session {
        Session::new(vec!["adult_nightlife".to_string(), "fun".to_string()])
    }

    fn fixtures() -> (Vec<Destination>, StaticCostTable) {
        let destinations = vec![
            destination("Lisbon", "LIS", 8.0, 6.0),
            destination("Tokyo", "NRT", 9.0, 9.0),
            destination("Oslo", "OSL", 2.0, 4.0),
        ];
        let mut costs = StaticCostTable::default();
        costs.insert("MUC", "LIS", DATE, 40.0);
        costs.insert("MUC", "NRT", DATE, 400.0);
        costs.insert("MUC", "OSL", DATE, 60.0);
        (destinations, costs)
    }

    #[test]
    fn full_round() {
        let (destinations, costs) = fixtures();
        let mut session = session();
        session
            .submit_preference(preference(1, &[5.0, 3.0], "MUC", 200.0))
            .unwrap();
        session
            .submit_preference(preference(2, &[3.0, 3.0], "MUC", 300.0))
            .unwrap();

        let shortlist = session
            .close::<_, 5>(&destinations, &costs, DATE, MissingPricePolicy::Permissive)
            .unwrap();
        // Tokyo is over everyone's budget; Lisbon and Oslo survive.
        let names: Vec<&str> = shortlist.iter().map(|e| e.destination.as_str()).collect();
        assert_eq!(names, vec!["Lisbon", "Oslo"]);

        session.begin_swiping().unwrap();
        session
            .submit_ballot(Ballot {
                member: 1,
                destination: "Lisbon".to_string(),
                choice: Choice::Yes,
            })
            .unwrap();
        session
            .submit_ballot(Ballot {
                member: 2,
                destination: "Lisbon".to_string(),
                choice: Choice::Yes,
            })
            .unwrap();

        let tally = session.finish().unwrap();
        assert_eq!(tally.verdict, Verdict::Winner("Lisbon".to_string()));
        assert_eq!(session.status(), Status::Finished);
    }

    #[test]
    fn preference_resubmission_replaces() {
        let mut session = session();
        session
            .submit_preference(preference(1, &[5.0, 5.0], "MUC", 200.0))
            .unwrap();
        session
            .submit_preference(preference(1, &[1.0, 1.0], "MUC", 200.0))
            .unwrap();
        assert_eq!(session.members().len(), 1);
        assert_eq!(session.members()[0].ratings[0], Rating::MIN);
    }

    #[test]
    fn cannot_close_without_preferences() {
        let (destinations, costs) = fixtures();
        let mut session = session();
        assert!(matches!(
            session.close::<_, 5>(&destinations, &costs, DATE, MissingPricePolicy::Permissive),
            Err(Error::EmptyPreferenceSet),
        ));
        assert_eq!(session.status(), Status::Open);
    }

    #[test]
    fn no_feasible_destinations_is_terminal() {
        let (destinations, costs) = fixtures();
        let mut session = session();
        session
            .submit_preference(preference(1, &[3.0, 3.0], "MUC", 10.0))
            .unwrap();
        assert!(matches!(
            session.close::<_, 5>(&destinations, &costs, DATE, MissingPricePolicy::Permissive),
            Err(Error::NoFeasibleDestinations),
        ));
        assert_eq!(session.status(), Status::Open);
    }

    #[test]
    fn transitions_are_one_directional() {
        let (destinations, costs) = fixtures();
        let mut session = session();
        session
            .submit_preference(preference(1, &[3.0, 3.0], "MUC", 500.0))
            .unwrap();
        session
            .close::<_, 5>(&destinations, &costs, DATE, MissingPricePolicy::Permissive)
            .unwrap();

        // Preferences are frozen once closed.
        assert!(matches!(
            session.submit_preference(preference(2, &[3.0, 3.0], "MUC", 500.0)),
            Err(Error::InvalidTransition { .. }),
        ));
        // Cannot tally before the swipe round starts.
        assert!(matches!(session.finish(), Err(Error::InvalidTransition { .. })));

        session.begin_swiping().unwrap();
        assert!(matches!(
            session.begin_swiping(),
            Err(Error::InvalidTransition { .. }),
        ));
    }

    #[test]
    fn ballot_must_be_on_shortlist() {
        let (destinations, costs) = fixtures();
        let mut session = session();
        session
            .submit_preference(preference(1, &[3.0, 3.0], "MUC", 500.0))
            .unwrap();
        session
            .close::<_, 5>(&destinations, &costs, DATE, MissingPricePolicy::Permissive)
            .unwrap();
        session.begin_swiping().unwrap();
        assert!(matches!(
            session.submit_ballot(Ballot {
                member: 1,
                destination: "Atlantis".to_string(),
                choice: Choice::Yes,
            }),
            Err(Error::UnknownDestination(_)),
        ));
    }
}
