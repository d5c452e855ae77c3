use std::collections::BTreeMap;

use tracing::debug;

use crate::MemberId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

/// One member's yes/no vote on a single shortlisted destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ballot {
    pub member: MemberId,
    pub destination: String,
    pub choice: Choice,
}

/// The ballots of one swipe round. A member holds at most one ballot per
/// destination: resubmitting replaces the prior ballot (remove-then-insert),
/// so counts can never be corrupted by duplicates. No-ballots are retained
/// for audit even though only yes-ballots decide the winner.
#[derive(Debug, Default)]
pub struct BallotBox {
    ballots: Vec<Ballot>,
}

impl BallotBox {
    pub fn insert(&mut self, ballot: Ballot) {
        let prior = self.ballots.len();
        self.ballots
            .retain(|b| !(b.member == ballot.member && b.destination == ballot.destination));
        if self.ballots.len() < prior {
            debug!(
                member = ballot.member,
                destination = %ballot.destination,
                "replacing earlier ballot"
            );
        }
        self.ballots.push(ballot);
    }

    /// Drop every ballot a member has cast, ahead of a batch resubmission.
    pub fn remove_member(&mut self, member: MemberId) {
        self.ballots.retain(|b| b.member != member);
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }
}

/// Outcome of a swipe round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Winner(String),
    /// Multiple destinations share the maximum yes-count. The full tied set
    /// is preserved; callers must render it, never pick one arbitrarily.
    Tie(Vec<String>),
    /// No yes-ballots were cast at all.
    Undecided,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    pub verdict: Verdict,
    /// Yes-ballots per destination. Destinations nobody approved are absent.
    pub yes_counts: BTreeMap<String, u32>,
}

/// Count yes-ballots per destination and derive the verdict. The winner set
/// is every destination achieving the maximum count; a set of one is a
/// `Winner`, more is an explicit `Tie`. Zero yes-ballots is `Undecided`,
/// which is distinct from a tie at some positive count.
pub fn tally(ballots: &BallotBox) -> Tally {
    let mut yes_counts: BTreeMap<String, u32> = BTreeMap::new();
    for ballot in ballots.ballots() {
        if ballot.choice == Choice::Yes {
            *yes_counts.entry(ballot.destination.clone()).or_default() += 1;
        }
    }
    let max = yes_counts.values().max().copied();
    let verdict = match max {
        None => Verdict::Undecided,
        Some(max) => {
            let mut winners: Vec<String> = yes_counts
                .iter()
                .filter(|(_, count)| **count == max)
                .map(|(destination, _)| destination.clone())
                .collect();
            if winners.len() == 1 {
                Verdict::Winner(winners.pop().unwrap())
            } else {
                Verdict::Tie(winners)
            }
        }
    };
    Tally { verdict, yes_counts }
}
