use std::collections::BTreeMap;

use tracing::debug;

use crate::{Destination, MemberPreference};

/// Flight-price oracle, keyed by (origin, destination travel code, departure
/// date). Returns `None` when no price is known for the route.
pub trait CostTable {
    fn price(&self, origin: &str, travel_code: &str, date: &str) -> Option<f64>;
}

/// How the filter treats a destination with no known price for a member's
/// route. The permissive default avoids over-filtering on missing data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingPricePolicy {
    #[default]
    Permissive,
    Exclude,
}

/// An in-memory price table, keyed by (origin, travel code, date). Suitable
/// for precomputed fare dumps and tests.
#[derive(Default)]
pub struct StaticCostTable {
    prices: BTreeMap<(String, String, String), f64>,
}

impl StaticCostTable {
    pub fn insert(&mut self, origin: &str, travel_code: &str, date: &str, price: f64) {
        // Keep the lowest fare when multiple rows match the same route.
        self.prices
            .entry((origin.to_string(), travel_code.to_string(), date.to_string()))
            .and_modify(|p| *p = p.min(price))
            .or_insert(price);
    }
}

impl CostTable for StaticCostTable {
    fn price(&self, origin: &str, travel_code: &str, date: &str) -> Option<f64> {
        self.prices
            .get(&(origin.to_string(), travel_code.to_string(), date.to_string()))
            .copied()
    }
}

/// Remove every destination that any member cannot afford a round trip to.
///
/// Members are processed in input order, each narrowing the surviving set. A
/// member without both an origin and a budget filters nothing. The result is
/// always a subset of the input, in input order; it is empty as soon as one
/// member has no affordable destination left.
pub fn filter<'a, T: CostTable>(
    destinations: &'a [Destination],
    members: &[MemberPreference],
    costs: &T,
    departure_date: &str,
    policy: MissingPricePolicy,
) -> Vec<&'a Destination> {
    let mut surviving: Vec<&Destination> = destinations.iter().collect();
    for member in members {
        let (origin, budget) = match (&member.origin, member.budget) {
            (Some(origin), Some(budget)) => (origin, budget),
            _ => continue,
        };
        surviving.retain(|destination| {
            match costs.price(origin, &destination.travel_code, departure_date) {
                // Round trip estimated as twice the one-way fare.
                Some(price) => {
                    let affordable = 2.0 * price <= budget;
                    if !affordable {
                        debug!(
                            member = member.member,
                            destination = %destination.name,
                            price,
                            budget,
                            "destination over budget"
                        );
                    }
                    affordable
                }
                None => policy == MissingPricePolicy::Permissive,
            }
        });
        if surviving.is_empty() {
            debug!(member = member.member, "no affordable destinations remain");
            return surviving;
        }
    }
    surviving
}
