use itertools::Itertools as _;
use itertools::MinMaxResult;

use crate::num::Rating;
use crate::{Error, MemberPreference};

/// Rescale each criterion column of the surviving destination set onto the
/// rating scale, so criteria with different native ranges contribute equally
/// to the distance metric.
///
/// `columns[j]` holds the raw values of criterion `j` across all surviving
/// destinations. Within each column the minimum maps to `Rating::MIN` and the
/// maximum to `Rating::MAX`; a column with identical values maps to
/// `Rating::MID`. Normalization is relative to the surviving set only, so the
/// output depends on which destinations passed the feasibility filter.
pub fn normalize_columns(columns: &[Vec<f64>]) -> Vec<Vec<Rating>> {
    columns
        .iter()
        .map(|column| {
            let (min, max) = match column.iter().minmax() {
                MinMaxResult::MinMax(min, max) if min < max => (*min, *max),
                // Degenerate column: a single destination, or all values equal.
                _ => return vec![Rating::MID; column.len()],
            };
            let span = (Rating::MAX.as_f64() - Rating::MIN.as_f64()) / (max - min);
            column
                .iter()
                .map(|value| {
                    let scaled = Rating::MIN.as_f64() + (value - min) * span;
                    // Guard the scale bounds against f64 rounding at the edges.
                    Rating::clamp(scaled).unwrap()
                })
                .collect()
        })
        .collect()
}

/// Reduce all members' rating vectors to the group preference vector: the
/// element-wise arithmetic mean, in active-criteria order. Every member
/// weighs equally. An empty member set has no meaningful mean and is
/// rejected.
pub fn aggregate(members: &[MemberPreference]) -> Result<Vec<Rating>, Error> {
    let first = members.first().ok_or(Error::EmptyPreferenceSet)?;
    let dimension = first.ratings.len();
    for member in members {
        if member.ratings.len() != dimension {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                actual: member.ratings.len(),
            });
        }
    }
    let group = (0..dimension)
        .map(|j| {
            let sum: f64 = members.iter().map(|m| m.ratings[j].as_f64()).sum();
            // The mean stays on the scale up to f64 rounding of the sum.
            Rating::clamp(sum / members.len() as f64).unwrap()
        })
        .collect();
    Ok(group)
}
