use arrayvec::ArrayVec;
use ordered_float::NotNan;

use crate::num::{euclidean_distance, Rating};
use crate::{Destination, ShortlistEntry};

/// Order destinations by Euclidean distance between their normalized
/// attribute vectors and the group preference vector, ascending (lower
/// distance = better match), and keep the best `LIMIT`.
///
/// `vectors[i]` is the normalized attribute vector of `destinations[i]`.
/// Ties in distance preserve input order. If fewer than `LIMIT` destinations
/// are given, all of them are returned.
pub fn rank<const LIMIT: usize>(
    destinations: &[&Destination],
    vectors: &[Vec<Rating>],
    group_vector: &[Rating],
) -> ArrayVec<ShortlistEntry, LIMIT> {
    debug_assert_eq!(destinations.len(), vectors.len());
    let distances: Vec<NotNan<f64>> = vectors
        .iter()
        .map(|vector| euclidean_distance(vector, group_vector))
        .collect();
    // Stable sort, so equal distances keep their input order.
    let order = permutation::sort_by_key(&distances, |distance| *distance);
    let by_distance = order.apply_slice(&distances);
    let reordered = order.apply_slice(destinations);
    by_distance
        .into_iter()
        .zip(reordered)
        .take(LIMIT)
        .map(|(distance, destination)| ShortlistEntry {
            destination: destination.name.clone(),
            distance,
        })
        .collect()
}
