use ordered_float::NotNan;

/// A non-NaN f64 value on the rating scale [1, 5].
///
/// Both raw member ratings and normalized destination attributes live on this
/// scale, so distances between them are directly comparable.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rating(NotNan<f64>);

impl Rating {
    pub const MIN: Self = Self(unsafe { NotNan::new_unchecked(1.0) });
    pub const MID: Self = Self(unsafe { NotNan::new_unchecked(3.0) });
    pub const MAX: Self = Self(unsafe { NotNan::new_unchecked(5.0) });

    pub fn new(value: f64) -> Option<Self> {
        let value = NotNan::new(value).ok()?;
        if *value < *Self::MIN.0 || *value > *Self::MAX.0 {
            return None;
        }
        Some(Self(value))
    }

    /// Clamp an arbitrary value onto the scale. Returns `None` only for NaN.
    pub fn clamp(value: f64) -> Option<Self> {
        Self::new(value.clamp(*Self::MIN.0, *Self::MAX.0))
    }

    pub fn as_f64(&self) -> f64 {
        self.0.into_inner()
    }

    pub fn as_inner(&self) -> NotNan<f64> {
        self.0
    }
}

impl std::cmp::PartialOrd for Rating {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl std::cmp::Ord for Rating {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Debug for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Euclidean distance between two equal-length rating vectors.
pub fn euclidean_distance(a: &[Rating], b: &[Rating]) -> NotNan<f64> {
    debug_assert_eq!(a.len(), b.len());
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(a, b)| (a.as_f64() - b.as_f64()).powi(2))
        .sum();
    NotNan::new(sum.sqrt()).unwrap()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert_eq!(Rating::new(1.0), Some(Rating::MIN));
        assert_eq!(Rating::new(5.0), Some(Rating::MAX));
        assert_eq!(Rating::new(0.99), None);
        assert_eq!(Rating::new(5.01), None);
        assert_eq!(Rating::new(f64::NAN), None);
        assert_eq!(Rating::clamp(7.3), Some(Rating::MAX));
        assert_eq!(Rating::clamp(f64::NAN), None);
    }

    #[test]
    fn distance() {
        let a = [Rating::new(5.0).unwrap(), Rating::new(1.0).unwrap()];
        let b = [Rating::new(3.0).unwrap(), Rating::new(3.0).unwrap()];
        assert_eq!(*euclidean_distance(&a, &a), 0.0);
        assert_eq!(*euclidean_distance(&a, &b), 8.0_f64.sqrt());
    }
}
