use strum_macros::{Display, EnumIter, EnumString};

/// Page origin: where the virtual return pictogram sits and where the
/// cursor lands after every page change.
pub const ORIGIN: (usize, usize) = (0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DistanceFormula {
    #[default]
    Euclidean,
    Manhattan,
}

impl DistanceFormula {
    /// Distance between two (row, col) slots.
    #[inline(always)]
    pub fn distance(self, a: (usize, usize), b: (usize, usize)) -> f64 {
        let dr = a.0.abs_diff(b.0) as f64;
        let dc = a.1.abs_diff(b.1) as f64;
        match self {
            Self::Euclidean => (dr * dr + dc * dc).sqrt(),
            Self::Manhattan => dr + dc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(DistanceFormula::Euclidean, (0, 0), (3, 4), 5.0)]
    #[case(DistanceFormula::Manhattan, (0, 0), (3, 4), 7.0)]
    #[case(DistanceFormula::Euclidean, (2, 1), (2, 1), 0.0)]
    #[case(DistanceFormula::Manhattan, (4, 0), (1, 2), 5.0)]
    fn test_distance(
        #[case] f: DistanceFormula,
        #[case] a: (usize, usize),
        #[case] b: (usize, usize),
        #[case] expected: f64,
    ) {
        assert!((f.distance(a, b) - expected).abs() < 1e-9);
        assert!((f.distance(b, a) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_names_round_trip() {
        for f in DistanceFormula::iter() {
            assert_eq!(DistanceFormula::from_str(&f.to_string()).unwrap(), f);
        }
        assert!(DistanceFormula::from_str("chebyshev").is_err());
    }
}
