use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Box bounds of the search space, one `(lower, upper)` pair per parameter.
///
/// `lower < upper` is expected but not enforced. A zero-width dimension
/// collapses that axis to a single value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct Bounds {
    ranges: Vec<(f64, f64)>,
}

impl Bounds {
    pub fn new(ranges: Vec<(f64, f64)>) -> Result<Self, ConfigError> {
        if ranges.is_empty() {
            return Err(ConfigError::NoParameters);
        }

        for (i, &(min, max)) in ranges.iter().enumerate() {
            if !min.is_finite() || !max.is_finite() {
                return Err(ConfigError::NonFiniteBound {
                    dimension: i,
                    min,
                    max,
                });
            }
            if min > max {
                tracing::warn!(dimension = i, min, max, "Lower bound exceeds upper bound");
            }
        }

        Ok(Self { ranges })
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.ranges
    }

    /// Clamp every component into its dimension's bounds (modifies params in place)
    #[inline]
    pub fn clamp(&self, params: &mut [f64]) {
        for (value, &(min, max)) in params.iter_mut().zip(self.ranges.iter()) {
            *value = clamp_to(*value, min, max);
        }
    }

    pub fn contains(&self, params: &[f64]) -> bool {
        params.len() == self.ranges.len()
            && params
                .iter()
                .zip(self.ranges.iter())
                .all(|(&v, &(min, max))| v >= min && v <= max)
    }

    /// Map a unit-interval value onto dimension `dim`.
    #[inline]
    pub fn scale(&self, dim: usize, unit: f64) -> f64 {
        let (min, max) = self.ranges[dim];
        clamp_to(min + unit * (max - min), min, max)
    }

    /// Draw a point uniformly and independently per dimension.
    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        (0..self.ranges.len())
            .map(|dim| self.scale(dim, rng.gen_range(0.0..1.0)))
            .collect()
    }
}

impl TryFrom<Vec<(f64, f64)>> for Bounds {
    type Error = ConfigError;

    fn try_from(ranges: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        Self::new(ranges)
    }
}

impl From<Bounds> for Vec<(f64, f64)> {
    fn from(bounds: Bounds) -> Self {
        bounds.ranges
    }
}

// f64::clamp panics when min > max; bounds are not required to be ordered.
#[inline]
fn clamp_to(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rejects_empty_bounds() {
        assert_eq!(Bounds::new(vec![]), Err(ConfigError::NoParameters));
    }

    #[test]
    fn rejects_non_finite_bounds() {
        assert!(matches!(
            Bounds::new(vec![(0.0, 1.0), (f64::NEG_INFINITY, 1.0)]),
            Err(ConfigError::NonFiniteBound { dimension: 1, .. })
        ));
        assert!(matches!(
            Bounds::new(vec![(0.0, f64::INFINITY)]),
            Err(ConfigError::NonFiniteBound { dimension: 0, .. })
        ));
        assert!(matches!(
            Bounds::new(vec![(f64::NAN, 1.0)]),
            Err(ConfigError::NonFiniteBound { dimension: 0, .. })
        ));
    }

    #[test]
    fn clamps_each_dimension_independently() {
        let bounds = Bounds::new(vec![(0.0, 1.0), (-5.0, 5.0)]).unwrap();
        let mut params = vec![1.5, -7.0];
        bounds.clamp(&mut params);
        assert_eq!(params, vec![1.0, -5.0]);
        assert!(bounds.contains(&params));
    }

    #[test]
    fn zero_width_dimension_collapses() {
        let bounds = Bounds::new(vec![(2.0, 2.0), (0.0, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let point = bounds.sample_uniform(&mut rng);
            assert_eq!(point[0], 2.0);
            assert!(bounds.contains(&point));
        }
    }

    #[test]
    fn deserializes_from_pairs() {
        let bounds: Bounds = serde_json::from_str("[[0.0, 1.0], [10.0, 20.0]]").unwrap();
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds.as_slice()[1], (10.0, 20.0));

        assert!(serde_json::from_str::<Bounds>("[]").is_err());
    }
}
