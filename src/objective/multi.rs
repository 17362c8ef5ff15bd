use super::GoodnessOfFit;
use super::function::ObjectiveFunction;
use super::metric::Metric;
use crate::error::ObjectiveError;
use indexmap::IndexMap;

#[derive(Clone, Debug)]
struct Weighted {
    objective: ObjectiveFunction,
    weight: f64,
}

/// Linear combination of several metrics evaluated on the same series.
///
/// Weights are normalized by their literal sum, so they do not need to add up
/// to one. RMSE is always minimized; every other metric is maximized.
#[derive(Clone, Debug)]
pub struct MultiObjective {
    objectives: IndexMap<String, Weighted>,
    total_weight: f64,
}

impl MultiObjective {
    /// Build from `(metric name, weight)` pairs. A repeated name replaces the
    /// earlier weight.
    pub fn new<I, K>(observed: &[f64], weights: I) -> Result<Self, ObjectiveError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let metrics = weights
            .into_iter()
            .map(|(name, weight)| name.as_ref().parse::<Metric>().map(|m| (m, weight)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_metrics(observed, metrics)
    }

    pub fn from_metrics<I>(observed: &[f64], metrics: I) -> Result<Self, ObjectiveError>
    where
        I: IntoIterator<Item = (Metric, f64)>,
    {
        let mut objectives = IndexMap::new();
        for (metric, weight) in metrics {
            let maximize = !matches!(metric, Metric::Rmse);
            objectives.insert(
                metric.name().to_string(),
                Weighted {
                    objective: ObjectiveFunction::new(observed.to_vec(), metric, maximize),
                    weight,
                },
            );
        }

        let total_weight: f64 = objectives.values().map(|w| w.weight).sum();
        if total_weight == 0.0 {
            return Err(ObjectiveError::ZeroTotalWeight);
        }

        Ok(Self {
            objectives,
            total_weight,
        })
    }

    /// Weighted score: `sum(score_i * weight_i / sum(weights))`.
    pub fn evaluate(&self, simulated: &[f64]) -> Result<f64, ObjectiveError> {
        let mut combined = 0.0;
        for weighted in self.objectives.values() {
            let score = weighted.objective.evaluate(simulated)?;
            combined += score * (weighted.weight / self.total_weight);
        }
        Ok(combined)
    }

    /// Oriented score of every metric, in insertion order.
    pub fn scores(&self, simulated: &[f64]) -> Result<IndexMap<String, f64>, ObjectiveError> {
        self.objectives
            .iter()
            .map(|(name, weighted)| {
                weighted
                    .objective
                    .evaluate(simulated)
                    .map(|score| (name.clone(), score))
            })
            .collect()
    }

    /// Normalized weight of each metric.
    pub fn weights(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.objectives
            .iter()
            .map(|(name, w)| (name.as_str(), w.weight / self.total_weight))
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }
}

impl GoodnessOfFit for MultiObjective {
    fn score(&self, simulated: &[f64]) -> Result<f64, ObjectiveError> {
        self.evaluate(simulated)
    }
}

/// Shorthand for [`MultiObjective::new`].
pub fn multi_objective<I, K>(observed: &[f64], weights: I) -> Result<MultiObjective, ObjectiveError>
where
    I: IntoIterator<Item = (K, f64)>,
    K: AsRef<str>,
{
    MultiObjective::new(observed, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const OBSERVED: [f64; 5] = [10.0, 20.0, 30.0, 25.0, 15.0];

    #[test]
    fn perfect_fit_combines_normalized_weights() {
        let multi = multi_objective(&OBSERVED, [("nse", 0.6), ("rmse", 0.4)]).unwrap();
        // NSE = 1 and RMSE = 0 at a perfect fit
        assert_eq!(multi.evaluate(&OBSERVED).unwrap(), 0.6);
    }

    #[test]
    fn weights_need_not_sum_to_one() {
        let simulated = [12.0, 19.0, 28.0, 26.0, 14.0];
        let multi = MultiObjective::new(&OBSERVED, [("nse", 3.0), ("rmse", 1.0)]).unwrap();

        let expected = 0.956 * 0.75 - (2.2_f64).sqrt() * 0.25;
        assert_relative_eq!(multi.evaluate(&simulated).unwrap(), expected, epsilon = 1e-12);

        let weights: Vec<(&str, f64)> = multi.weights().collect();
        assert_eq!(weights, vec![("nse", 0.75), ("rmse", 0.25)]);
    }

    #[test]
    fn only_rmse_is_minimized() {
        let simulated = [12.0, 19.0, 28.0, 26.0, 14.0];
        let multi =
            MultiObjective::new(&OBSERVED, [("mae", 1.0), ("rmse", 1.0), ("pbias", 1.0)]).unwrap();
        let scores = multi.scores(&simulated).unwrap();

        assert_relative_eq!(scores["mae"], 1.4);
        assert!(scores["rmse"] < 0.0);
        assert_relative_eq!(scores["pbias"], 1.0);
    }

    #[test]
    fn rejects_unknown_metric_and_zero_weight() {
        assert_eq!(
            MultiObjective::new(&OBSERVED, [("nse", 1.0), ("foo", 1.0)]).unwrap_err(),
            ObjectiveError::UnknownMetric("foo".into())
        );
        assert_eq!(
            MultiObjective::new(&OBSERVED, [("nse", 0.0)]).unwrap_err(),
            ObjectiveError::ZeroTotalWeight
        );
    }

    #[test]
    fn propagates_length_mismatch() {
        let multi = MultiObjective::new(&OBSERVED, [("nse", 1.0)]).unwrap();
        assert!(matches!(
            multi.evaluate(&[1.0]),
            Err(ObjectiveError::LengthMismatch { expected: 5, actual: 1 })
        ));
    }
}
