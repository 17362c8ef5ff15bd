use super::GoodnessOfFit;
use super::metric::Metric;
use crate::error::ObjectiveError;

/// Scores a simulated series against a fixed observed series.
///
/// The result is always maximize-oriented: when `maximize` is false the metric
/// value is negated, so an error metric like RMSE can be handed directly to the
/// optimizer.
#[derive(Clone, Debug)]
pub struct ObjectiveFunction {
    observed: Vec<f64>,
    metric: Metric,
    maximize: bool,
}

impl ObjectiveFunction {
    pub fn new(observed: Vec<f64>, metric: Metric, maximize: bool) -> Self {
        Self {
            observed,
            metric,
            maximize,
        }
    }

    /// Build from a metric name (`nse`, `rmse`, `mae`, `r2`, `pbias`).
    pub fn from_name(
        observed: Vec<f64>,
        metric: &str,
        maximize: bool,
    ) -> Result<Self, ObjectiveError> {
        Ok(Self::new(observed, metric.parse()?, maximize))
    }

    pub fn evaluate(&self, simulated: &[f64]) -> Result<f64, ObjectiveError> {
        if simulated.len() != self.observed.len() {
            return Err(ObjectiveError::LengthMismatch {
                expected: self.observed.len(),
                actual: simulated.len(),
            });
        }

        let value = self.metric.compute(&self.observed, simulated);
        Ok(if self.maximize { value } else { -value })
    }

    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn maximize(&self) -> bool {
        self.maximize
    }
}

impl GoodnessOfFit for ObjectiveFunction {
    fn score(&self, simulated: &[f64]) -> Result<f64, ObjectiveError> {
        self.evaluate(simulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn observed() -> Vec<f64> {
        vec![10.0, 20.0, 30.0, 25.0, 15.0]
    }

    const SIMULATED: [f64; 5] = [12.0, 19.0, 28.0, 26.0, 14.0];

    #[test]
    fn nse_golden_value() {
        let objective = ObjectiveFunction::new(observed(), Metric::Nse, true);
        assert_relative_eq!(objective.evaluate(&SIMULATED).unwrap(), 0.956, epsilon = 1e-12);
    }

    #[test]
    fn minimized_metric_is_negated() {
        let objective = ObjectiveFunction::from_name(observed(), "rmse", false).unwrap();
        let score = objective.evaluate(&SIMULATED).unwrap();
        assert!(score < 0.0);
        assert_relative_eq!(score, -(2.2_f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn rejects_length_mismatch() {
        let objective = ObjectiveFunction::new(observed(), Metric::Mae, false);
        assert_eq!(
            objective.evaluate(&[1.0, 2.0]),
            Err(ObjectiveError::LengthMismatch {
                expected: 5,
                actual: 2
            })
        );
    }

    #[test]
    fn rejects_unknown_metric_name() {
        let err = ObjectiveFunction::from_name(observed(), "bogus", true).unwrap_err();
        assert_eq!(err, ObjectiveError::UnknownMetric("bogus".into()));
    }

    #[test]
    fn custom_metric_respects_orientation() {
        let sse = Metric::custom("sse", |obs, sim| {
            obs.iter().zip(sim).map(|(o, s)| (o - s).powi(2)).sum()
        });
        let objective = ObjectiveFunction::new(observed(), sse, false);
        assert_relative_eq!(objective.evaluate(&SIMULATED).unwrap(), -11.0);
    }
}
