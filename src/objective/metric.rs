use crate::error::ObjectiveError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// User-supplied goodness-of-fit function: `(observed, simulated) -> value`.
pub type MetricFn = dyn Fn(&[f64], &[f64]) -> f64 + Send + Sync;

/// Goodness-of-fit metric comparing a simulated series with an observed one.
///
/// All built-in metrics return `0.0` instead of failing when their natural
/// denominator is zero (constant or empty observations).
#[derive(Clone)]
pub enum Metric {
    /// Nash-Sutcliffe efficiency
    Nse,
    /// Root mean squared error
    Rmse,
    /// Mean absolute error
    Mae,
    /// Squared Pearson correlation
    R2,
    /// Percent bias
    Pbias,
    Custom { name: String, func: Arc<MetricFn> },
}

impl Metric {
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[f64], &[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Nse => "nse",
            Self::Rmse => "rmse",
            Self::Mae => "mae",
            Self::R2 => "r2",
            Self::Pbias => "pbias",
            Self::Custom { name, .. } => name.as_str(),
        }
    }

    /// Compute the raw metric value. Both slices must have the same length.
    pub fn compute(&self, observed: &[f64], simulated: &[f64]) -> f64 {
        debug_assert_eq!(observed.len(), simulated.len());
        match self {
            Self::Nse => nse(observed, simulated),
            Self::Rmse => rmse(observed, simulated),
            Self::Mae => mae(observed, simulated),
            Self::R2 => r2(observed, simulated),
            Self::Pbias => pbias(observed, simulated),
            Self::Custom { func, .. } => func(observed, simulated),
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
            other => f.write_str(other.name()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = ObjectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nse" => Ok(Self::Nse),
            "rmse" => Ok(Self::Rmse),
            "mae" => Ok(Self::Mae),
            "r2" => Ok(Self::R2),
            "pbias" => Ok(Self::Pbias),
            _ => Err(ObjectiveError::UnknownMetric(s.to_string())),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_squared_error(observed: &[f64], simulated: &[f64]) -> f64 {
    observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).powi(2))
        .sum()
}

pub fn nse(observed: &[f64], simulated: &[f64]) -> f64 {
    let obs_mean = mean(observed);
    let denominator: f64 = observed.iter().map(|o| (o - obs_mean).powi(2)).sum();
    if denominator == 0.0 {
        return 0.0;
    }
    1.0 - sum_squared_error(observed, simulated) / denominator
}

pub fn rmse(observed: &[f64], simulated: &[f64]) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    (sum_squared_error(observed, simulated) / observed.len() as f64).sqrt()
}

pub fn mae(observed: &[f64], simulated: &[f64]) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    let total: f64 = observed
        .iter()
        .zip(simulated)
        .map(|(o, s)| (o - s).abs())
        .sum();
    total / observed.len() as f64
}

pub fn r2(observed: &[f64], simulated: &[f64]) -> f64 {
    let obs_mean = mean(observed);
    let sim_mean = mean(simulated);

    let mut covariance = 0.0_f64;
    let mut obs_var = 0.0_f64;
    let mut sim_var = 0.0_f64;
    for (o, s) in observed.iter().zip(simulated) {
        let do_ = o - obs_mean;
        let ds = s - sim_mean;
        covariance += do_ * ds;
        obs_var += do_ * do_;
        sim_var += ds * ds;
    }

    let denominator = obs_var * sim_var;
    if denominator == 0.0 {
        return 0.0;
    }
    covariance.powi(2) / denominator
}

pub fn pbias(observed: &[f64], simulated: &[f64]) -> f64 {
    let total: f64 = observed.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let bias: f64 = observed.iter().zip(simulated).map(|(o, s)| o - s).sum();
    100.0 * bias / total
}
