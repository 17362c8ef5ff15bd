use rand::distributions::WeightedError;
use thiserror::Error;

/// Fatal problems with the optimizer configuration, detected at construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("at least one parameter bound is required")]
    NoParameters,

    #[error("bounds of dimension {dimension} must be finite, got ({min}, {max})")]
    NonFiniteBound { dimension: usize, min: f64, max: f64 },

    #[error("n_complexes must be at least 1")]
    NoComplexes,

    #[error("n_points_per_complex must be at least 1")]
    NoPointsPerComplex,

    #[error("{name} must be finite, got {value}")]
    InvalidCoefficient { name: &'static str, value: f64 },

    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
}

/// Non-fatal configuration issues. The run proceeds, but results may suffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error(
        "n_points_per_complex = {n_points_per_complex} is below the recommended minimum of \
         {recommended} (n_params + 1); simplex steps will use fewer points"
    )]
    TooFewPointsPerComplex {
        n_points_per_complex: usize,
        recommended: usize,
    },
}

/// Errors raised while building or evaluating an objective function.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectiveError {
    #[error("simulated series has {actual} values but the observed series has {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("unknown metric '{0}', expected one of: nse, rmse, mae, r2, pbias")]
    UnknownMetric(String),

    #[error("metric weights sum to zero")]
    ZeroTotalWeight,
}

/// Errors that end an optimization run.
///
/// A failed run never yields a partial result.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The caller's objective failed. The original error is kept as the source.
    #[error("objective function failed: {0}")]
    Objective(Box<dyn std::error::Error + Send + Sync>),

    #[error("weighted sub-complex sampling failed: {0}")]
    Sampling(#[from] WeightedError),

    #[error("failed to build the complex evolution thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn objective<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Objective(Box::new(error))
    }

    /// Returns the objective's own error if the run failed inside the objective.
    pub fn objective_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Objective(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
