use crate::error::{ConfigError, ConfigWarning};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Optional SCE-UA hyperparameters. Unset values are derived from the number
/// of parameters when the optimizer is built, see [`Hyperparameters`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceUaConfig {
    pub n_complexes: Option<usize>,
    pub n_points_per_complex: Option<usize>,
    pub n_evolution_steps: Option<usize>,
    /// Reflection coefficient (default 1.0)
    pub alpha: Option<f64>,
    /// Contraction coefficient (default 0.5)
    pub beta: Option<f64>,
    /// Seed for every random draw of a run; drawn from entropy when unset
    pub seed: Option<u64>,
    /// Evolve complexes on a rayon thread pool
    pub parallel: bool,
    /// Thread pool size when `parallel` is set (default: one per CPU, at most one per complex)
    pub threads: Option<usize>,
}

impl SceUaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_complexes(mut self, n_complexes: usize) -> Self {
        self.n_complexes = Some(n_complexes);
        self
    }

    pub fn with_points_per_complex(mut self, n_points: usize) -> Self {
        self.n_points_per_complex = Some(n_points);
        self
    }

    pub fn with_evolution_steps(mut self, n_steps: usize) -> Self {
        self.n_evolution_steps = Some(n_steps);
        self
    }

    /// Configure simplex coefficients (defaults: alpha=1.0, beta=0.5)
    pub fn with_coefficients(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = Some(alpha);
        self.beta = Some(beta);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Fill in defaults and validate. Runs once, at optimizer construction.
    pub(crate) fn resolve(
        &self,
        n_params: usize,
    ) -> Result<(Hyperparameters, Vec<ConfigWarning>), ConfigError> {
        if n_params == 0 {
            return Err(ConfigError::NoParameters);
        }

        let n_complexes = self.n_complexes.unwrap_or_else(|| (n_params / 2).clamp(2, 5));
        if n_complexes < 1 {
            return Err(ConfigError::NoComplexes);
        }

        let n_points_per_complex = self.n_points_per_complex.unwrap_or(2 * n_params + 1);
        if n_points_per_complex < 1 {
            return Err(ConfigError::NoPointsPerComplex);
        }

        let alpha = self.alpha.unwrap_or(1.0);
        if !alpha.is_finite() {
            return Err(ConfigError::InvalidCoefficient {
                name: "alpha",
                value: alpha,
            });
        }

        let beta = self.beta.unwrap_or(0.5);
        if !beta.is_finite() {
            return Err(ConfigError::InvalidCoefficient {
                name: "beta",
                value: beta,
            });
        }

        let mut warnings = Vec::new();
        if n_points_per_complex < n_params + 1 {
            warnings.push(ConfigWarning::TooFewPointsPerComplex {
                n_points_per_complex,
                recommended: n_params + 1,
            });
        }

        let threads = self
            .threads
            .unwrap_or_else(|| num_cpus::get().min(n_complexes))
            .max(1);

        let params = Hyperparameters {
            n_params,
            n_complexes,
            n_points_per_complex,
            n_evolution_steps: self.n_evolution_steps.unwrap_or(n_params + 1),
            n_points: n_complexes * n_points_per_complex,
            alpha,
            beta,
            seed: self.seed.unwrap_or_else(rand::random),
            parallel: self.parallel,
            threads,
        };

        Ok((params, warnings))
    }
}

/// Fully resolved, immutable hyperparameters of one optimizer instance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub n_params: usize,
    pub n_complexes: usize,
    pub n_points_per_complex: usize,
    pub n_evolution_steps: usize,
    /// Population size, `n_complexes * n_points_per_complex`
    pub n_points: usize,
    pub alpha: f64,
    pub beta: f64,
    pub seed: u64,
    pub parallel: bool,
    pub threads: usize,
}

impl Hyperparameters {
    /// Points drawn into each simplex; capped by the complex size.
    pub fn simplex_size(&self) -> usize {
        (self.n_params + 1).min(self.n_points_per_complex)
    }
}

/// Convergence threshold on the change of the best score between two
/// consecutive outer iterations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Tolerance {
    /// `|current - previous| < tol`
    Absolute(f64),
    /// `|current - previous| < tol * max(|current|, |previous|)`; never met while both are zero
    Relative(f64),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Absolute(1e-6)
    }
}

impl Tolerance {
    pub fn value(&self) -> f64 {
        match *self {
            Self::Absolute(tol) | Self::Relative(tol) => tol,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let tol = self.value();
        if !tol.is_finite() || tol < 0.0 {
            return Err(ConfigError::InvalidTolerance(tol));
        }
        Ok(())
    }

    pub fn is_converged(&self, previous: f64, current: f64) -> bool {
        let change = (current - previous).abs();
        match *self {
            Self::Absolute(tol) => change < tol,
            Self::Relative(tol) => change < tol * current.abs().max(previous.abs()),
        }
    }
}

/// Per-run options for [`SceUa::optimize`](super::SceUa::optimize).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeOptions {
    pub max_iterations: usize,
    pub tolerance: Tolerance,
    /// Log per-iteration progress at INFO instead of DEBUG
    pub verbose: bool,
    /// Stop once this many objective evaluations have been spent
    pub max_evaluations: Option<usize>,
    /// Stop once this much wall-clock time has elapsed
    pub max_duration: Option<Duration>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: Tolerance::default(),
            verbose: false,
            max_evaluations: None,
            max_duration: None,
        }
    }
}

impl OptimizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = Some(max_evaluations);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }
}
