use std::convert::Infallible;

/// Black-box function to MAXIMIZE over a box-bounded parameter space.
///
/// Evaluations are assumed expensive (typically a full model simulation) and
/// must be deterministic for a seeded run to be reproducible. `Sync` lets
/// complexes be evolved on several threads.
///
/// Plain closures `Fn(&[f64]) -> f64` implement this trait; wrap fallible
/// closures in [`TryObjective`].
pub trait Objective: Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Score a parameter vector (higher is better)
    fn evaluate(&self, params: &[f64]) -> Result<f64, Self::Error>;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    type Error = Infallible;

    fn evaluate(&self, params: &[f64]) -> Result<f64, Infallible> {
        Ok(self(params))
    }
}

/// Adapter for closures returning `Result<f64, E>`.
pub struct TryObjective<F>(pub F);

impl<F, E> Objective for TryObjective<F>
where
    F: Fn(&[f64]) -> Result<f64, E> + Sync,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn evaluate(&self, params: &[f64]) -> Result<f64, E> {
        (self.0)(params)
    }
}

/// Progress event emitted once per outer iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub iteration: usize,
    pub best_params: Vec<f64>,
    pub best_score: f64,
    /// Objective evaluations so far, including initialization
    pub evaluations: usize,
}

/// Callback interface for optimization progress
///
/// Closures `FnMut(&Progress)` implement this trait, and `()` is a no-op
/// observer.
pub trait Observer {
    /// Called after each outer iteration has been recorded
    fn on_iteration(&mut self, progress: &Progress);

    /// Checked between outer iterations only, never during an evaluation
    fn should_stop(&self) -> bool {
        false
    }
}

impl<F> Observer for F
where
    F: FnMut(&Progress),
{
    fn on_iteration(&mut self, progress: &Progress) {
        self(progress)
    }
}

impl Observer for () {
    fn on_iteration(&mut self, _progress: &Progress) {}
}
