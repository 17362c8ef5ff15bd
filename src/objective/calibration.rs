use super::GoodnessOfFit;
use crate::error::ObjectiveError;
use crate::optimization::Objective;
use thiserror::Error;

/// External simulation model: maps a parameter vector to a simulated series.
///
/// Closures `Fn(&[f64]) -> Result<Vec<f64>, E>` implement this trait.
pub trait Simulator: Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn simulate(&self, params: &[f64]) -> Result<Vec<f64>, Self::Error>;
}

impl<F, E> Simulator for F
where
    F: Fn(&[f64]) -> Result<Vec<f64>, E> + Sync,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn simulate(&self, params: &[f64]) -> Result<Vec<f64>, E> {
        self(params)
    }
}

#[derive(Debug, Error)]
pub enum CalibrationError<E> {
    #[error("simulation failed: {0}")]
    Simulator(#[source] E),

    #[error(transparent)]
    Objective(#[from] ObjectiveError),
}

/// Runs the simulator for each candidate and scores its output, turning a
/// model plus observations into something the optimizer can maximize.
pub struct Calibration<S, G> {
    simulator: S,
    fit: G,
}

impl<S, G> Calibration<S, G>
where
    S: Simulator,
    G: GoodnessOfFit + Sync,
{
    pub fn new(simulator: S, fit: G) -> Self {
        Self { simulator, fit }
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn fit(&self) -> &G {
        &self.fit
    }
}

impl<S, G> Objective for Calibration<S, G>
where
    S: Simulator,
    G: GoodnessOfFit + Sync,
{
    type Error = CalibrationError<S::Error>;

    fn evaluate(&self, params: &[f64]) -> Result<f64, Self::Error> {
        let simulated = self
            .simulator
            .simulate(params)
            .map_err(CalibrationError::Simulator)?;
        Ok(self.fit.score(&simulated)?)
    }
}
