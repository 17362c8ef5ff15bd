//! Goodness-of-fit objectives for calibrating simulation models against
//! observed time series.
//!
//! Every score produced here is maximize-oriented so it can be handed to the
//! optimizer unchanged.

pub mod calibration;
pub mod function;
pub mod metric;
pub mod multi;

pub use calibration::{Calibration, CalibrationError, Simulator};
pub use function::ObjectiveFunction;
pub use metric::{Metric, MetricFn};
pub use multi::{MultiObjective, multi_objective};

use crate::error::ObjectiveError;

/// Anything that turns a simulated series into a single score.
pub trait GoodnessOfFit {
    fn score(&self, simulated: &[f64]) -> Result<f64, ObjectiveError>;
}
