//! Shuffled Complex Evolution (SCE-UA) global optimization for calibrating
//! simulation-model parameters against observations.
//!
//! ```no_run
//! use sceua::{ObjectiveFunction, OptimizeOptions, SceUa, SceUaConfig};
//!
//! let observed = vec![1.0, 2.0, 3.0, 2.5];
//! let fit = ObjectiveFunction::from_name(observed, "nse", true).unwrap();
//! let model = |p: &[f64]| -> f64 {
//!     let simulated: Vec<f64> = (1..=4).map(|t| p[0] * t as f64 + p[1]).collect();
//!     fit.evaluate(&simulated).unwrap_or(f64::NEG_INFINITY)
//! };
//!
//! let mut sceua =
//!     SceUa::with_config(model, vec![(0.0, 2.0), (-1.0, 1.0)], &SceUaConfig::new().with_seed(7))
//!         .unwrap();
//! let result = sceua.optimize(&OptimizeOptions::new()).unwrap();
//! println!("{} after {} iterations", result.best_score, result.n_iterations);
//! ```

pub mod core;
pub mod error;
pub mod logger;
pub mod objective;
pub mod optimization;
pub mod settings;

#[cfg(feature = "python")]
mod python;

pub use crate::core::{Bounds, HistoryEntry, OptimizationResult, Point, Status};
pub use error::{ConfigError, ConfigWarning, Error, ObjectiveError};
pub use objective::{
    Calibration, CalibrationError, Metric, MultiObjective, ObjectiveFunction, Simulator,
    multi_objective,
};
pub use optimization::{
    CancelToken, Hyperparameters, Objective, Observer, OptimizeOptions, Phase, Progress, SceUa,
    SceUaConfig, Tolerance, TryObjective, optimize_sce_ua,
};
pub use settings::{Settings, SettingsError};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn sceua(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<python::PySceUa>()?;
    m.add_class::<python::PyObjectiveFunction>()?;
    m.add_class::<python::PyOptimizationResult>()?;
    m.add_class::<python::PyMultiObjective>()?;
    m.add_function(wrap_pyfunction!(python::multi_objective, m)?)?;
    m.add_function(wrap_pyfunction!(python::optimize_sce_ua, m)?)?;

    Ok(())
}
