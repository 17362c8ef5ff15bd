use crate::core::{HistoryEntry, OptimizationResult};
use crate::error::Error;
use crate::objective::{MultiObjective, ObjectiveFunction};
use crate::optimization::{
    Objective, OptimizeOptions, SceUa, SceUaConfig, Tolerance, optimize_sce_ua as run_sce_ua,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// A Python callable `f(params: list[float]) -> float` used as the objective.
struct PyCallable(PyObject);

impl Objective for PyCallable {
    type Error = PyErr;

    fn evaluate(&self, params: &[f64]) -> Result<f64, PyErr> {
        Python::with_gil(|py| self.0.call1(py, (params.to_vec(),))?.extract::<f64>(py))
    }
}

/// Raise the objective's own exception when it failed, a ValueError for bad
/// configuration and a RuntimeError otherwise.
fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::Objective(source) => match source.downcast::<PyErr>() {
            Ok(err) => *err,
            Err(other) => PyRuntimeError::new_err(other.to_string()),
        },
        Error::Config(err) => PyValueError::new_err(err.to_string()),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

#[pyclass(name = "SceUa")]
pub struct PySceUa {
    #[pyo3(get)]
    pub bounds: Vec<(f64, f64)>,
    config: SceUaConfig,
}

#[pymethods]
impl PySceUa {
    #[new]
    #[pyo3(signature = (
        bounds,
        n_complexes=None,
        n_points_per_complex=None,
        n_evolution_steps=None,
        alpha=None,
        beta=None,
        seed=None,
        parallel=false,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        bounds: Vec<(f64, f64)>,
        n_complexes: Option<usize>,
        n_points_per_complex: Option<usize>,
        n_evolution_steps: Option<usize>,
        alpha: Option<f64>,
        beta: Option<f64>,
        seed: Option<u64>,
        parallel: bool,
    ) -> PyResult<Self> {
        let config = SceUaConfig {
            n_complexes,
            n_points_per_complex,
            n_evolution_steps,
            alpha,
            beta,
            seed,
            parallel,
            threads: None,
        };

        // Fail at construction, not on the first optimize() call
        SceUa::with_config(|_: &[f64]| -> f64 { 0.0 }, bounds.clone(), &config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self { bounds, config })
    }

    #[getter]
    fn n_params(&self) -> usize {
        self.bounds.len()
    }

    /// Maximize `objective` over the bounds.
    #[pyo3(signature = (objective, max_iterations=50, tolerance=1e-6, verbose=false))]
    fn optimize(
        &self,
        py: Python<'_>,
        objective: PyObject,
        max_iterations: usize,
        tolerance: f64,
        verbose: bool,
    ) -> PyResult<PyOptimizationResult> {
        let mut sceua = SceUa::with_config(PyCallable(objective), self.bounds.clone(), &self.config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let options = OptimizeOptions::new()
            .with_max_iterations(max_iterations)
            .with_tolerance(Tolerance::Absolute(tolerance))
            .with_verbose(verbose);

        // Rayon workers take the GIL per evaluation, so it must be free here
        let result = py
            .allow_threads(|| sceua.optimize(&options))
            .map_err(to_py_err)?;
        Ok(result.into())
    }
}

#[pyclass(name = "OptimizationResult")]
pub struct PyOptimizationResult {
    #[pyo3(get)]
    pub best_params: Vec<f64>,
    #[pyo3(get)]
    pub best_score: f64,
    #[pyo3(get)]
    pub n_iterations: usize,
    #[pyo3(get)]
    pub converged: bool,
    #[pyo3(get)]
    pub n_evaluations: usize,
    #[pyo3(get)]
    pub message: String,
    /// `(iteration, best_params, best_score)` per outer iteration
    #[pyo3(get)]
    pub history: Vec<(usize, Vec<f64>, f64)>,
    json: String,
}

#[pymethods]
impl PyOptimizationResult {
    fn to_json(&self) -> String {
        self.json.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "OptimizationResult(best_score={}, n_iterations={}, converged={}, message='{}')",
            self.best_score, self.n_iterations, self.converged, self.message
        )
    }
}

impl From<OptimizationResult> for PyOptimizationResult {
    fn from(result: OptimizationResult) -> Self {
        let json = result.to_json().unwrap_or_default();
        Self {
            message: result.message().to_string(),
            history: result
                .history
                .into_iter()
                .map(|HistoryEntry { iteration, best_params, best_score }| {
                    (iteration, best_params, best_score)
                })
                .collect(),
            best_params: result.best_params,
            best_score: result.best_score,
            n_iterations: result.n_iterations,
            converged: result.converged,
            n_evaluations: result.n_evaluations,
            json,
        }
    }
}

#[pyclass(name = "ObjectiveFunction")]
pub struct PyObjectiveFunction {
    inner: ObjectiveFunction,
}

#[pymethods]
impl PyObjectiveFunction {
    #[new]
    #[pyo3(signature = (observed, metric="nse", maximize=true))]
    fn new(observed: Vec<f64>, metric: &str, maximize: bool) -> PyResult<Self> {
        let inner = ObjectiveFunction::from_name(observed, metric, maximize)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    #[getter]
    fn metric(&self) -> String {
        self.inner.metric().name().to_string()
    }

    #[getter]
    fn maximize(&self) -> bool {
        self.inner.maximize()
    }

    fn evaluate(&self, simulated: Vec<f64>) -> PyResult<f64> {
        self.inner
            .evaluate(&simulated)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __call__(&self, simulated: Vec<f64>) -> PyResult<f64> {
        self.evaluate(simulated)
    }
}

#[pyclass(name = "MultiObjective")]
pub struct PyMultiObjective {
    inner: MultiObjective,
}

#[pymethods]
impl PyMultiObjective {
    /// `weights` maps metric names to weights, e.g. `{"nse": 0.6, "rmse": 0.4}`.
    #[new]
    fn new(observed: Vec<f64>, weights: &PyDict) -> PyResult<Self> {
        let pairs = weights
            .iter()
            .map(|(name, weight)| Ok((name.extract::<String>()?, weight.extract::<f64>()?)))
            .collect::<PyResult<Vec<_>>>()?;
        let inner = MultiObjective::new(&observed, pairs)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    fn evaluate(&self, simulated: Vec<f64>) -> PyResult<f64> {
        self.inner
            .evaluate(&simulated)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __call__(&self, simulated: Vec<f64>) -> PyResult<f64> {
        self.evaluate(simulated)
    }

    /// Unweighted score per metric, in insertion order
    fn scores(&self, simulated: Vec<f64>) -> PyResult<Vec<(String, f64)>> {
        let scores = self
            .inner
            .scores(&simulated)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(scores.into_iter().collect())
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

/// Build a weighted evaluator, e.g.
/// `multi_objective(obs, {"nse": 0.6, "rmse": 0.4}).evaluate(sim)`.
#[pyfunction]
pub fn multi_objective(observed: Vec<f64>, weights: &PyDict) -> PyResult<PyMultiObjective> {
    PyMultiObjective::new(observed, weights)
}

/// Maximize `objective` over `bounds` in a single call.
#[pyfunction]
#[pyo3(signature = (
    objective,
    bounds,
    max_iterations=50,
    n_complexes=None,
    seed=None,
    parallel=false,
))]
pub fn optimize_sce_ua(
    py: Python<'_>,
    objective: PyObject,
    bounds: Vec<(f64, f64)>,
    max_iterations: usize,
    n_complexes: Option<usize>,
    seed: Option<u64>,
    parallel: bool,
) -> PyResult<PyOptimizationResult> {
    let config = SceUaConfig {
        n_complexes,
        seed,
        parallel,
        ..SceUaConfig::default()
    };
    let result = py
        .allow_threads(|| run_sce_ua(PyCallable(objective), bounds, max_iterations, &config))
        .map_err(to_py_err)?;
    Ok(result.into())
}
