use approx::{assert_abs_diff_eq, assert_relative_eq};
use sceua::objective::metric;
use sceua::{
    Calibration, CalibrationError, Metric, MultiObjective, ObjectiveError, ObjectiveFunction,
    OptimizeOptions, SceUa, SceUaConfig, Tolerance, multi_objective,
};
use std::convert::Infallible;
use std::fmt;

const OBSERVED: [f64; 5] = [10.0, 20.0, 30.0, 25.0, 15.0];
const SIMULATED: [f64; 5] = [12.0, 19.0, 28.0, 26.0, 14.0];

const RAIN: [f64; 24] = [
    0.0, 12.0, 30.0, 8.0, 0.0, 0.0, 4.0, 0.0, 0.0, 22.0, 15.0, 3.0, 0.0, 0.0, 0.0, 9.0, 1.0,
    0.0, 0.0, 18.0, 6.0, 0.0, 0.0, 0.0,
];

/// Linear reservoir: storage fills with `runoff * rain` and drains at rate `k`.
fn reservoir(k: f64, runoff: f64) -> Vec<f64> {
    let mut storage = 0.0_f64;
    RAIN.iter()
        .map(|rain| {
            storage += runoff * rain;
            let outflow = k * storage;
            storage -= outflow;
            outflow
        })
        .collect()
}

#[test]
fn metric_golden_values() {
    assert_relative_eq!(metric::nse(&OBSERVED, &SIMULATED), 0.956, epsilon = 1e-12);
    assert_relative_eq!(metric::rmse(&OBSERVED, &SIMULATED), 2.2_f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(Metric::Rmse.compute(&OBSERVED, &SIMULATED), 1.4832, epsilon = 1e-4);
    assert_relative_eq!(Metric::Mae.compute(&OBSERVED, &SIMULATED), 1.4);
    // observed sum 100, bias sum 1
    assert_relative_eq!(Metric::Pbias.compute(&OBSERVED, &SIMULATED), 1.0);
}

#[test]
fn minimized_metrics_score_negative() {
    let rmse = ObjectiveFunction::from_name(OBSERVED.to_vec(), "rmse", false).unwrap();
    let score = rmse.evaluate(&SIMULATED).unwrap();
    assert!(score < 0.0);
    assert_relative_eq!(score, -(2.2_f64.sqrt()), epsilon = 1e-12);

    let nse = ObjectiveFunction::from_name(OBSERVED.to_vec(), " NSE ", true).unwrap();
    assert_relative_eq!(nse.evaluate(&SIMULATED).unwrap(), 0.956, epsilon = 1e-12);
}

#[test]
fn unknown_metric_fails_at_construction() {
    let err = ObjectiveFunction::from_name(OBSERVED.to_vec(), "kge", true).unwrap_err();
    assert_eq!(err, ObjectiveError::UnknownMetric("kge".to_string()));
}

#[test]
fn custom_metric_is_called_with_both_series() {
    let max_error = Metric::custom("max_abs_error", |obs: &[f64], sim: &[f64]| {
        obs.iter()
            .zip(sim)
            .map(|(o, s)| (o - s).abs())
            .fold(0.0, f64::max)
    });
    let objective = ObjectiveFunction::new(OBSERVED.to_vec(), max_error, false);

    assert_eq!(objective.evaluate(&SIMULATED).unwrap(), -2.0);
    assert_eq!(objective.metric().name(), "max_abs_error");
}

#[test]
fn multi_objective_normalizes_weights() {
    let multi = multi_objective(&OBSERVED, [("nse", 0.6), ("rmse", 0.4)]).unwrap();
    assert_eq!(multi.evaluate(&OBSERVED).unwrap(), 0.6);

    // Weights need not sum to one
    let scaled = multi_objective(&OBSERVED, [("nse", 3.0), ("rmse", 2.0)]).unwrap();
    assert_relative_eq!(
        scaled.evaluate(&SIMULATED).unwrap(),
        multi.evaluate(&SIMULATED).unwrap(),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        multi.evaluate(&SIMULATED).unwrap(),
        0.6 * 0.956 - 0.4 * 2.2_f64.sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn multi_objective_rejects_zero_total_weight() {
    let err = MultiObjective::new(&OBSERVED, [("nse", 0.0), ("mae", 0.0)]).unwrap_err();
    assert_eq!(err, ObjectiveError::ZeroTotalWeight);
}

#[test]
fn calibrates_linear_reservoir() {
    let observed = reservoir(0.35, 0.6);
    let simulator = |p: &[f64]| -> Result<Vec<f64>, Infallible> { Ok(reservoir(p[0], p[1])) };
    let calibration = Calibration::new(
        simulator,
        ObjectiveFunction::new(observed, Metric::Nse, true),
    );

    let config = SceUaConfig::new().with_seed(31).with_complexes(3);
    let mut sceua =
        SceUa::with_config(calibration, vec![(0.01, 0.99), (0.1, 1.0)], &config).unwrap();
    let result = sceua
        .optimize(
            &OptimizeOptions::new()
                .with_max_iterations(150)
                .with_tolerance(Tolerance::Absolute(0.0)),
        )
        .unwrap();

    assert_abs_diff_eq!(result.best_params[0], 0.35, epsilon = 0.02);
    assert_abs_diff_eq!(result.best_params[1], 0.6, epsilon = 0.02);
    assert!(result.best_score > 0.99);
}

#[derive(Debug)]
struct Unstable(f64);

impl fmt::Display for Unstable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reservoir unstable for k = {}", self.0)
    }
}

impl std::error::Error for Unstable {}

#[test]
fn simulator_errors_reach_the_caller() {
    let simulator = |p: &[f64]| -> Result<Vec<f64>, Unstable> {
        if p[0] > 0.9 {
            return Err(Unstable(p[0]));
        }
        Ok(reservoir(p[0], p[1]))
    };
    let calibration = Calibration::new(
        simulator,
        ObjectiveFunction::new(reservoir(0.5, 0.5), Metric::Nse, true),
    );

    // Latin hypercube sampling puts exactly one initial point in (0.9, 1.0]
    let mut sceua = SceUa::with_config(
        calibration,
        vec![(0.0, 1.0), (0.0, 1.0)],
        &SceUaConfig::new().with_seed(3),
    )
    .unwrap();
    let err = sceua.optimize(&OptimizeOptions::new()).unwrap_err();

    let source = err
        .objective_error()
        .and_then(|e| e.downcast_ref::<CalibrationError<Unstable>>());
    assert!(matches!(source, Some(CalibrationError::Simulator(Unstable(k))) if *k > 0.9));
}

#[test]
fn series_length_mismatch_is_an_objective_error() {
    let simulator = |_: &[f64]| -> Result<Vec<f64>, Infallible> { Ok(vec![1.0; 3]) };
    let calibration = Calibration::new(
        simulator,
        ObjectiveFunction::new(OBSERVED.to_vec(), Metric::Mae, false),
    );
    let mut sceua = SceUa::with_config(
        calibration,
        vec![(0.0, 1.0)],
        &SceUaConfig::new().with_seed(1),
    )
    .unwrap();
    let err = sceua.optimize(&OptimizeOptions::new()).unwrap_err();

    let source = err
        .objective_error()
        .and_then(|e| e.downcast_ref::<CalibrationError<Infallible>>());
    assert!(matches!(
        source,
        Some(CalibrationError::Objective(ObjectiveError::LengthMismatch {
            expected: 5,
            actual: 3
        }))
    ));
}
