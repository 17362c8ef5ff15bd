use serde::{Deserialize, Serialize};

// ===== ENUMS =====

/// Why an optimization run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Best score changed by less than the tolerance between two iterations
    Converged,
    MaxIterations,
    EvaluationBudget,
    TimeBudget,
    /// Stopped by an observer
    Cancelled,
}

impl Status {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Converged => "Converged",
            Self::MaxIterations => "Max iterations reached",
            Self::EvaluationBudget => "Evaluation budget exhausted",
            Self::TimeBudget => "Time budget exhausted",
            Self::Cancelled => "Stopped by observer",
        }
    }
}

// ===== CORE DATA TYPES =====

/// A parameter vector together with its (maximize-oriented) score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub params: Vec<f64>,
    pub score: f64,
}

impl Point {
    pub fn new(params: Vec<f64>, score: f64) -> Self {
        Self { params, score }
    }

    /// Sort best-first. The sort is stable, so equal scores keep their order.
    pub(crate) fn sort_descending(points: &mut [Point]) {
        points.sort_by(|a, b| b.score.total_cmp(&a.score));
    }
}

/// Snapshot of the best point after one outer iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub iteration: usize,
    pub best_params: Vec<f64>,
    pub best_score: f64,
}

/// Terminal snapshot of an optimization run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best_params: Vec<f64>,
    pub best_score: f64,
    pub n_iterations: usize,
    pub converged: bool,
    pub status: Status,
    pub n_evaluations: usize,
    pub history: Vec<HistoryEntry>,
}

impl OptimizationResult {
    pub fn message(&self) -> &'static str {
        self.status.message()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_best_first_and_stable() {
        let mut points = vec![
            Point::new(vec![0.0], 1.0),
            Point::new(vec![1.0], 3.0),
            Point::new(vec![2.0], 1.0),
            Point::new(vec![3.0], f64::NEG_INFINITY),
        ];
        Point::sort_descending(&mut points);

        let order: Vec<f64> = points.iter().map(|p| p.params[0]).collect();
        assert_eq!(order, vec![1.0, 0.0, 2.0, 3.0]);
    }

    #[test]
    fn result_serializes_status_in_snake_case() {
        let result = OptimizationResult {
            best_params: vec![1.0, 2.0],
            best_score: -0.5,
            n_iterations: 1,
            converged: false,
            status: Status::MaxIterations,
            n_evaluations: 10,
            history: vec![HistoryEntry {
                iteration: 1,
                best_params: vec![1.0, 2.0],
                best_score: -0.5,
            }],
        };

        let json = result.to_json().unwrap();
        assert!(json.contains("\"max_iterations\""));

        let back: OptimizationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
