//! Shuffled Complex Evolution (SCE-UA) global optimizer.
//!
//! # Algorithm
//!
//! A Latin-hypercube population is sorted best-first and dealt round-robin
//! into complexes. Each complex evolves on its own through competitive
//! complex evolution (CCE): rank-weighted sub-complexes take simplex steps
//! (reflection, contraction, random restart) that replace their worst member
//! when the candidate improves on it. The complexes are then merged, re-sorted
//! and dealt again. Shuffling shares information between complexes while the
//! independent evolution keeps diversity.
//!
//! # Termination
//!
//! A run stops when the best score changes by less than the [`Tolerance`]
//! between two outer iterations, after `max_iterations`, when an optional
//! evaluation or wall-clock budget is spent, or when the [`Observer`] asks to
//! stop. Budgets and observers are only consulted between outer iterations.
//!
//! # Reproducibility
//!
//! All randomness comes from one seeded master stream. Every outer iteration
//! draws one seed per complex, so serial and parallel runs with the same seed
//! give identical results.
//!
//! Reference: Duan, Sorooshian & Gupta (1992), Water Resources Research 28(4).

mod config;
mod evolution;
mod population;

pub use self::config::{Hyperparameters, OptimizeOptions, SceUaConfig, Tolerance};

use super::traits::{Objective, Observer, Progress};
use crate::core::{Bounds, HistoryEntry, OptimizationResult, Point, Status};
use crate::error::{ConfigError, ConfigWarning, Error};
use evolution::{Evolved, Evolver};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::Instant;

/// Lifecycle of an optimizer instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    Evolving,
    Finished(Status),
}

/// SCE-UA optimizer bound to one objective and one search box.
pub struct SceUa<O> {
    objective: O,
    bounds: Bounds,
    params: Hyperparameters,
    warnings: Vec<ConfigWarning>,
    population: Vec<Point>,
    history: Vec<HistoryEntry>,
    phase: Phase,
}

impl<O: Objective> SceUa<O> {
    /// Build with default hyperparameters.
    pub fn new(objective: O, bounds: Vec<(f64, f64)>) -> Result<Self, ConfigError> {
        Self::with_config(objective, bounds, &SceUaConfig::default())
    }

    pub fn with_config(
        objective: O,
        bounds: Vec<(f64, f64)>,
        config: &SceUaConfig,
    ) -> Result<Self, ConfigError> {
        let bounds = Bounds::new(bounds)?;
        let (params, warnings) = config.resolve(bounds.len())?;

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        Ok(Self {
            objective,
            bounds,
            params,
            warnings,
            population: Vec::new(),
            history: Vec::new(),
            phase: Phase::Uninitialized,
        })
    }

    pub fn n_params(&self) -> usize {
        self.params.n_params
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.params
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Non-fatal configuration issues found at construction
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Population after the latest initialization or iteration, best first
    pub fn population(&self) -> &[Point] {
        &self.population
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the optimizer without an observer.
    ///
    /// # Errors
    ///
    /// Returns the objective's error unchanged (boxed in [`Error::Objective`])
    /// as soon as any evaluation fails; no partial result is produced.
    pub fn optimize(&mut self, options: &OptimizeOptions) -> Result<OptimizationResult, Error> {
        self.optimize_with(options, ())
    }

    /// Run the optimizer, reporting every outer iteration to `observer`.
    ///
    /// Each call starts from a fresh population drawn from the configured seed,
    /// so repeated calls on the same instance reproduce the same run.
    pub fn optimize_with<Obs: Observer>(
        &mut self,
        options: &OptimizeOptions,
        mut observer: Obs,
    ) -> Result<OptimizationResult, Error> {
        options.tolerance.validate()?;

        let started = Instant::now();
        let params = self.params;
        let mut master = StdRng::seed_from_u64(params.seed);
        let pool = self.thread_pool()?;

        self.history.clear();
        self.phase = Phase::Uninitialized;
        self.population = population::initialize(
            &self.objective,
            &self.bounds,
            params.n_points,
            &mut master,
            pool.as_ref(),
        )?;
        self.phase = Phase::Initialized;

        let mut evaluations = params.n_points;
        let mut previous_best = self.population[0].score;
        tracing::debug!(
            n_points = params.n_points,
            n_complexes = params.n_complexes,
            seed = params.seed,
            best_score = previous_best,
            "Initialized population"
        );

        let mut status = Status::MaxIterations;
        for iteration in 1..=options.max_iterations {
            self.phase = Phase::Evolving;

            let complexes = population::partition(&self.population, params.n_complexes);
            let seeds: Vec<u64> = (0..params.n_complexes).map(|_| master.next_u64()).collect();
            let evolver = Evolver::new(&self.objective, &self.bounds, params);

            let evolve = |(complex, seed): (Vec<Point>, u64)| {
                evolver.evolve(complex, &mut StdRng::seed_from_u64(seed))
            };
            let results: Vec<Result<Evolved, Error>> = match &pool {
                Some(pool) => pool.install(|| {
                    complexes
                        .into_par_iter()
                        .zip(seeds.into_par_iter())
                        .map(evolve)
                        .collect()
                }),
                None => complexes.into_iter().zip(seeds).map(evolve).collect(),
            };

            // Recombine in complex order, whatever order the work finished in
            let mut complexes = Vec::with_capacity(results.len());
            for result in results {
                let evolved = result?;
                evaluations += evolved.evaluations;
                complexes.push(evolved.complex);
            }
            self.population = population::recombine(complexes);

            let best = &self.population[0];
            self.history.push(HistoryEntry {
                iteration,
                best_params: best.params.clone(),
                best_score: best.score,
            });

            if options.verbose {
                tracing::info!(
                    iteration,
                    best_score = best.score,
                    evaluations,
                    "SCE-UA iteration"
                );
            } else {
                tracing::debug!(
                    iteration,
                    best_score = best.score,
                    evaluations,
                    "SCE-UA iteration"
                );
            }

            observer.on_iteration(&Progress {
                iteration,
                best_params: best.params.clone(),
                best_score: best.score,
                evaluations,
            });

            if options.tolerance.is_converged(previous_best, best.score) {
                status = Status::Converged;
                break;
            }
            previous_best = best.score;

            if observer.should_stop() {
                status = Status::Cancelled;
                break;
            }
            if options.max_evaluations.is_some_and(|max| evaluations >= max) {
                status = Status::EvaluationBudget;
                break;
            }
            if options
                .max_duration
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                status = Status::TimeBudget;
                break;
            }
        }

        self.phase = Phase::Finished(status);
        let best = &self.population[0];

        if options.verbose {
            tracing::info!(
                status = status.message(),
                iterations = self.history.len(),
                best_score = best.score,
                evaluations,
                "SCE-UA finished"
            );
        } else {
            tracing::debug!(
                status = status.message(),
                iterations = self.history.len(),
                best_score = best.score,
                evaluations,
                "SCE-UA finished"
            );
        }

        Ok(OptimizationResult {
            best_params: best.params.clone(),
            best_score: best.score,
            n_iterations: self.history.len(),
            converged: status == Status::Converged,
            status,
            n_evaluations: evaluations,
            history: self.history.clone(),
        })
    }

    fn thread_pool(&self) -> Result<Option<ThreadPool>, Error> {
        if !self.params.parallel {
            return Ok(None);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.params.threads)
            .build()?;
        Ok(Some(pool))
    }
}

/// Construct an optimizer and run it once with default run options.
pub fn optimize_sce_ua<O: Objective>(
    objective: O,
    bounds: Vec<(f64, f64)>,
    max_iterations: usize,
    config: &SceUaConfig,
) -> Result<OptimizationResult, Error> {
    let mut optimizer = SceUa::with_config(objective, bounds, config)?;
    optimizer.optimize(&OptimizeOptions::new().with_max_iterations(max_iterations))
}
