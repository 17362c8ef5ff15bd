use crate::core::{Bounds, Point};
use crate::error::Error;
use crate::optimization::solvers::traits::Objective;
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::ThreadPool;
use rayon::prelude::*;

/// Evaluate one candidate. NaN scores are ranked last instead of poisoning the sort.
pub(crate) fn evaluate<O: Objective>(objective: &O, params: &[f64]) -> Result<f64, Error> {
    let score = objective.evaluate(params).map_err(Error::objective)?;
    if score.is_nan() {
        tracing::warn!(?params, "Objective returned NaN, ranking the point last");
        return Ok(f64::NEG_INFINITY);
    }
    Ok(score)
}

/// Latin hypercube sample of `n_points` points inside `bounds`.
///
/// Each dimension's unit interval is split into `n_points` equal segments with
/// one uniform draw per segment. The draws are then shuffled independently per
/// dimension, so every marginal stays stratified while dimensions decorrelate.
pub(crate) fn latin_hypercube<R: Rng + ?Sized>(
    bounds: &Bounds,
    n_points: usize,
    rng: &mut R,
) -> Vec<Vec<f64>> {
    let n_params = bounds.len();
    let mut samples = vec![vec![0.0; n_params]; n_points];
    let segment = 1.0 / n_points as f64;

    for dim in 0..n_params {
        let mut column: Vec<f64> = (0..n_points)
            .map(|i| (i as f64 + rng.gen_range(0.0..1.0)) * segment)
            .collect();
        column.shuffle(rng);

        for (sample, unit) in samples.iter_mut().zip(column) {
            sample[dim] = bounds.scale(dim, unit);
        }
    }

    samples
}

/// Sample and evaluate the initial population, sorted best-first.
pub(crate) fn initialize<O, R>(
    objective: &O,
    bounds: &Bounds,
    n_points: usize,
    rng: &mut R,
    pool: Option<&ThreadPool>,
) -> Result<Vec<Point>, Error>
where
    O: Objective,
    R: Rng + ?Sized,
{
    let samples = latin_hypercube(bounds, n_points, rng);

    let scored = |params: Vec<f64>| -> Result<Point, Error> {
        let score = evaluate(objective, &params)?;
        Ok(Point::new(params, score))
    };

    let mut population = match pool {
        Some(pool) => pool.install(|| {
            samples
                .into_par_iter()
                .map(scored)
                .collect::<Result<Vec<_>, _>>()
        })?,
        None => samples.into_iter().map(scored).collect::<Result<Vec<_>, _>>()?,
    };

    Point::sort_descending(&mut population);
    Ok(population)
}

/// Deal a sorted population into complexes: complex `k` takes members
/// `k, k + n_complexes, k + 2 * n_complexes, ...`, so the elite is spread
/// across complexes and each complex stays sorted.
pub(crate) fn partition(population: &[Point], n_complexes: usize) -> Vec<Vec<Point>> {
    (0..n_complexes)
        .map(|k| {
            population
                .iter()
                .skip(k)
                .step_by(n_complexes)
                .cloned()
                .collect()
        })
        .collect()
}

/// Merge complexes back in index order and re-sort best-first.
pub(crate) fn recombine(complexes: Vec<Vec<Point>>) -> Vec<Point> {
    let mut population: Vec<Point> = complexes.into_iter().flatten().collect();
    Point::sort_descending(&mut population);
    population
}
