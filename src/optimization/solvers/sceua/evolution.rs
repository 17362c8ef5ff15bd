use super::config::Hyperparameters;
use super::population::evaluate;
use crate::core::{Bounds, Point};
use crate::error::Error;
use crate::optimization::solvers::traits::Objective;
use rand::Rng;
use rand::seq::SliceRandom;

/// Competitive complex evolution for one complex.
///
/// Holds only shared references, so one evolver serves every complex of an
/// iteration, on any thread.
pub(crate) struct Evolver<'a, O> {
    objective: &'a O,
    bounds: &'a Bounds,
    params: Hyperparameters,
}

/// A complex after evolution, plus the objective evaluations it cost.
pub(crate) struct Evolved {
    pub complex: Vec<Point>,
    pub evaluations: usize,
}

impl<'a, O: Objective> Evolver<'a, O> {
    pub fn new(objective: &'a O, bounds: &'a Bounds, params: Hyperparameters) -> Self {
        Self {
            objective,
            bounds,
            params,
        }
    }

    /// Run `n_evolution_steps` CCE steps on `complex`.
    ///
    /// Each step draws a rank-weighted sub-complex, generates one candidate by
    /// a simplex step and lets it replace the worst member of the sub-complex
    /// if it scores strictly higher. The complex-wide worst survives untouched
    /// whenever it is not drawn.
    pub fn evolve<R: Rng + ?Sized>(
        &self,
        mut complex: Vec<Point>,
        rng: &mut R,
    ) -> Result<Evolved, Error> {
        let size = complex.len();
        let weights = triangular_weights(size);
        let ranks: Vec<usize> = (0..size).collect();
        let simplex_size = self.params.simplex_size().min(size);
        let mut evaluations = 0;

        for _ in 0..self.params.n_evolution_steps {
            Point::sort_descending(&mut complex);

            let mut chosen: Vec<usize> = ranks
                .choose_multiple_weighted(rng, simplex_size, |&rank| weights[rank])?
                .copied()
                .collect();
            // The complex is sorted, so ascending rank is best-first and the
            // last chosen index is the sub-complex worst.
            chosen.sort_unstable();
            let Some(&worst) = chosen.last() else {
                break;
            };

            let simplex: Vec<&Point> = chosen.iter().map(|&rank| &complex[rank]).collect();
            let (candidate, spent) = self.simplex_step(&simplex, rng)?;
            evaluations += spent;

            if candidate.score > complex[worst].score {
                complex[worst] = candidate;
            }
        }

        Point::sort_descending(&mut complex);
        Ok(Evolved {
            complex,
            evaluations,
        })
    }

    /// Generate one candidate from a simplex: reflection, then contraction,
    /// then a uniform random point. Returns the candidate with its score and
    /// the number of evaluations spent.
    pub fn simplex_step<R: Rng + ?Sized>(
        &self,
        simplex: &[&Point],
        rng: &mut R,
    ) -> Result<(Point, usize), Error> {
        let mut ordered = simplex.to_vec();
        ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

        let Some((worst, rest)) = ordered.split_last() else {
            let random = self.bounds.sample_uniform(rng);
            let score = evaluate(self.objective, &random)?;
            return Ok((Point::new(random, score), 1));
        };
        // Every comparison in this step uses the score captured here.
        let worst_score = worst.score;
        let centroid = centroid(rest, &worst.params);

        let mut reflected: Vec<f64> = centroid
            .iter()
            .zip(&worst.params)
            .map(|(c, w)| c + self.params.alpha * (c - w))
            .collect();
        self.bounds.clamp(&mut reflected);
        let score = evaluate(self.objective, &reflected)?;
        if score > worst_score {
            return Ok((Point::new(reflected, score), 1));
        }

        let mut contracted: Vec<f64> = centroid
            .iter()
            .zip(&worst.params)
            .map(|(c, w)| c + self.params.beta * (w - c))
            .collect();
        self.bounds.clamp(&mut contracted);
        let score = evaluate(self.objective, &contracted)?;
        if score > worst_score {
            return Ok((Point::new(contracted, score), 2));
        }

        let random = self.bounds.sample_uniform(rng);
        let score = evaluate(self.objective, &random)?;
        Ok((Point::new(random, score), 3))
    }
}

/// Selection probability for each rank of a sorted complex of `size` points:
/// rank `r` (1 = best) gets weight proportional to `size - r + 1`.
pub(crate) fn triangular_weights(size: usize) -> Vec<f64> {
    let total = (size * (size + 1)) as f64 / 2.0;
    (0..size).map(|i| (size - i) as f64 / total).collect()
}

/// Mean of `points`; a lone worst point is its own centroid.
fn centroid(points: &[&Point], fallback: &[f64]) -> Vec<f64> {
    if points.is_empty() {
        return fallback.to_vec();
    }

    let mut center = vec![0.0; fallback.len()];
    for point in points {
        for (c, x) in center.iter_mut().zip(&point.params) {
            *c += x;
        }
    }
    let n = points.len() as f64;
    center.iter_mut().for_each(|c| *c /= n);
    center
}
