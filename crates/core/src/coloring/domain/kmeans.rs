//! Lloyd's k-means with k-means++ seeding and random restarts.
//!
//! Each restart draws from its own PRNG stream (`seed + attempt`), so a
//! fixed seed makes the whole run reproducible and restarts never share
//! an initialization.

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::shared::error::CoreError;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_EPSILON: f32 = 0.1;
pub const DEFAULT_ATTEMPTS: usize = 10;

/// Termination criteria and restart count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansParams {
    /// Upper bound on assignment/update rounds per attempt.
    pub max_iterations: usize,
    /// Stop early once no centroid moves by this much or more.
    pub epsilon: f32,
    /// Independent restarts; the lowest-inertia result wins.
    pub attempts: usize,
    /// Fixed base seed. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
            attempts: DEFAULT_ATTEMPTS,
            seed: None,
        }
    }
}

impl KMeansParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_iterations == 0 {
            return Err(CoreError::invalid("max_iterations must be at least 1"));
        }
        if self.attempts == 0 {
            return Err(CoreError::invalid("attempts must be at least 1"));
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(CoreError::invalid(format!(
                "epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Outcome of the best restart.
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// One row per cluster, in the order the algorithm created them.
    pub centroids: Array2<f32>,
    /// Cluster index of every sample.
    pub labels: Vec<usize>,
    /// Number of samples assigned to each cluster.
    pub counts: Vec<usize>,
    /// Sum of squared distances from samples to their centroid.
    pub inertia: f64,
}

impl KMeansResult {
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }
}

/// Partitions the rows of `samples` into `k` clusters.
///
/// When there are fewer distinct samples than `k`, the result collapses
/// to one cluster per distinct sample.
pub fn kmeans(
    samples: ArrayView2<'_, f32>,
    k: usize,
    params: &KMeansParams,
) -> Result<KMeansResult, CoreError> {
    if samples.nrows() == 0 {
        return Err(CoreError::invalid("no samples to cluster"));
    }
    if k == 0 {
        return Err(CoreError::invalid("cluster count must be positive"));
    }
    params.validate()?;

    let distinct = count_distinct(samples, k);
    let k = if distinct < k {
        log::debug!("only {distinct} distinct samples, collapsing from {k} clusters");
        distinct
    } else {
        k
    };

    let base_seed = params.seed.unwrap_or_else(|| rand::rng().random());
    let mut best: Option<KMeansResult> = None;
    for attempt in 0..params.attempts {
        let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(attempt as u64));
        let result = run_attempt(samples, k, params, &mut rng);
        log::trace!("k-means attempt {attempt}: inertia {:.3}", result.inertia);
        if best.as_ref().map_or(true, |b| result.inertia < b.inertia) {
            best = Some(result);
        }
    }

    best.ok_or_else(|| CoreError::invalid("k-means produced no result"))
}

fn run_attempt(
    samples: ArrayView2<'_, f32>,
    k: usize,
    params: &KMeansParams,
    rng: &mut StdRng,
) -> KMeansResult {
    let mut centroids = seed_plus_plus(samples, k, rng);
    let mut labels = vec![0usize; samples.nrows()];

    for _ in 0..params.max_iterations {
        assign(samples, centroids.view(), &mut labels);
        let updated = update(samples, centroids.view(), &labels, k);

        let shift = centroids
            .rows()
            .into_iter()
            .zip(updated.rows())
            .map(|(old, new)| squared_distance(old, new).sqrt())
            .fold(0.0f64, f64::max);
        centroids = updated;
        if shift < params.epsilon as f64 {
            break;
        }
    }

    let inertia = assign(samples, centroids.view(), &mut labels);
    let mut counts = vec![0usize; k];
    for &label in &labels {
        counts[label] += 1;
    }

    KMeansResult {
        centroids,
        labels,
        counts,
        inertia,
    }
}

/// k-means++: first centroid uniform, each next one drawn with
/// probability proportional to its squared distance from the chosen set.
fn seed_plus_plus(samples: ArrayView2<'_, f32>, k: usize, rng: &mut StdRng) -> Array2<f32> {
    let n = samples.nrows();
    let mut centroids = Array2::<f32>::zeros((k, samples.ncols()));

    let first = rng.random_range(0..n);
    centroids.row_mut(0).assign(&samples.row(first));
    let mut nearest: Vec<f64> = samples
        .rows()
        .into_iter()
        .map(|s| squared_distance(s, samples.row(first)))
        .collect();

    for c in 1..k {
        let total: f64 = nearest.iter().sum();
        let target = rng.random::<f64>() * total;

        let mut chosen = None;
        let mut acc = 0.0;
        for (i, &d) in nearest.iter().enumerate() {
            if d <= 0.0 {
                continue;
            }
            chosen = Some(i);
            acc += d;
            if acc >= target {
                break;
            }
        }
        // k never exceeds the distinct sample count, so a candidate exists.
        let chosen = chosen.unwrap_or(first);

        centroids.row_mut(c).assign(&samples.row(chosen));
        for (i, s) in samples.rows().into_iter().enumerate() {
            let d = squared_distance(s, samples.row(chosen));
            if d < nearest[i] {
                nearest[i] = d;
            }
        }
    }

    centroids
}

/// Labels every sample with its nearest centroid; returns the inertia.
fn assign(samples: ArrayView2<'_, f32>, centroids: ArrayView2<'_, f32>, labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (i, s) in samples.rows().into_iter().enumerate() {
        let (label, d) = nearest_centroid(s, centroids);
        labels[i] = label;
        inertia += d;
    }
    inertia
}

fn nearest_centroid(sample: ArrayView1<'_, f32>, centroids: ArrayView2<'_, f32>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (j, c) in centroids.rows().into_iter().enumerate() {
        let d = squared_distance(sample, c);
        if d < best.1 {
            best = (j, d);
        }
    }
    best
}

/// Recomputes centroids as cluster means. An emptied cluster takes over
/// the sample lying farthest from its current centroid.
fn update(
    samples: ArrayView2<'_, f32>,
    centroids: ArrayView2<'_, f32>,
    labels: &[usize],
    k: usize,
) -> Array2<f32> {
    let dims = samples.ncols();
    let mut sums = Array2::<f64>::zeros((k, dims));
    let mut counts = vec![0usize; k];
    for (s, &label) in samples.rows().into_iter().zip(labels) {
        for (acc, v) in sums.row_mut(label).iter_mut().zip(s.iter()) {
            *acc += *v as f64;
        }
        counts[label] += 1;
    }

    let mut updated = Array2::<f32>::zeros((k, dims));
    let mut taken: HashSet<usize> = HashSet::new();
    for j in 0..k {
        if counts[j] > 0 {
            for (dst, sum) in updated.row_mut(j).iter_mut().zip(sums.row(j).iter()) {
                *dst = (*sum / counts[j] as f64) as f32;
            }
            continue;
        }

        let farthest = samples
            .rows()
            .into_iter()
            .zip(labels)
            .enumerate()
            .filter(|(i, _)| !taken.contains(i))
            .map(|(i, (s, &label))| (i, squared_distance(s, centroids.row(label))))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        match farthest {
            Some((i, _)) => {
                taken.insert(i);
                updated.row_mut(j).assign(&samples.row(i));
            }
            None => updated.row_mut(j).assign(&centroids.row(j)),
        }
    }
    updated
}

fn squared_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum()
}

/// Distinct sample count, stopping once `limit` is reached.
fn count_distinct(samples: ArrayView2<'_, f32>, limit: usize) -> usize {
    let mut seen: HashSet<Vec<u32>> = HashSet::new();
    for s in samples.rows() {
        seen.insert(s.iter().map(|v| v.to_bits()).collect());
        if seen.len() >= limit {
            break;
        }
    }
    seen.len()
}
