//! Isolation forest.
//!
//! Each tree is grown on a random sub-sample with its own RNG stream derived
//! from `(seed, tree index)`, so trees are built in parallel and the fitted
//! forest is still bit-identical for a given seed and input.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

use super::population::column_ranges;

/// Euler-Mascheroni constant, used in the harmonic number approximation.
const EULER_GAMMA: f64 = 0.577_215_664_9;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ForestError {
    #[error("no rows to fit")]
    Empty,

    #[error("rows have inconsistent dimensions")]
    RaggedRows,

    #[error("every feature dimension has zero variance")]
    ZeroVariance,
}

/// Average path length of an unsuccessful BST search over `n` points.
pub(crate) fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Derive an independent 64-bit stream seed per tree (splitmix64 finalizer).
fn tree_seed(seed: u64, tree: usize) -> u64 {
    let mut z = seed.wrapping_add((tree as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn grow(rows: &[Vec<f64>], sample_size: usize, height_limit: usize, rng: &mut StdRng) -> Self {
        let mut indices = sample(rng, rows.len(), sample_size).into_vec();
        // Sampling order differs from row order; sort for a stable layout.
        indices.sort_unstable();
        Self {
            root: build_node(rows, &indices, 0, height_limit, rng),
        }
    }

    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;
        loop {
            match node {
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] < *threshold { left } else { right };
                    depth += 1;
                }
            }
        }
    }
}

fn build_node(
    rows: &[Vec<f64>],
    indices: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf { size: indices.len() };
    }

    let dim = rows[indices[0]].len();
    let mut splittable: Vec<(usize, f64, f64)> = Vec::with_capacity(dim);
    for feature in 0..dim {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for &i in indices {
            lo = lo.min(rows[i][feature]);
            hi = hi.max(rows[i][feature]);
        }
        if hi > lo {
            splittable.push((feature, lo, hi));
        }
    }
    if splittable.is_empty() {
        return Node::Leaf { size: indices.len() };
    }

    let (feature, lo, hi) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = rng.gen_range(lo..hi);
    let (left, right): (Vec<usize>, Vec<usize>) =
        indices.iter().copied().partition(|&i| rows[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(rows, &left, depth + 1, height_limit, rng)),
        right: Box::new(build_node(rows, &right, depth + 1, height_limit, rng)),
    }
}

/// A fitted forest. Holds no reference to the training rows.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit `n_trees` trees on sub-samples of `rows`.
    pub fn fit(
        rows: &[Vec<f64>],
        n_trees: usize,
        sample_size: usize,
        seed: u64,
    ) -> Result<Self, ForestError> {
        let first = rows.first().ok_or(ForestError::Empty)?;
        if rows.iter().any(|r| r.len() != first.len()) {
            return Err(ForestError::RaggedRows);
        }
        if column_ranges(rows).iter().all(|(lo, hi)| hi <= lo) {
            return Err(ForestError::ZeroVariance);
        }

        let psi = sample_size.min(rows.len()).max(1);
        let height_limit = (psi as f64).log2().ceil().max(1.0) as usize;

        let trees = (0..n_trees.max(1))
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(tree_seed(seed, t));
                IsolationTree::grow(rows, psi, height_limit, &mut rng)
            })
            .collect();

        Ok(Self {
            trees,
            sample_size: psi,
        })
    }

    /// Raw anomaly score `2^(-E[h(x)] / c(psi))` in (0, 1].
    pub fn score(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(row)).sum();
        let mean_path = total / self.trees.len() as f64;
        let c = average_path_length(self.sample_size);
        if c <= 0.0 {
            return 0.5;
        }
        2f64.powf(-mean_path / c)
    }

    /// Score many rows in parallel, preserving order.
    pub fn score_all(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.par_iter().map(|r| self.score(r)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Min-max normalize into [0, 1]. A constant series maps to all zeros.
pub fn normalize(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if !span.is_finite() || span <= f64::EPSILON {
        return vec![0.0; raw.len()];
    }
    raw.iter().map(|v| ((v - min) / span).clamp(0.0, 1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_with_outlier() -> Vec<Vec<f64>> {
        let mut rows: Vec<Vec<f64>> = (0..60)
            .map(|i| vec![10.0 + (i % 7) as f64 * 0.1, 5.0 + (i % 5) as f64 * 0.1])
            .collect();
        rows.push(vec![100.0, -40.0]);
        rows
    }

    #[test]
    fn average_path_length_small_n() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!(average_path_length(256) > average_path_length(16));
    }

    #[test]
    fn outlier_scores_highest() {
        let rows = cluster_with_outlier();
        let forest = IsolationForest::fit(&rows, 100, 256, 7).unwrap();
        let scores = forest.score_all(&rows);
        let outlier = scores[rows.len() - 1];
        assert!(scores[..rows.len() - 1].iter().all(|&s| s < outlier));
    }

    #[test]
    fn same_seed_same_scores() {
        let rows = cluster_with_outlier();
        let a = IsolationForest::fit(&rows, 50, 32, 42).unwrap().score_all(&rows);
        let b = IsolationForest::fit(&rows, 50, 32, 42).unwrap().score_all(&rows);
        assert_eq!(a, b);
    }

    #[test]
    fn different_tree_seeds() {
        assert_ne!(tree_seed(42, 0), tree_seed(42, 1));
        assert_ne!(tree_seed(42, 0), tree_seed(43, 0));
    }

    #[test]
    fn zero_variance_fails() {
        let rows = vec![vec![1.0, 2.0]; 20];
        assert_eq!(
            IsolationForest::fit(&rows, 10, 16, 1).unwrap_err(),
            ForestError::ZeroVariance
        );
        assert_eq!(IsolationForest::fit(&[], 10, 16, 1).unwrap_err(), ForestError::Empty);
    }

    #[test]
    fn normalize_bounds() {
        let n = normalize(&[0.4, 0.5, 0.6]);
        assert_eq!(n[0], 0.0);
        assert_eq!(n[2], 1.0);
        assert!((n[1] - 0.5).abs() < 1e-9);
        assert_eq!(normalize(&[0.5, 0.5]), vec![0.0, 0.0]);
    }
}
