//! Decision Tree - CART tree used as the forest's base learner
//!
//! Regression trees split on squared-error reduction and store the mean in
//! their leaves. Classification trees split on Gini impurity and store the
//! class frequency distribution.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features considered per split; `None` = all
    pub max_features: Option<usize>,
}

/// Training target of a tree
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Continuous(&'a [f64]),
    Classes { labels: &'a [usize], n_classes: usize },
}

impl Target<'_> {
    /// Mean for regression, class distribution for classification
    fn leaf_value(&self, samples: &[usize]) -> Vec<f64> {
        let n = samples.len().max(1) as f64;
        match self {
            Target::Continuous(y) => {
                vec![samples.iter().map(|&i| y[i]).sum::<f64>() / n]
            }
            Target::Classes { labels, n_classes } => {
                let mut dist = vec![0.0; *n_classes];
                for &i in samples {
                    dist[labels[i]] += 1.0;
                }
                dist.iter_mut().for_each(|c| *c /= n);
                dist
            }
        }
    }

    fn is_pure(&self, samples: &[usize]) -> bool {
        match self {
            Target::Continuous(y) => {
                let first = y[samples[0]];
                samples.iter().all(|&i| (y[i] - first).abs() < 1e-12)
            }
            Target::Classes { labels, .. } => {
                let first = labels[samples[0]];
                samples.iter().all(|&i| labels[i] == first)
            }
        }
    }

    /// Sample-weighted impurity of both sides for every cut of `sorted`.
    ///
    /// `cost[k]` is the cost of putting `sorted[..k]` left, for k in 1..n.
    fn split_costs(&self, sorted: &[usize]) -> Vec<f64> {
        let n = sorted.len();
        let mut costs = vec![f64::INFINITY; n];

        match self {
            Target::Continuous(y) => {
                let total_sum: f64 = sorted.iter().map(|&i| y[i]).sum();
                let total_sq: f64 = sorted.iter().map(|&i| y[i] * y[i]).sum();
                let (mut sum, mut sq) = (0.0, 0.0);

                for k in 1..n {
                    let v = y[sorted[k - 1]];
                    sum += v;
                    sq += v * v;
                    let (nl, nr) = (k as f64, (n - k) as f64);
                    let sse_left = sq - sum * sum / nl;
                    let sse_right = (total_sq - sq) - (total_sum - sum).powi(2) / nr;
                    costs[k] = sse_left + sse_right;
                }
            }
            Target::Classes { labels, n_classes } => {
                let mut right = vec![0.0; *n_classes];
                for &i in sorted {
                    right[labels[i]] += 1.0;
                }
                let mut left = vec![0.0; *n_classes];

                for k in 1..n {
                    let c = labels[sorted[k - 1]];
                    left[c] += 1.0;
                    right[c] -= 1.0;
                    let (nl, nr) = (k as f64, (n - k) as f64);
                    costs[k] = nl * gini(&left, nl) + nr * gini(&right, nr);
                }
            }
        }

        costs
    }
}

fn gini(counts: &[f64], n: f64) -> f64 {
    1.0 - counts.iter().map(|c| (c / n).powi(2)).sum::<f64>()
}

struct Split {
    feature: usize,
    threshold: f64,
    cost: f64,
}

// ============================================================================
// DECISION TREE
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree over the (possibly repeated) row indices in `samples`
    pub fn fit(
        x: &Array2<f64>,
        target: Target<'_>,
        samples: Vec<usize>,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        if !samples.is_empty() {
            tree.grow(x, target, samples, 0, params, rng);
        }
        tree
    }

    fn grow(
        &mut self,
        x: &Array2<f64>,
        target: Target<'_>,
        samples: Vec<usize>,
        depth: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let node_index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: target.leaf_value(&samples),
        });

        if depth >= params.max_depth
            || samples.len() < params.min_samples_split
            || target.is_pure(&samples)
        {
            return node_index;
        }

        let Some(split) = best_split(x, target, &samples, params, rng) else {
            return node_index;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| x[[i, split.feature]] <= split.threshold);

        let left = self.grow(x, target, left, depth + 1, params, rng);
        let right = self.grow(x, target, right, depth + 1, params, rng);

        self.nodes[node_index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_index
    }

    /// Leaf value reached by `row`
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> Option<&[f64]> {
        let mut index = 0;
        loop {
            match self.nodes.get(index)? {
                Node::Leaf { value } => return Some(value),
                Node::Split { feature, threshold, left, right } => {
                    let v = row.get(*feature).copied().unwrap_or(0.0);
                    index = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }
}

fn best_split(
    x: &Array2<f64>,
    target: Target<'_>,
    samples: &[usize],
    params: TreeParams,
    rng: &mut StdRng,
) -> Option<Split> {
    let n_features = x.ncols();
    if n_features == 0 {
        return None;
    }

    let candidates: Vec<usize> = match params.max_features {
        Some(k) if k < n_features => index::sample(rng, n_features, k.max(1)).into_vec(),
        _ => (0..n_features).collect(),
    };

    let mut best: Option<Split> = None;
    let mut sorted = samples.to_vec();

    for feature in candidates {
        sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));
        let costs = target.split_costs(&sorted);

        for k in 1..sorted.len() {
            let (lo, hi) = (x[[sorted[k - 1], feature]], x[[sorted[k], feature]]);
            if lo >= hi {
                continue;
            }
            if best.as_ref().map_or(true, |b| costs[k] < b.cost) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(Split { feature, threshold, cost: costs[k] });
            }
        }
    }

    best
}
