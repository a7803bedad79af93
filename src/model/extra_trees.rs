//! Extremely randomized trees.
//!
//! Each split draws one random threshold per candidate feature between the
//! node's minimum and maximum of that feature and keeps the candidate with
//! the largest impurity decrease. Trees are arena-allocated.

use crate::error::{Error, Result};
use crate::model::{Estimator, ModelFamily, Predictor, check_training_data, or_default};
use crate::rng_util;
use crate::space::{Configuration, HyperValue, SearchSpace};

/// Node impurity measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Criterion {
    /// Gini impurity.
    Gini,
    /// Shannon entropy.
    Entropy,
}

impl Criterion {
    fn impurity(self, p: f64) -> f64 {
        match self {
            Self::Gini => 2.0 * p * (1.0 - p),
            Self::Entropy => {
                let h = |q: f64| if q > 0.0 { -q * q.log2() } else { 0.0 };
                h(p) + h(1.0 - p)
            }
        }
    }
}

/// How many features are considered at each split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`
    Sqrt,
    /// `ceil(log2(n_features))`, at least 1
    Log2,
    /// Every feature.
    All,
}

impl MaxFeatures {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            Self::Sqrt => n.sqrt().ceil() as usize,
            Self::Log2 => n.log2().ceil() as usize,
            Self::All => n_features,
        };
        k.clamp(1, n_features)
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Fraction of class-1 samples reaching the leaf.
        p_pos: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

struct TreeParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: usize,
    criterion: Criterion,
}

impl Tree {
    fn build(
        rows: &[&[f64]],
        labels: &[usize],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build_node(rows, labels, indices, 0, params, rng);
        tree
    }

    #[allow(clippy::cast_precision_loss)]
    fn build_node(
        &mut self,
        rows: &[&[f64]],
        labels: &[usize],
        indices: &[usize],
        depth: usize,
        params: &TreeParams,
        rng: &mut fastrand::Rng,
    ) -> usize {
        let n = indices.len();
        let n_pos = indices.iter().filter(|&&i| labels[i] == 1).count();
        let p_pos = n_pos as f64 / n as f64;

        let pure = n_pos == 0 || n_pos == n;
        if pure || n < params.min_samples_split || params.max_depth.is_some_and(|d| depth >= d) {
            return self.push(Node::Leaf { p_pos });
        }

        let n_features = rows[indices[0]].len();
        let candidates = partial_shuffle(n_features, params.max_features, rng);

        let mut best: Option<(f64, usize, f64)> = None;
        for &feature in &candidates {
            let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(rows[i][feature]), hi.max(rows[i][feature]))
            });
            if hi - lo <= f64::EPSILON * hi.abs().max(1.0) {
                continue;
            }

            let threshold = rng_util::f64_range(rng, lo, hi);
            let (mut l_n, mut l_pos) = (0usize, 0usize);
            for &i in indices {
                if rows[i][feature] <= threshold {
                    l_n += 1;
                    l_pos += usize::from(labels[i] == 1);
                }
            }
            let r_n = n - l_n;
            if l_n == 0 || r_n == 0 {
                continue;
            }

            let l_imp = params.criterion.impurity(l_pos as f64 / l_n as f64);
            let r_imp = params.criterion.impurity((n_pos - l_pos) as f64 / r_n as f64);
            let weighted = (l_n as f64 * l_imp + r_n as f64 * r_imp) / n as f64;
            let decrease = params.criterion.impurity(p_pos) - weighted;

            if best.is_none_or(|(d, _, _)| decrease > d) {
                best = Some((decrease, feature, threshold));
            }
        }

        let Some((_, feature, threshold)) = best else {
            return self.push(Node::Leaf { p_pos });
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| rows[i][feature] <= threshold);

        // Placeholder until both children exist.
        let node_idx = self.push(Node::Leaf { p_pos });
        let left = self.build_node(rows, labels, &left_indices, depth + 1, params, rng);
        let right = self.build_node(rows, labels, &right_indices, depth + 1, params, rng);
        self.nodes[node_idx] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        node_idx
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { p_pos } => return p_pos,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] <= threshold { left } else { right },
            }
        }
    }
}

/// Select `k` random indices from `0..n` using partial Fisher-Yates shuffle.
fn partial_shuffle(n: usize, k: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    let k = k.min(n);
    for i in 0..k {
        let j = rng.usize(i..n);
        indices.swap(i, j);
    }
    indices.truncate(k);
    indices
}

/// An extra-trees ensemble for binary classification.
///
/// Defaults: 100 trees, unlimited depth, `sqrt` features, Gini,
/// `min_samples_split` 2, no bootstrap.
#[derive(Clone, Debug)]
pub struct ExtraTrees {
    n_estimators: usize,
    max_depth: Option<usize>,
    max_features: MaxFeatures,
    criterion: Criterion,
    min_samples_split: usize,
    bootstrap: bool,
    seed: u64,
}

impl Default for ExtraTrees {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            criterion: Criterion::Gini,
            min_samples_split: 2,
            bootstrap: false,
            seed: 0,
        }
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> Error {
    Error::InvalidParameter {
        name: name.to_string(),
        reason: reason.into(),
    }
}

impl ExtraTrees {
    /// Creates an ensemble with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of trees.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `n` is zero.
    pub fn n_estimators(mut self, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(invalid("n_estimators", "must be at least 1"));
        }
        self.n_estimators = n;
        Ok(self)
    }

    /// Limits tree depth; `None` grows until leaves are pure or too small.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` for a depth of zero.
    pub fn max_depth(mut self, depth: Option<usize>) -> Result<Self> {
        if depth == Some(0) {
            return Err(invalid("max_depth", "must be at least 1"));
        }
        self.max_depth = depth;
        Ok(self)
    }

    /// Sets the number of features tried per split.
    #[must_use]
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the impurity criterion.
    #[must_use]
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Sets the minimum node size that may still be split.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `n` is below 2.
    pub fn min_samples_split(mut self, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(invalid("min_samples_split", "must be at least 2"));
        }
        self.min_samples_split = n;
        Ok(self)
    }

    /// Draws each tree's training rows with replacement.
    #[must_use]
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Seeds tree construction.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds an ensemble from a decoded configuration. Absent entries keep
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` for an unknown tag or a value the
    /// setters reject.
    pub fn from_config(config: &Configuration, seed: u64) -> Result<Self> {
        let defaults = Self::default();
        let max_features = match or_default(config, "max_features", "sqrt", Configuration::str)? {
            "sqrt" => MaxFeatures::Sqrt,
            "log2" => MaxFeatures::Log2,
            "all" => MaxFeatures::All,
            other => return Err(invalid("max_features", format!("unknown value '{other}'"))),
        };
        let criterion = match or_default(config, "criterion", "gini", Configuration::str)? {
            "gini" => Criterion::Gini,
            "entropy" => Criterion::Entropy,
            other => return Err(invalid("criterion", format!("unknown value '{other}'"))),
        };

        Ok(defaults
            .n_estimators(or_default(config, "n_estimators", 100, Configuration::usize)?)?
            .max_depth(or_default(config, "max_depth", None, Configuration::opt_usize)?)?
            .min_samples_split(or_default(config, "min_samples_split", 2, Configuration::usize)?)?
            .max_features(max_features)
            .criterion(criterion)
            .bootstrap(or_default(config, "bootstrap", false, Configuration::bool)?)
            .seed(seed))
    }

    /// The search space used when none is supplied.
    #[must_use]
    pub fn default_space() -> SearchSpace {
        SearchSpace::new()
            .choice("n_estimators", [10_i64, 50, 100])
            .choice("max_depth", [
                HyperValue::Null,
                HyperValue::Int(3),
                HyperValue::Int(5),
                HyperValue::Int(10),
            ])
            .choice("max_features", ["sqrt", "log2", "all"])
            .choice("criterion", ["gini", "entropy"])
            .choice("min_samples_split", [2_i64, 4, 8])
            .choice("bootstrap", [false, true])
    }
}

impl Estimator for ExtraTrees {
    fn fit(&self, rows: &[&[f64]], labels: &[usize]) -> Result<Box<dyn Predictor>> {
        check_training_data(rows, labels)?;

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: self.max_features.resolve(rows[0].len()),
            criterion: self.criterion,
        };
        let n = rows.len();
        let all: Vec<usize> = (0..n).collect();

        let trees = (0..self.n_estimators)
            .map(|t| {
                let mut rng = fastrand::Rng::with_seed(rng_util::derive_seed(self.seed, t as u64));
                let indices = if self.bootstrap {
                    (0..n).map(|_| rng.usize(0..n)).collect()
                } else {
                    all.clone()
                };
                Tree::build(rows, labels, &indices, &params, &mut rng)
            })
            .collect();

        trace_debug!(n_trees = self.n_estimators, "extra trees fitted");
        Ok(Box::new(FittedExtraTrees { trees }))
    }
}

#[derive(Debug, Clone)]
struct FittedExtraTrees {
    trees: Vec<Tree>,
}

impl Predictor for FittedExtraTrees {
    /// Mean class-1 leaf fraction across trees.
    #[allow(clippy::cast_precision_loss)]
    fn decision_function(&self, row: &[f64]) -> f64 {
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }

    fn predict(&self, row: &[f64]) -> usize {
        usize::from(self.decision_function(row) > 0.5)
    }
}

/// The extra-trees family: [`ExtraTrees`] over a tunable search space.
#[derive(Clone, Debug)]
pub struct ExtraTreesFamily {
    space: SearchSpace,
}

impl ExtraTreesFamily {
    /// Creates the family with [`ExtraTrees::default_space`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            space: ExtraTrees::default_space(),
        }
    }

    /// Creates the family with a custom space.
    #[must_use]
    pub fn with_space(space: SearchSpace) -> Self {
        Self { space }
    }
}

impl Default for ExtraTreesFamily {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelFamily for ExtraTreesFamily {
    fn name(&self) -> &str {
        "extra_trees"
    }

    fn space(&self) -> &SearchSpace {
        &self.space
    }

    fn build(&self, config: &Configuration, seed: u64) -> Result<Box<dyn Estimator>> {
        Ok(Box::new(ExtraTrees::from_config(config, seed)?))
    }
}
