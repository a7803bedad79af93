use crate::error::{Error, Result};
use crate::model::{Estimator, ModelFamily, Predictor, check_training_data, or_default};
use crate::space::{Configuration, HyperValue, SearchSpace};

/// The kernel function of an [`Svc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelKind {
    /// `<a, b>`
    Linear,
    /// `(gamma * <a, b> + coef0) ^ degree`
    Poly,
    /// `exp(-gamma * |a - b|^2)`
    Rbf,
    /// `tanh(gamma * <a, b> + coef0)`
    Sigmoid,
}

impl KernelKind {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "linear" => Ok(Self::Linear),
            "poly" => Ok(Self::Poly),
            "rbf" => Ok(Self::Rbf),
            "sigmoid" => Ok(Self::Sigmoid),
            other => Err(Error::InvalidParameter {
                name: "kernel".to_string(),
                reason: format!("unknown kernel '{other}'"),
            }),
        }
    }
}

/// A kernel with every coefficient resolved.
#[derive(Clone, Copy, Debug)]
struct Kernel {
    kind: KernelKind,
    gamma: f64,
    degree: i32,
    coef0: f64,
}

impl Kernel {
    fn eval(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.kind {
            KernelKind::Linear => dot(a, b),
            KernelKind::Poly => (self.gamma * dot(a, b) + self.coef0).powi(self.degree),
            KernelKind::Rbf => {
                let sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                (-self.gamma * sq).exp()
            }
            KernelKind::Sigmoid => (self.gamma * dot(a, b) + self.coef0).tanh(),
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// A binary C-support vector classifier trained with simplified SMO.
///
/// # Examples
///
/// ```
/// use nested_cv::model::{Estimator, KernelKind, Predictor, Svc};
///
/// let data = [[0.0, 0.0], [0.2, 0.1], [1.0, 1.0], [0.9, 1.1]];
/// let rows: Vec<&[f64]> = data.iter().map(|r| r.as_slice()).collect();
/// let labels = [0, 0, 1, 1];
///
/// let svc = Svc::new(1.0, KernelKind::Linear).unwrap().seed(3);
/// let fitted = svc.fit(&rows, &labels).unwrap();
/// assert_eq!(fitted.predict(&[1.0, 0.9]), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Svc {
    c: f64,
    kind: KernelKind,
    /// `None` resolves to `1 / (n_features * var(X))` at fit time.
    gamma: Option<f64>,
    degree: i32,
    coef0: f64,
    tol: f64,
    max_passes: usize,
    max_iter: usize,
    seed: u64,
}

impl Svc {
    /// Creates a classifier with regularization `c` and the given kernel.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `c` is not positive.
    pub fn new(c: f64, kind: KernelKind) -> Result<Self> {
        if !(c > 0.0 && c.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "C".to_string(),
                reason: format!("{c} must be positive"),
            });
        }
        Ok(Self {
            c,
            kind,
            gamma: None,
            degree: 3,
            coef0: 0.0,
            tol: 1e-3,
            max_passes: 5,
            max_iter: 200,
            seed: 0,
        })
    }

    /// Sets the kernel coefficient.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `gamma` is not positive.
    pub fn gamma(mut self, gamma: f64) -> Result<Self> {
        if !(gamma > 0.0 && gamma.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "gamma".to_string(),
                reason: format!("{gamma} must be positive"),
            });
        }
        self.gamma = Some(gamma);
        Ok(self)
    }

    /// Sets the polynomial degree.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `degree` is zero or absurdly large.
    pub fn degree(mut self, degree: usize) -> Result<Self> {
        self.degree = i32::try_from(degree)
            .ok()
            .filter(|d| (1..=16).contains(d))
            .ok_or_else(|| Error::InvalidParameter {
                name: "degree".to_string(),
                reason: format!("{degree} must be in 1..=16"),
            })?;
        Ok(self)
    }

    /// Sets the independent term of the poly and sigmoid kernels.
    #[must_use]
    pub fn coef0(mut self, coef0: f64) -> Self {
        self.coef0 = coef0;
        self
    }

    /// Seeds the second-multiplier choice in SMO.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds a classifier from `C`, `kernel`, `gamma`, `degree` and `coef0`.
    ///
    /// Only `C` is required; `kernel` defaults to `rbf`, an absent or `null`
    /// `gamma` to the data-scaled value, `degree` to 3 and `coef0` to 0.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` for a missing `C` or any value the
    /// setters reject.
    pub fn from_config(config: &Configuration, seed: u64) -> Result<Self> {
        let kind = KernelKind::parse(or_default(config, "kernel", "rbf", Configuration::str)?)?;
        let mut svc = Self::new(config.f64("C")?, kind)?
            .degree(or_default(config, "degree", 3, Configuration::usize)?)?
            .coef0(or_default(config, "coef0", 0.0, Configuration::f64)?)
            .seed(seed);
        if !matches!(config.get("gamma"), None | Some(HyperValue::Null)) {
            svc = svc.gamma(config.f64("gamma")?)?;
        }
        Ok(svc)
    }

    /// The search space used when none is supplied.
    #[must_use]
    pub fn default_space() -> SearchSpace {
        SearchSpace::new()
            .log_continuous("C", 1e-2, 1e2)
            .choice("kernel", ["linear", "poly", "rbf", "sigmoid"])
            .log_continuous("gamma", 1e-3, 1e1)
            .choice("degree", [2_i64, 3, 4])
            .continuous("coef0", 0.0, 1.0)
    }

    #[allow(clippy::cast_precision_loss)]
    fn resolve_kernel(&self, rows: &[&[f64]]) -> Kernel {
        let gamma = self.gamma.unwrap_or_else(|| {
            let values: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let n_features = rows[0].len() as f64;
            if var > 0.0 { 1.0 / (n_features * var) } else { 1.0 }
        });
        Kernel {
            kind: self.kind,
            gamma,
            degree: self.degree,
            coef0: self.coef0,
        }
    }
}

impl Estimator for Svc {
    #[allow(clippy::many_single_char_names, clippy::similar_names)]
    fn fit(&self, rows: &[&[f64]], labels: &[usize]) -> Result<Box<dyn Predictor>> {
        check_training_data(rows, labels)?;

        let kernel = self.resolve_kernel(rows);
        let n = rows.len();
        let y: Vec<f64> = labels
            .iter()
            .map(|&l| if l == 1 { 1.0 } else { -1.0 })
            .collect();
        let k: Vec<Vec<f64>> = rows
            .iter()
            .map(|a| rows.iter().map(|b| kernel.eval(a, b)).collect())
            .collect();

        let c = self.c;
        let mut alpha = vec![0.0; n];
        let mut b = 0.0;
        let mut rng = fastrand::Rng::with_seed(self.seed);

        let output = |alpha: &[f64], b: f64, i: usize| -> f64 {
            (0..n).map(|j| alpha[j] * y[j] * k[i][j]).sum::<f64>() + b
        };

        let mut passes = 0;
        let mut iter = 0;
        while passes < self.max_passes && iter < self.max_iter {
            let mut changed = 0;
            for i in 0..n {
                let e_i = output(&alpha, b, i) - y[i];
                let violates = (y[i] * e_i < -self.tol && alpha[i] < c)
                    || (y[i] * e_i > self.tol && alpha[i] > 0.0);
                if !violates {
                    continue;
                }

                let mut j = rng.usize(0..n - 1);
                if j >= i {
                    j += 1;
                }
                let e_j = output(&alpha, b, j) - y[j];
                let (old_i, old_j) = (alpha[i], alpha[j]);

                let (low, high) = if (y[i] - y[j]).abs() > f64::EPSILON {
                    ((old_j - old_i).max(0.0), (c + old_j - old_i).min(c))
                } else {
                    ((old_i + old_j - c).max(0.0), (old_i + old_j).min(c))
                };
                if high - low < 1e-12 {
                    continue;
                }

                let eta = 2.0 * k[i][j] - k[i][i] - k[j][j];
                if eta >= 0.0 {
                    continue;
                }

                alpha[j] = (old_j - y[j] * (e_i - e_j) / eta).clamp(low, high);
                if (alpha[j] - old_j).abs() < 1e-5 {
                    continue;
                }
                alpha[i] = old_i + y[i] * y[j] * (old_j - alpha[j]);

                let d_i = y[i] * (alpha[i] - old_i);
                let d_j = y[j] * (alpha[j] - old_j);
                let b1 = b - e_i - d_i * k[i][i] - d_j * k[i][j];
                let b2 = b - e_j - d_i * k[i][j] - d_j * k[j][j];
                b = if alpha[i] > 0.0 && alpha[i] < c {
                    b1
                } else if alpha[j] > 0.0 && alpha[j] < c {
                    b2
                } else {
                    f64::midpoint(b1, b2)
                };
                changed += 1;
            }
            iter += 1;
            passes = if changed == 0 { passes + 1 } else { 0 };
        }

        let (support, coef): (Vec<Vec<f64>>, Vec<f64>) = alpha
            .iter()
            .zip(&y)
            .zip(rows)
            .filter(|((a, _), _)| **a > 1e-8)
            .map(|((a, yi), row)| (row.to_vec(), a * yi))
            .unzip();

        trace_debug!(
            n_support = support.len(),
            iterations = iter,
            "svc fitted"
        );

        Ok(Box::new(FittedSvc {
            support,
            coef,
            bias: b,
            kernel,
        }))
    }
}

/// A trained [`Svc`]: support vectors, their signed multipliers and the bias.
#[derive(Clone, Debug)]
struct FittedSvc {
    support: Vec<Vec<f64>>,
    coef: Vec<f64>,
    bias: f64,
    kernel: Kernel,
}

impl Predictor for FittedSvc {
    fn decision_function(&self, row: &[f64]) -> f64 {
        self.support
            .iter()
            .zip(&self.coef)
            .map(|(sv, c)| c * self.kernel.eval(sv, row))
            .sum::<f64>()
            + self.bias
    }
}

/// The support-vector family: [`Svc`] over a tunable search space.
#[derive(Clone, Debug)]
pub struct SvcFamily {
    space: SearchSpace,
}

impl SvcFamily {
    /// Creates the family with [`Svc::default_space`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            space: Svc::default_space(),
        }
    }

    /// Creates the family with a custom space.
    #[must_use]
    pub fn with_space(space: SearchSpace) -> Self {
        Self { space }
    }
}

impl Default for SvcFamily {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelFamily for SvcFamily {
    fn name(&self) -> &str {
        "svc"
    }

    fn space(&self) -> &SearchSpace {
        &self.space
    }

    fn build(&self, config: &Configuration, seed: u64) -> Result<Box<dyn Estimator>> {
        Ok(Box::new(Svc::from_config(config, seed)?))
    }
}
