//! Latent factor model via truncated SVD
//!
//! Factorizes the interaction matrix `A ≈ U Σ Vᵀ`, keeping the top-k singular
//! triplets. An oversampled block of vectors is driven towards the dominant
//! right singular subspace by repeated multiplication with `AᵀA`; after every
//! step a Rayleigh-Ritz projection extracts the triplets, sorted by σ, and the
//! iteration stops once each kept triplet satisfies `‖Aᵀu − σv‖ / σ ≤ tolerance`.
//! Initialization is deterministic, so the same matrix always yields the same
//! factors.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use reelgraph_core::{EngineConfig, RecommenderError, Result};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

use crate::matrix::InteractionMatrix;

/// Norms below this are treated as zero
const EPSILON: f64 = 1e-12;

/// Extra block columns beyond k; the block is at least twice k
const MIN_OVERSAMPLING: usize = 10;

/// Off-diagonal norm, relative to the whole matrix, at which Jacobi stops
const JACOBI_TOLERANCE: f64 = 1e-14;

const MAX_JACOBI_SWEEPS: usize = 64;

/// Truncated SVD parameters
#[derive(Debug, Clone)]
pub struct SvdConfig {
    /// Number of latent factors (k)
    pub latent_factors: usize,
    /// Subspace iteration steps
    pub max_iterations: usize,
    /// Largest accepted relative residual ‖Aᵀu − σv‖ / σ over the kept triplets
    pub tolerance: f64,
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self {
            latent_factors: 20,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl From<&EngineConfig> for SvdConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            latent_factors: config.latent_factors,
            max_iterations: config.svd_max_iterations,
            tolerance: config.svd_tolerance,
        }
    }
}

/// Fitted truncated SVD of an interaction matrix
#[derive(Debug, Clone)]
pub struct LatentFactorModel {
    /// Σ, descending: [k]
    singular_values: Array1<f64>,
    /// Vᵀ: [k x num_movies]
    components: Array2<f64>,
    /// U Σ, one latent vector per matrix row (user): [num_users x k]
    row_vectors: Array2<f64>,
    /// V Σ, one latent vector per matrix column (movie): [num_movies x k]
    column_vectors: Array2<f64>,
    /// σᵢ² / ‖A‖²_F
    explained_variance_ratio: Array1<f64>,
}

impl LatentFactorModel {
    /// Fit the model.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if `latent_factors` is zero or exceeds
    /// `min(rows, columns) - 1`. The component count is never clamped.
    pub fn fit(matrix: &InteractionMatrix, config: &SvdConfig) -> Result<Self> {
        let a = matrix.values();
        let (m, n) = a.dim();
        let k = config.latent_factors;
        let max_k = m.min(n).saturating_sub(1);

        if k == 0 || k > max_k {
            return Err(RecommenderError::ConfigurationError {
                message: format!(
                    "latent_factors ({}) must be between 1 and {} for a {}x{} interaction matrix",
                    k, max_k, m, n
                ),
                key: Some("REELGRAPH_LATENT_FACTORS".to_string()),
            });
        }

        let block = (2 * k).max(k + MIN_OVERSAMPLING).min(n);
        let mut basis = orthonormal_columns(initial_block(n, block));
        let mut ritz = RitzPairs::extract(a, &basis, k);

        for iteration in 1..config.max_iterations.max(1) {
            if ritz.residual <= config.tolerance {
                debug!(iteration, residual = ritz.residual, "Subspace iteration converged");
                break;
            }
            debug!(iteration, residual = ritz.residual, "Subspace iteration step");

            basis = orthonormal_columns(ritz.next_block);
            ritz = RitzPairs::extract(a, &basis, k);
        }

        if ritz.residual > config.tolerance {
            warn!(
                residual = ritz.residual,
                tolerance = config.tolerance,
                max_iterations = config.max_iterations,
                "Truncated SVD stopped before reaching tolerance"
            );
        }

        let RitzPairs {
            mut singular_values,
            mut right,
            mut left,
            ..
        } = ritz;

        // Largest-magnitude entry of u (or v for a null direction) is positive
        for component in 0..k {
            let pivot = if singular_values[component] > EPSILON {
                left.column(component)
            } else {
                right.column(component)
            };
            if largest_magnitude(pivot) < 0.0 {
                left.column_mut(component).mapv_inplace(|x| -x);
                right.column_mut(component).mapv_inplace(|x| -x);
            }
        }
        singular_values.mapv_inplace(|s| s.max(0.0));

        let components = right.t().to_owned();
        let row_vectors = &left * &singular_values;
        let column_vectors = &right * &singular_values;

        let total_energy: f64 = a.iter().map(|x| x * x).sum();
        let explained_variance_ratio = if total_energy > EPSILON {
            singular_values.mapv(|s| s * s / total_energy)
        } else {
            Array1::<f64>::zeros(k)
        };

        info!(
            rows = m,
            columns = n,
            latent_factors = k,
            explained = explained_variance_ratio.sum(),
            "Fitted truncated SVD"
        );

        Ok(Self {
            singular_values,
            components,
            row_vectors,
            column_vectors,
            explained_variance_ratio,
        })
    }

    pub fn latent_factors(&self) -> usize {
        self.singular_values.len()
    }

    pub fn singular_values(&self) -> &Array1<f64> {
        &self.singular_values
    }

    pub fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }

    /// Vᵀ, one row per latent factor
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    /// Latent vectors indexed by matrix row (user)
    pub fn row_vectors(&self) -> &Array2<f64> {
        &self.row_vectors
    }

    /// Latent vectors indexed by matrix column (movie)
    pub fn column_vectors(&self) -> &Array2<f64> {
        &self.column_vectors
    }

    pub fn column_vector(&self, column: usize) -> Option<ArrayView1<'_, f64>> {
        (column < self.column_vectors.nrows()).then(|| self.column_vectors.row(column))
    }

    /// Project a new user row (one rating per movie column) into latent space
    pub fn project_row(&self, row: &[f64]) -> Result<Array1<f64>> {
        if row.len() != self.components.ncols() {
            return Err(RecommenderError::ValidationError(format!(
                "row has {} entries, model expects {}",
                row.len(),
                self.components.ncols()
            )));
        }

        Ok(self.components.dot(&ArrayView1::from(row)))
    }
}

/// Top-k Ritz approximations of the singular triplets of `a` within the span of `basis`
struct RitzPairs {
    /// Descending: [k]
    singular_values: Array1<f64>,
    /// Right singular vectors as columns: [n x k]
    right: Array2<f64>,
    /// Left singular vectors as columns: [m x k]
    left: Array2<f64>,
    /// AᵀA applied to every Ritz vector of the block, the start of the next step: [n x block]
    next_block: Array2<f64>,
    /// max over the k kept triplets of ‖Aᵀu − σv‖ / σ
    residual: f64,
}

impl RitzPairs {
    fn extract(a: &Array2<f64>, basis: &Array2<f64>, k: usize) -> Self {
        let image = a.dot(basis);
        let gram = image.t().dot(&image);
        let (eigenvalues, rotation) = symmetric_eigen(&gram);

        let sigma = eigenvalues.mapv(|l| l.max(0.0).sqrt());
        let right_all = basis.dot(&rotation);
        let image_all = image.dot(&rotation);
        let next_block = a.t().dot(&image_all);

        let (m, n) = a.dim();
        let scale = sigma.iter().copied().fold(0.0_f64, f64::max);
        let mut singular_values = Array1::<f64>::zeros(k);
        let mut right = Array2::<f64>::zeros((n, k));
        let mut left = Array2::<f64>::zeros((m, k));
        let mut residual = 0.0_f64;

        for j in 0..k {
            let s = sigma[j];
            singular_values[j] = s;
            right.column_mut(j).assign(&right_all.column(j));

            // Null directions carry no residual
            if s <= EPSILON.max(scale * 1e-10) {
                continue;
            }
            left.column_mut(j).assign(&(&image_all.column(j) / s));

            let r = &next_block.column(j) / s - &right_all.column(j) * s;
            residual = residual.max(r.dot(&r).sqrt() / s);
        }

        Self {
            singular_values,
            right,
            left,
            next_block,
            residual,
        }
    }
}

/// Deterministic start block
fn initial_block(n: usize, block: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, block), |(i, c)| {
        let phase = (c + 1) as f64;
        ((i + 1) as f64 * phase).sin() + 1.0 / phase
    })
}

/// Modified Gram-Schmidt over columns, applied twice. A column that collapses is replaced by
/// the first basis vector with a usable residual.
fn orthonormal_columns(mut block: Array2<f64>) -> Array2<f64> {
    let (n, cols) = block.dim();

    for c in 0..cols {
        let original = block.column(c).dot(&block.column(c)).sqrt();
        let mut v = block.column(c).to_owned();
        orthogonalize(&mut v, &block, c);
        orthogonalize(&mut v, &block, c);
        let mut norm = v.dot(&v).sqrt();

        if norm <= EPSILON.max(original * 1e-10) {
            for e in 0..n {
                let mut candidate = Array1::<f64>::zeros(n);
                candidate[e] = 1.0;
                orthogonalize(&mut candidate, &block, c);
                orthogonalize(&mut candidate, &block, c);
                let candidate_norm = candidate.dot(&candidate).sqrt();
                if candidate_norm > 1e-6 {
                    v = candidate;
                    norm = candidate_norm;
                    break;
                }
            }
        }

        block.column_mut(c).assign(&(v / norm));
    }

    block
}

/// Remove the components along the first `count` (orthonormal) columns of `basis`
fn orthogonalize(v: &mut Array1<f64>, basis: &Array2<f64>, count: usize) {
    for c in 0..count {
        let b = basis.column(c);
        let projection = v.dot(&b);
        v.scaled_add(-projection, &b);
    }
}

/// Cyclic Jacobi eigendecomposition of a small symmetric matrix.
///
/// Returns eigenvalues in descending order with matching eigenvectors as columns.
fn symmetric_eigen(matrix: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let size = matrix.nrows();
    let mut a = matrix.clone();
    let mut vectors = Array2::<f64>::eye(size);
    let total: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..size {
            for q in (p + 1)..size {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off.sqrt() <= JACOBI_TOLERANCE * total {
            break;
        }

        for p in 0..size {
            for q in (p + 1)..size {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for r in 0..size {
                    let (arp, arq) = (a[[r, p]], a[[r, q]]);
                    a[[r, p]] = c * arp - s * arq;
                    a[[r, q]] = s * arp + c * arq;
                }
                for r in 0..size {
                    let (apr, aqr) = (a[[p, r]], a[[q, r]]);
                    a[[p, r]] = c * apr - s * aqr;
                    a[[q, r]] = s * apr + c * aqr;
                }
                for r in 0..size {
                    let (vrp, vrq) = (vectors[[r, p]], vectors[[r, q]]);
                    vectors[[r, p]] = c * vrp - s * vrq;
                    vectors[[r, q]] = s * vrp + c * vrq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..size).collect();
    order.sort_by(|&i, &j| {
        a[[j, j]]
            .partial_cmp(&a[[i, i]])
            .unwrap_or(Ordering::Equal)
            .then(i.cmp(&j))
    });

    let eigenvalues = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let eigenvectors = vectors.select(Axis(1), &order);
    (eigenvalues, eigenvectors)
}

fn largest_magnitude(v: ArrayView1<f64>) -> f64 {
    v.iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best })
}
