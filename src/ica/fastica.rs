//! PCA whitening and FastICA rotation.
//!
//! The PCA step runs here so the rank cut is ours (average-referenced data
//! loses one dimension). The rotation in whitened space is fitted with
//! `linfa-ica`, and the `[k, k]` unmixing matrix is recovered from its
//! sources by least squares:
//!
//! ```text
//! Z  = whitener · Xc                         [k, T]
//! S  = FastIca(Zᵀ).predict(Zᵀ)ᵀ              [k, T]
//! W  = S·Zᵀ · (Z·Zᵀ)⁺                        [k, k]
//! ```
use linfa::prelude::*;
use linfa_ica::fast_ica::FastIca;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;

use crate::error::{PipelineError, Result};

fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Eigen-decomposition of a symmetric matrix, eigenvalues sorted descending.
///
/// Returns `(values, vectors)` with eigenvectors in the *columns* of `vectors`.
pub fn sym_eigen(a: &Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let n = a.nrows();
    let eig = SymmetricEigen::new(to_dmatrix(a));

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eig.eigenvalues[j].total_cmp(&eig.eigenvalues[i]));

    let values = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let vectors = Array2::from_shape_fn((n, n), |(r, c)| eig.eigenvectors[(r, order[c])]);
    (values, vectors)
}

/// Moore–Penrose pseudo-inverse.
pub fn pinv(a: &Array2<f64>) -> Result<Array2<f64>> {
    to_dmatrix(a)
        .pseudo_inverse(1e-12)
        .map(|m| from_dmatrix(&m))
        .map_err(|e| PipelineError::Numerical(format!("pseudo-inverse failed: {e}")))
}

/// PCA whitening of centred data `xc` ([C, T]).
#[derive(Debug, Clone)]
pub struct Whitening {
    /// [k, C]: rows are `e_iᵀ / √λ_i`.
    pub whitener: Array2<f64>,
    /// [C, k]: columns are `e_i · √λ_i`.
    pub dewhitener: Array2<f64>,
    /// Variance explained by each kept component.
    pub explained_variance: Vec<f64>,
    /// Numerical rank of the covariance.
    pub rank: usize,
}

pub fn pca_whitening(xc: &Array2<f64>, n_components: usize) -> Result<Whitening> {
    let (n_ch, n_t) = xc.dim();
    if n_t < 2 {
        return Err(PipelineError::InvalidParameter(format!(
            "ICA needs at least 2 samples, got {n_t}"
        )));
    }
    let cov = xc.dot(&xc.t()) / (n_t as f64 - 1.0);
    let (values, vectors) = sym_eigen(&cov);

    let top = values.first().copied().unwrap_or(0.0);
    if top.is_nan() || top <= 0.0 {
        return Err(PipelineError::Numerical("data covariance is zero; nothing to decompose".into()));
    }
    let rank = values.iter().filter(|&&v| v > top * 1e-12).count();
    let k = n_components.min(n_ch).min(rank);
    if k < n_components {
        log::warn!("ICA: reducing n_components from {n_components} to {k} (channels={n_ch}, rank={rank})");
    }

    let mut whitener = Array2::<f64>::zeros((k, n_ch));
    let mut dewhitener = Array2::<f64>::zeros((n_ch, k));
    for i in 0..k {
        let sd = values[i].sqrt();
        whitener.row_mut(i).assign(&vectors.column(i).mapv(|v| v / sd));
        dewhitener.column_mut(i).assign(&vectors.column(i).mapv(|v| v * sd));
    }

    Ok(Whitening {
        whitener,
        dewhitener,
        explained_variance: values[..k].to_vec(),
        rank,
    })
}

/// Fit FastICA (logcosh) on whitened data `z` ([k, T]) and return the
/// `[k, k]` unmixing matrix, rows scaled so every source has unit variance.
pub fn fit_unmixing(z: &Array2<f64>, seed: u64, max_iter: usize, tol: f64) -> Result<Array2<f64>> {
    let (k, n_t) = z.dim();
    let records = z.t().to_owned();
    let dataset = DatasetBase::from(records.clone());

    let model = FastIca::<f64>::params()
        .ncomponents(k)
        .max_iter(max_iter)
        .tol(tol)
        .random_state(seed as usize)
        .fit(&dataset)
        .map_err(|e| PipelineError::Numerical(format!("FastICA failed: {e}")))?;
    let sources: Array2<f64> = model.predict(&records);

    let mut unmixing = sources.t().dot(&records).dot(&pinv(&z.dot(&records))?);

    let fitted = unmixing.dot(z);
    for (mut row, src) in unmixing.rows_mut().into_iter().zip(fitted.rows()) {
        let sd = src.std(1.0);
        if sd.is_nan() || sd <= 0.0 {
            return Err(PipelineError::Numerical("FastICA returned a flat component".into()));
        }
        row.mapv_inplace(|v| v / sd);
    }
    log::debug!("FastICA: {k} components from {n_t} samples");
    Ok(unmixing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Axis;

    fn centred(x: Array2<f64>) -> Array2<f64> {
        let mean = x.mean_axis(Axis(1)).unwrap();
        &x - &mean.insert_axis(Axis(1))
    }

    fn three_signals() -> Array2<f64> {
        centred(Array2::from_shape_fn((3, 2000), |(c, t)| {
            let t = t as f64 * 0.01;
            match c {
                0 => (3.0 * t).sin() + 0.5 * (7.0 * t).cos(),
                1 => (3.0 * t).sin() - (11.0 * t).sin(),
                _ => 0.2 * (7.0 * t).cos() + (13.0 * t).sin(),
            }
        }))
    }

    #[test]
    fn eigen_sorted_descending() {
        let a = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 3.0]).unwrap();
        let (vals, vecs) = sym_eigen(&a);
        assert_abs_diff_eq!(vals[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(vals[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(vecs[[1, 0]].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pinv_inverts_square_matrix() {
        let a = Array2::from_shape_vec((2, 2), vec![2.0, 1.0, 1.0, 3.0]).unwrap();
        let eye = a.dot(&pinv(&a).unwrap());
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(eye[[i, j]], if i == j { 1.0 } else { 0.0 }, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn whitened_data_has_identity_covariance() {
        let xc = three_signals();
        let wh = pca_whitening(&xc, 3).unwrap();
        let z = wh.whitener.dot(&xc);
        let cov = z.dot(&z.t()) / (z.ncols() as f64 - 1.0);
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(cov[[i, j]], expect, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn rank_deficient_data_limits_components() {
        // Third channel is the sum of the first two.
        let x = Array2::from_shape_fn((3, 500), |(c, t)| {
            let a = (t as f64 * 0.1).sin();
            let b = (t as f64 * 0.37).cos();
            match c { 0 => a, 1 => b, _ => a + b }
        });
        let wh = pca_whitening(&centred(x), 3).unwrap();
        assert_eq!(wh.rank, 2);
        assert_eq!(wh.whitener.nrows(), 2);
    }

    #[test]
    fn unmixing_is_seeded_and_yields_uncorrelated_sources() {
        let xc = three_signals();
        let z = pca_whitening(&xc, 3).unwrap().whitener.dot(&xc);
        let w = fit_unmixing(&z, 42, 1000, 1e-4).unwrap();
        assert_eq!(w, fit_unmixing(&z, 42, 1000, 1e-4).unwrap());

        let s = w.dot(&z);
        let cov = s.dot(&s.t()) / (s.ncols() as f64 - 1.0);
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(cov[[i, j]], expect, epsilon = 1e-6);
            }
        }
    }
}
