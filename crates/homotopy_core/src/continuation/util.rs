//! Linear algebra helpers for continuation.
//!
//! Kernel computation for tangents and the SVD-based pseudo-inverse used by
//! Newton-type correctors.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::error::{ContinuationError, Result};

/// Relative singular-value cutoff used when none is supplied.
pub const DEFAULT_RCOND: f64 = 1e-15;

/// Computes a unit vector spanning the kernel of an `n x (n+1)` matrix.
///
/// Uses the Gram matrix eigendecomposition first, falling back to a
/// bordered linear solve if that fails. The sign of the result is arbitrary;
/// callers orient it (see `TangentOrientation`).
pub fn kernel_unit_vector(j_ext: &DMatrix<f64>) -> Result<DVector<f64>> {
    check_extended_shape(j_ext)?;
    if j_ext.iter().any(|v| !v.is_finite()) {
        return Err(ContinuationError::DegenerateKernel {
            reason: "gradient has non-finite entries",
        });
    }
    let vec = match try_gram_eigen(j_ext) {
        Some(vec) => vec,
        None => kernel_linear_solve(j_ext)?,
    };
    let norm = vec.norm();
    if norm == 0.0 || !norm.is_finite() {
        return Err(ContinuationError::DegenerateKernel {
            reason: "kernel vector has zero or non-finite norm",
        });
    }
    Ok(vec / norm)
}

fn check_extended_shape(j_ext: &DMatrix<f64>) -> Result<()> {
    let dim = j_ext.nrows();
    if dim == 0 {
        return Err(ContinuationError::DegenerateKernel {
            reason: "zero-dimensional system",
        });
    }
    if j_ext.ncols() != dim + 1 {
        return Err(ContinuationError::dimension_mismatch(
            "gradient columns",
            dim + 1,
            j_ext.ncols(),
        ));
    }
    Ok(())
}

/// Attempts to find the kernel via the smallest eigenpair of JᵀJ.
fn try_gram_eigen(j_ext: &DMatrix<f64>) -> Option<DVector<f64>> {
    let gram = j_ext.transpose() * j_ext;
    if gram.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let eig = SymmetricEigen::new(gram);
    if eig.eigenvalues.is_empty() {
        return None;
    }

    let mut min_idx = 0;
    let mut min_val = f64::INFINITY;
    for (i, &val) in eig.eigenvalues.iter().enumerate() {
        if val.is_finite() && val < min_val {
            min_val = val;
            min_idx = i;
        }
    }
    if !min_val.is_finite() {
        return None;
    }

    let vec = eig.eigenvectors.column(min_idx).into_owned();
    if vec.norm_squared() == 0.0 || vec.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(vec)
}

/// Solves [J; e_colᵀ] t = e_n for each choice of bordering column until one
/// is nonsingular.
fn kernel_linear_solve(j_ext: &DMatrix<f64>) -> Result<DVector<f64>> {
    let dim = j_ext.nrows();

    let mut a = DMatrix::zeros(dim + 1, dim + 1);
    a.view_mut((0, 0), (dim, dim + 1)).copy_from(j_ext);
    let mut rhs = DVector::zeros(dim + 1);
    rhs[dim] = 1.0;

    for col in (0..=dim).rev() {
        for j in 0..=dim {
            a[(dim, j)] = 0.0;
        }
        a[(dim, col)] = 1.0;

        if let Some(solution) = a.clone().lu().solve(&rhs) {
            if solution.iter().all(|v| v.is_finite()) && solution.norm_squared() != 0.0 {
                return Ok(solution);
            }
        }
    }

    Err(ContinuationError::DegenerateKernel {
        reason: "all bordered solves singular",
    })
}

/// Moore-Penrose pseudo-inverse via SVD.
///
/// Singular values at or below `rcond * σ_max` are treated as zero.
pub fn pseudo_inverse(mat: &DMatrix<f64>, rcond: f64) -> Result<DMatrix<f64>> {
    if mat.iter().any(|v| !v.is_finite()) {
        return Err(ContinuationError::PseudoInverse {
            reason: "matrix has non-finite entries",
        });
    }
    let svd = mat.clone().svd(true, true);
    let sigma_max = svd.singular_values.iter().cloned().fold(0.0, f64::max);
    svd.pseudo_inverse(rcond * sigma_max)
        .map_err(|reason| ContinuationError::PseudoInverse { reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn kernel_unit_vector_finds_null_vector() {
        let mat = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let tangent = kernel_unit_vector(&mat).expect("kernel should compute");
        let residual = &mat * &tangent;
        assert_relative_eq!(tangent.norm(), 1.0, epsilon = 1e-12);
        assert!(residual.iter().all(|v| v.abs() < 1e-9));
        assert_relative_eq!(tangent[2].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn kernel_unit_vector_single_row() {
        let mat = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let tangent = kernel_unit_vector(&mat).expect("kernel should compute");
        let residual = tangent[0] + 2.0 * tangent[1];
        assert!(residual.abs() < 1e-9);
        assert_relative_eq!(tangent.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn kernel_unit_vector_rejects_invalid_shape() {
        let mat = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        assert_err_contains(kernel_unit_vector(&mat), "expected 3, got 2");
    }

    #[test]
    fn kernel_unit_vector_errors_on_empty_matrix() {
        let mat = DMatrix::<f64>::zeros(0, 0);
        assert_err_contains(kernel_unit_vector(&mat), "zero-dimensional system");
    }

    #[test]
    fn kernel_unit_vector_rejects_non_finite_gradient() {
        let mat = DMatrix::from_row_slice(1, 2, &[f64::NAN, 1.0]);
        assert_err_contains(kernel_unit_vector(&mat), "non-finite entries");
    }

    #[test]
    fn kernel_linear_solve_matches_gram_kernel() {
        let mat = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, -1.0, 0.5, 3.0, 1.0]);
        let solved = kernel_linear_solve(&mat).expect("bordered solve should work");
        let residual = &mat * &solved;
        assert!(residual.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn kernel_linear_solve_errors_on_singular_system() {
        let mat = DMatrix::<f64>::zeros(1, 2);
        assert_err_contains(kernel_linear_solve(&mat), "all bordered solves");
    }

    #[test]
    fn pseudo_inverse_of_wide_matrix_is_right_inverse() {
        let mat = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 0.0, 0.0, 1.0, 1.0]);
        let pinv = pseudo_inverse(&mat, DEFAULT_RCOND).expect("pinv should compute");
        assert_eq!(pinv.shape(), (3, 2));
        assert_relative_eq!(&mat * &pinv, DMatrix::identity(2, 2), epsilon = 1e-12);
    }

    #[test]
    fn pseudo_inverse_gives_minimum_norm_solution() {
        // x + y = 2 has minimum-norm solution (1, 1).
        let mat = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let pinv = pseudo_inverse(&mat, DEFAULT_RCOND).expect("pinv should compute");
        let sol = pinv * DVector::from_element(1, 2.0);
        assert_relative_eq!(sol[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(sol[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pseudo_inverse_rejects_non_finite() {
        let mat = DMatrix::from_row_slice(1, 2, &[f64::NAN, 1.0]);
        assert_err_contains(pseudo_inverse(&mat, DEFAULT_RCOND), "non-finite");
    }
}
