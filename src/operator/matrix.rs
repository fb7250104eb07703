// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense export of operators over explicit, ordered bases.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use super::Operator;
use crate::error::{AlgebraError, Result};
use crate::scalar::Scalar;
use crate::state::{basis_positions, BaseQuditState, BaseState};

/// All `len`-qudit kets of the given base, in vector-index order.
pub fn qudit_basis(len: usize, base: u32) -> Result<Vec<BaseState>> {
    Ok(BaseQuditState::basis(len, base)?
        .into_iter()
        .map(BaseState::Qudit)
        .collect())
}

impl Operator {
    /// Matrix elements `M[i, j] = ⟨out_i| O |in_j⟩`.
    ///
    /// Every coefficient must reduce to a number.
    pub fn to_matrix(
        &self,
        out_basis: &[BaseState],
        in_basis: &[BaseState],
    ) -> Result<Array2<Complex64>> {
        self.to_matrix_with(out_basis, in_basis, &|_: &Scalar| None)
    }

    /// Like [`Operator::to_matrix`], with `resolve` supplying values for the
    /// symbolic atoms left in the coefficients (e.g. mode overlaps).
    pub fn to_matrix_with<F>(
        &self,
        out_basis: &[BaseState],
        in_basis: &[BaseState],
        resolve: &F,
    ) -> Result<Array2<Complex64>>
    where
        F: Fn(&Scalar) -> Option<Complex64>,
    {
        let rows = basis_positions(out_basis);
        let cols = basis_positions(in_basis);
        let mut matrix = Array2::zeros((out_basis.len(), in_basis.len()));

        for (base, c) in self.iter() {
            let c = c.simplify();
            if c.is_zero() {
                continue;
            }
            let (Some(i), Some(j)) = (rows.get(&base.output), cols.get(&base.input)) else {
                return Err(AlgebraError::ShapeMismatch {
                    operation: "matrix export",
                    left: base.to_string(),
                    right: format!("{}x{} basis", out_basis.len(), in_basis.len()),
                }
                .into());
            };
            matrix[[*i, *j]] += c.evaluate_with(resolve)?;
        }

        debug!(
            rows = out_basis.len(),
            cols = in_basis.len(),
            terms = self.len(),
            "Exported operator matrix"
        );
        Ok(matrix)
    }
}
