// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Computational basis kets of qudits (qubits are qudits of base 2).

use std::fmt;

use itertools::Itertools;

use crate::error::{AlgebraError, Result};
use crate::scalar::Scalar;
use crate::validation::{parse_digits, validate_base, validate_digits};

/// A computational basis ket `|d_1 d_2 ... d_n⟩` with digits in `0..base`.
///
/// Kets of the same length and base are ordered by their vector index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BaseQuditState {
    digits: Vec<u32>,
    base: u32,
}

impl BaseQuditState {
    /// Parse a digit string such as `"0102"`.
    pub fn new(digits: &str, base: u32) -> Result<Self> {
        let digits = parse_digits(digits, base)?;
        Ok(Self { digits, base })
    }

    pub fn from_digits(digits: Vec<u32>, base: u32) -> Result<Self> {
        validate_digits(&digits, base)?;
        Ok(Self { digits, base })
    }

    /// A qubit ket, e.g. `BaseQuditState::qubit("01")`.
    pub fn qubit(digits: &str) -> Result<Self> {
        Self::new(digits, 2)
    }

    /// All kets of `len` qudits in vector-index order.
    pub fn basis(len: usize, base: u32) -> Result<Vec<Self>> {
        validate_base(base)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        Ok((0..len)
            .map(|_| 0..base)
            .multi_cartesian_product()
            .map(|digits| Self { digits, base })
            .collect())
    }

    pub fn digits(&self) -> &[u32] {
        &self.digits
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of qudits.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Dimension of the space this ket lives in, `None` if it overflows `usize`.
    pub fn shape(&self) -> Option<usize> {
        let len = u32::try_from(self.digits.len()).ok()?;
        (self.base as usize).checked_pow(len)
    }

    /// Position of this ket in a dense vector (digits read base-`base`),
    /// `None` if it overflows `usize`.
    pub fn vector_index(&self) -> Option<usize> {
        self.digits.iter().try_fold(0usize, |acc, d| {
            acc.checked_mul(self.base as usize)?.checked_add(*d as usize)
        })
    }

    pub fn is_compatible(&self, other: &Self) -> bool {
        self.base == other.base && self.digits.len() == other.digits.len()
    }

    /// Kronecker delta on the digits.
    pub fn inner_product(&self, other: &Self) -> std::result::Result<Scalar, AlgebraError> {
        if !self.is_compatible(other) {
            return Err(AlgebraError::ShapeMismatch {
                operation: "inner product",
                left: self.to_string(),
                right: other.to_string(),
            });
        }
        Ok(if self.digits == other.digits {
            Scalar::one()
        } else {
            Scalar::zero()
        })
    }

    /// Positional concatenation `|a⟩ ⊗ |b⟩ = |ab⟩`.
    pub fn tensor_product(&self, other: &Self) -> std::result::Result<Self, AlgebraError> {
        if self.base != other.base {
            return Err(AlgebraError::ShapeMismatch {
                operation: "tensor product",
                left: format!("base {}", self.base),
                right: format!("base {}", other.base),
            });
        }
        let mut digits = self.digits.clone();
        digits.extend_from_slice(&other.digits);
        Ok(Self {
            digits,
            base: self.base,
        })
    }
}

impl fmt::Display for BaseQuditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("|")?;
        for d in &self.digits {
            write!(f, "{}", char::from_digit(*d, self.base).unwrap_or('?'))?;
        }
        f.write_str(">")
    }
}
