// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bosonic kets built from creation operators acting on vacuum.
//!
//! Every excitation carries a symbolic variable (typically a frequency), so
//! the overlap of two kets is a combination of delta functions rather than a
//! number.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Mul;

use itertools::Itertools;

use crate::error::AlgebraError;
use crate::scalar::Scalar;
use crate::variable::{Symbolic, Variable};

/// A creation (`a†(w)`) or annihilation (`a(w)`) operator on a mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FockOp {
    pub mode: String,
    pub variable: Variable,
    pub creation: bool,
}

impl FockOp {
    pub fn creation(mode: impl Into<String>, variable: impl Into<Variable>) -> Self {
        Self {
            mode: mode.into(),
            variable: variable.into(),
            creation: true,
        }
    }

    pub fn annihilation(mode: impl Into<String>, variable: impl Into<Variable>) -> Self {
        Self {
            mode: mode.into(),
            variable: variable.into(),
            creation: false,
        }
    }

    pub fn dagger(&self) -> Self {
        Self {
            creation: !self.creation,
            ..self.clone()
        }
    }
}

impl Symbolic for FockOp {
    fn variables(&self) -> BTreeSet<Variable> {
        BTreeSet::from([self.variable.clone()])
    }

    fn replace_var(&self, old: &Variable, new: &Variable) -> Self {
        if &self.variable == old {
            Self {
                variable: new.clone(),
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for FockOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dag = if self.creation { "+" } else { "" };
        write!(f, "{}{}({})", self.mode, dag, self.variable)
    }
}

/// An ordered product of [`FockOp`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FockOpProduct(Vec<FockOp>);

impl FockOpProduct {
    pub fn new(ops: Vec<FockOp>) -> Self {
        Self(ops)
    }

    pub fn ops(&self) -> &[FockOp] {
        &self.0
    }

    pub fn is_creation_only(&self) -> bool {
        self.0.iter().all(|op| op.creation)
    }

    /// Hermitian conjugate: reversed order, each factor daggered.
    pub fn dagger(&self) -> Self {
        Self(self.0.iter().rev().map(FockOp::dagger).collect())
    }

    /// Excitation variables grouped by mode, each list sorted.
    pub fn variables_by_mode(&self) -> BTreeMap<String, Vec<Variable>> {
        let mut by_mode: BTreeMap<String, Vec<Variable>> = BTreeMap::new();
        for op in &self.0 {
            by_mode
                .entry(op.mode.clone())
                .or_default()
                .push(op.variable.clone());
        }
        for vars in by_mode.values_mut() {
            vars.sort();
        }
        by_mode
    }
}

impl Mul<FockOp> for FockOpProduct {
    type Output = FockOpProduct;

    fn mul(mut self, rhs: FockOp) -> FockOpProduct {
        self.0.push(rhs);
        self
    }
}

impl Mul for FockOpProduct {
    type Output = FockOpProduct;

    fn mul(mut self, rhs: FockOpProduct) -> FockOpProduct {
        self.0.extend(rhs.0);
        self
    }
}

impl Symbolic for FockOpProduct {
    fn variables(&self) -> BTreeSet<Variable> {
        self.0.iter().map(|op| op.variable.clone()).collect()
    }

    fn replace_var(&self, old: &Variable, new: &Variable) -> Self {
        Self(self.0.iter().map(|op| op.replace_var(old, new)).collect())
    }
}

impl fmt::Display for FockOpProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("*"))
    }
}

/// A Fock ket: per mode, the sorted multiset of excitation variables.
///
/// A mode mapped to an empty list is an explicitly listed vacuum mode. Modes
/// missing from a ket are in vacuum too, so they only matter for display and
/// structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BaseFockState {
    modes: BTreeMap<String, Vec<Variable>>,
}

impl BaseFockState {
    /// The vacuum over the given (possibly empty) list of modes.
    pub fn vacuum<I, S>(modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modes: modes.into_iter().map(|m| (m.into(), Vec::new())).collect(),
        }
    }

    /// `a†_1(w_1) ... a†_n(w_n) |0⟩`.
    pub fn from_product(product: &FockOpProduct) -> Result<Self, AlgebraError> {
        if let Some(op) = product.ops().iter().find(|op| !op.creation) {
            return Err(AlgebraError::TypeMismatch {
                operation: "fock state construction",
                expected: "creation operator".into(),
                found: op.to_string(),
            });
        }
        Ok(Self {
            modes: product.variables_by_mode(),
        })
    }

    /// Shorthand for a ket of creation operators given as `(mode, variable)`.
    pub fn excitations<I, M, V>(excitations: I) -> Self
    where
        I: IntoIterator<Item = (M, V)>,
        M: Into<String>,
        V: Into<Variable>,
    {
        let mut modes: BTreeMap<String, Vec<Variable>> = BTreeMap::new();
        for (mode, var) in excitations {
            modes.entry(mode.into()).or_default().push(var.into());
        }
        for vars in modes.values_mut() {
            vars.sort();
        }
        Self { modes }
    }

    /// The creation operators that build this ket from vacuum.
    pub fn to_product(&self) -> FockOpProduct {
        FockOpProduct::new(
            self.modes
                .iter()
                .flat_map(|(mode, vars)| {
                    vars.iter().map(move |v| FockOp::creation(mode.clone(), v))
                })
                .collect(),
        )
    }

    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    /// Photons in `mode` (zero for modes not listed).
    pub fn occupation(&self, mode: &str) -> usize {
        self.modes.get(mode).map_or(0, Vec::len)
    }

    pub fn photon_count(&self) -> usize {
        self.modes.values().map(Vec::len).sum()
    }

    /// `⟨self|other⟩` as a product over modes of symmetrized deltas.
    pub fn inner_product(&self, other: &Self) -> Scalar {
        let all_modes: BTreeSet<&String> = self.modes.keys().chain(other.modes.keys()).collect();
        let empty = Vec::new();
        let mut factors = Vec::new();

        for mode in all_modes {
            let left = self.modes.get(mode).unwrap_or(&empty);
            let right = other.modes.get(mode).unwrap_or(&empty);
            if left.len() != right.len() {
                return Scalar::zero();
            }
            if left.is_empty() {
                continue;
            }
            let terms = right
                .iter()
                .permutations(right.len())
                .map(|perm| {
                    left.iter()
                        .zip(perm)
                        .map(|(l, r)| Scalar::delta(l, r))
                        .product::<Scalar>()
                })
                .collect();
            factors.push(Scalar::Sum(terms));
        }

        Scalar::Product(factors).simplify()
    }

    /// Merge modes; photons in a shared mode accumulate.
    pub fn tensor_product(&self, other: &Self) -> Self {
        let mut modes = self.modes.clone();
        for (mode, vars) in &other.modes {
            let entry = modes.entry(mode.clone()).or_default();
            entry.extend(vars.iter().cloned());
            entry.sort();
        }
        Self { modes }
    }
}

impl Symbolic for BaseFockState {
    fn variables(&self) -> BTreeSet<Variable> {
        self.modes.values().flatten().cloned().collect()
    }

    fn replace_var(&self, old: &Variable, new: &Variable) -> Self {
        let modes = self
            .modes
            .iter()
            .map(|(mode, vars)| {
                let mut vars: Vec<Variable> = vars
                    .iter()
                    .map(|v| if v == old { new.clone() } else { v.clone() })
                    .collect();
                vars.sort();
                (mode.clone(), vars)
            })
            .collect();
        Self { modes }
    }
}

impl fmt::Display for BaseFockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modes.is_empty() {
            return f.write_str("|0>");
        }
        let parts = self.modes.iter().map(|(mode, vars)| {
            if vars.is_empty() {
                format!("{}:0", mode)
            } else {
                format!("{}:{}({})", mode, vars.len(), vars.iter().join(","))
            }
        });
        write!(f, "|{}>", parts.format(","))
    }
}
