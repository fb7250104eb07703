// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Basis kets and superpositions of them.
//!
//! A [`State`] maps basis kets ([`BaseState`]) to symbolic coefficients.
//! All kets of a state must be compatible: the same family (qudit or Fock)
//! and, for qudits, the same length and base.
//!
//! # Example
//!
//! ```
//! use qualg::state::{BaseState, State};
//! use qualg::variable::VariableContext;
//!
//! let mut ctx = VariableContext::new();
//! let a = State::from_base(BaseState::qubit("00").unwrap());
//! let b = State::from_base(BaseState::qubit("1").unwrap());
//! let ab = a.tensor_product(&b, &mut ctx).unwrap();
//! assert_eq!(ab.len(), 1);
//! ```

pub mod fock;
pub mod qudit;

pub use fock::{BaseFockState, FockOp, FockOpProduct};
pub use qudit::BaseQuditState;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Neg;

use ndarray::Array1;
use num_complex::Complex64;

use crate::error::{AlgebraError, Result};
use crate::integrate::integrate;
use crate::scalar::Scalar;
use crate::variable::{Symbolic, Variable, VariableContext};

/// A single basis ket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseState {
    Qudit(BaseQuditState),
    Fock(BaseFockState),
}

impl BaseState {
    pub fn qubit(digits: &str) -> Result<Self> {
        Ok(BaseState::Qudit(BaseQuditState::qubit(digits)?))
    }

    pub fn qudit(digits: &str, base: u32) -> Result<Self> {
        Ok(BaseState::Qudit(BaseQuditState::new(digits, base)?))
    }

    fn kind(&self) -> &'static str {
        match self {
            BaseState::Qudit(_) => "qudit ket",
            BaseState::Fock(_) => "fock ket",
        }
    }

    /// Dimension of the ket's space, `None` when infinite-dimensional or too
    /// large to index.
    pub fn shape(&self) -> Option<usize> {
        match self {
            BaseState::Qudit(q) => q.shape(),
            BaseState::Fock(_) => None,
        }
    }

    /// Index into a dense vector, `None` when infinite-dimensional.
    pub fn vector_index(&self) -> Option<usize> {
        match self {
            BaseState::Qudit(q) => q.vector_index(),
            BaseState::Fock(_) => None,
        }
    }

    pub fn is_compatible(&self, other: &BaseState) -> bool {
        match (self, other) {
            (BaseState::Qudit(a), BaseState::Qudit(b)) => a.is_compatible(b),
            (BaseState::Fock(_), BaseState::Fock(_)) => true,
            _ => false,
        }
    }

    pub fn inner_product(
        &self,
        other: &BaseState,
    ) -> std::result::Result<Scalar, AlgebraError> {
        match (self, other) {
            (BaseState::Qudit(a), BaseState::Qudit(b)) => a.inner_product(b),
            (BaseState::Fock(a), BaseState::Fock(b)) => Ok(a.inner_product(b)),
            _ => Err(AlgebraError::TypeMismatch {
                operation: "inner product",
                expected: self.kind().into(),
                found: other.kind().into(),
            }),
        }
    }

    pub fn tensor_product(
        &self,
        other: &BaseState,
    ) -> std::result::Result<BaseState, AlgebraError> {
        match (self, other) {
            (BaseState::Qudit(a), BaseState::Qudit(b)) => {
                Ok(BaseState::Qudit(a.tensor_product(b)?))
            }
            (BaseState::Fock(a), BaseState::Fock(b)) => Ok(BaseState::Fock(a.tensor_product(b))),
            _ => Err(AlgebraError::TypeMismatch {
                operation: "tensor product",
                expected: self.kind().into(),
                found: other.kind().into(),
            }),
        }
    }

    pub fn to_state(&self) -> State {
        State::from_base(self.clone())
    }
}

impl Symbolic for BaseState {
    fn variables(&self) -> BTreeSet<Variable> {
        match self {
            BaseState::Qudit(_) => BTreeSet::new(),
            BaseState::Fock(f) => f.variables(),
        }
    }

    fn replace_var(&self, old: &Variable, new: &Variable) -> Self {
        match self {
            BaseState::Qudit(_) => self.clone(),
            BaseState::Fock(f) => BaseState::Fock(f.replace_var(old, new)),
        }
    }
}

impl From<BaseQuditState> for BaseState {
    fn from(q: BaseQuditState) -> Self {
        BaseState::Qudit(q)
    }
}

impl From<BaseFockState> for BaseState {
    fn from(f: BaseFockState) -> Self {
        BaseState::Fock(f)
    }
}

impl fmt::Display for BaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseState::Qudit(q) => write!(f, "{}", q),
            BaseState::Fock(s) => write!(f, "{}", s),
        }
    }
}

/// Position of every ket in an explicit ordered basis.
pub(crate) fn basis_positions<'a>(
    basis: &'a [BaseState],
) -> BTreeMap<&'a BaseState, usize> {
    basis.iter().enumerate().map(|(i, k)| (k, i)).collect()
}

/// A superposition `Σ c_k |k⟩`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    terms: BTreeMap<BaseState, Scalar>,
}

impl State {
    /// Build from `(ket, coefficient)` pairs; repeated kets are summed.
    pub fn new(pairs: Vec<(BaseState, Scalar)>) -> Result<Self> {
        let mut state = State::default();
        for (ket, scalar) in pairs {
            state.check_ket(&ket, "state construction")?;
            state.accumulate(ket, scalar);
        }
        Ok(state)
    }

    pub fn from_base(ket: BaseState) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(ket, Scalar::one());
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BaseState, &Scalar)> {
        self.terms.iter()
    }

    /// Coefficient of `ket`, zero when absent.
    pub fn get_scalar(&self, ket: &BaseState) -> Scalar {
        self.terms.get(ket).cloned().unwrap_or_else(Scalar::zero)
    }

    pub(crate) fn accumulate(&mut self, ket: BaseState, scalar: Scalar) {
        match self.terms.remove(&ket) {
            Some(existing) => {
                self.terms.insert(ket, existing + scalar);
            }
            None => {
                self.terms.insert(ket, scalar);
            }
        }
    }

    fn check_ket(&self, ket: &BaseState, operation: &'static str) -> Result<()> {
        match self.terms.keys().next() {
            Some(first) if !first.is_compatible(ket) => Err(AlgebraError::ShapeMismatch {
                operation,
                left: first.to_string(),
                right: ket.to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn check_compatible(&self, other: &State, operation: &'static str) -> Result<()> {
        match other.terms.keys().next() {
            Some(ket) => self.check_ket(ket, operation),
            None => Ok(()),
        }
    }

    pub fn checked_add(&self, other: &State) -> Result<State> {
        self.check_compatible(other, "state addition")?;
        let mut out = self.clone();
        for (ket, scalar) in &other.terms {
            out.accumulate(ket.clone(), scalar.clone());
        }
        Ok(out)
    }

    pub fn checked_sub(&self, other: &State) -> Result<State> {
        self.checked_add(&-other.clone())
    }

    /// Multiply every coefficient by `factor`.
    pub fn scale(&self, factor: &Scalar) -> State {
        let terms = self
            .terms
            .iter()
            .map(|(ket, c)| (ket.clone(), factor.clone() * c.clone()))
            .collect();
        State { terms }
    }

    /// Simplify every coefficient and drop the ones that vanish.
    pub fn simplify(&self) -> State {
        let terms = self
            .terms
            .iter()
            .map(|(ket, c)| (ket.clone(), c.simplify()))
            .filter(|(_, c)| !c.is_zero())
            .collect();
        State { terms }
    }

    /// `⟨self|other⟩ = Σ conj(c_i) c_j ⟨k_i|k_j⟩`, unsimplified.
    ///
    /// Variables are taken as they are, so a variable shared by both sides
    /// is treated as the same quantity.
    pub fn inner_product(&self, other: &State) -> Result<Scalar> {
        self.check_compatible(other, "inner product")?;
        let mut terms = Vec::new();
        for (left_ket, left_c) in &self.terms {
            if left_c.is_zero() {
                continue;
            }
            for (right_ket, right_c) in &other.terms {
                if right_c.is_zero() {
                    continue;
                }
                let overlap = left_ket.inner_product(right_ket)?;
                if overlap.is_zero() {
                    continue;
                }
                terms.push(left_c.conjugate() * right_c.clone() * overlap);
            }
        }
        Ok(Scalar::Sum(terms))
    }

    /// Inner product treating both states as independent integrals: variables
    /// of `other` that also occur in `self` are renamed first.
    pub fn inner_product_with(&self, other: &State, ctx: &mut VariableContext) -> Result<Scalar> {
        let other = ctx.disambiguate(&self.variables(), other);
        self.inner_product(&other)
    }

    /// `self ⊗ other`, renaming colliding variables of `other` first.
    pub fn tensor_product(&self, other: &State, ctx: &mut VariableContext) -> Result<State> {
        let other = ctx.disambiguate(&self.variables(), other);
        let mut out = State::default();
        for (left_ket, left_c) in &self.terms {
            for (right_ket, right_c) in &other.terms {
                let ket = left_ket.tensor_product(right_ket)?;
                out.check_ket(&ket, "tensor product")?;
                out.accumulate(ket, left_c.clone() * right_c.clone());
            }
        }
        Ok(out)
    }

    /// Integrate every coefficient over the variables that do not label its
    /// ket.
    pub fn integrate_bound(&self) -> State {
        let terms = self
            .terms
            .iter()
            .map(|(ket, c)| {
                let bound: BTreeSet<Variable> =
                    c.variables().difference(&ket.variables()).cloned().collect();
                (ket.clone(), integrate(c, &bound))
            })
            .filter(|(_, c)| !c.is_zero())
            .collect();
        State { terms }
    }

    /// Dense amplitudes over an explicit ordered basis.
    pub fn to_vector(&self, basis: &[BaseState]) -> Result<Array1<Complex64>> {
        self.to_vector_with(basis, &|_: &Scalar| None)
    }

    pub fn to_vector_with<F>(&self, basis: &[BaseState], resolve: &F) -> Result<Array1<Complex64>>
    where
        F: Fn(&Scalar) -> Option<Complex64>,
    {
        let positions = basis_positions(basis);
        let mut vector = Array1::zeros(basis.len());
        for (ket, c) in &self.terms {
            let c = c.simplify();
            if c.is_zero() {
                continue;
            }
            let index = positions.get(ket).ok_or_else(|| AlgebraError::ShapeMismatch {
                operation: "vector export",
                left: ket.to_string(),
                right: format!("basis of {} kets", basis.len()),
            })?;
            vector[*index] += c.evaluate_with(resolve)?;
        }
        Ok(vector)
    }
}

impl Symbolic for State {
    fn variables(&self) -> BTreeSet<Variable> {
        self.terms
            .iter()
            .flat_map(|(ket, c)| ket.variables().into_iter().chain(c.variables()))
            .collect()
    }

    fn replace_var(&self, old: &Variable, new: &Variable) -> Self {
        let mut out = State::default();
        for (ket, c) in &self.terms {
            out.accumulate(ket.replace_var(old, new), c.replace_var(old, new));
        }
        out
    }
}

impl Neg for State {
    type Output = State;

    fn neg(self) -> State {
        self.scale(&Scalar::number(-1.0))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, (ket, c)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}*{}", c, ket)?;
        }
        Ok(())
    }
}
