// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Linear operators as sums of symbolic outer products `c |out⟩⟨in|`.

pub mod matrix;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Neg;

use crate::error::{AlgebraError, Result};
use crate::integrate::integrate;
use crate::scalar::Scalar;
use crate::state::{BaseState, State};
use crate::variable::{Symbolic, Variable, VariableContext};

/// The outer product `|output⟩⟨input|` of two basis kets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BaseOperator {
    pub output: BaseState,
    pub input: BaseState,
}

impl BaseOperator {
    pub fn new(output: BaseState, input: BaseState) -> Self {
        Self { output, input }
    }

    pub fn to_operator(&self) -> Operator {
        let mut terms = BTreeMap::new();
        terms.insert(self.clone(), Scalar::one());
        Operator { terms }
    }

    /// `|in⟩⟨out|`.
    pub fn dagger(&self) -> Self {
        Self {
            output: self.input.clone(),
            input: self.output.clone(),
        }
    }
}

impl Symbolic for BaseOperator {
    fn variables(&self) -> BTreeSet<Variable> {
        let mut vars = self.output.variables();
        vars.extend(self.input.variables());
        vars
    }

    fn replace_var(&self, old: &Variable, new: &Variable) -> Self {
        Self {
            output: self.output.replace_var(old, new),
            input: self.input.replace_var(old, new),
        }
    }
}

impl fmt::Display for BaseOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = self.input.to_string();
        let bra = input
            .strip_prefix('|')
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(&input);
        write!(f, "{}<{}|", self.output, bra)
    }
}

/// `|left⟩⟨right| = Σ c_i conj(d_j) |k_i⟩⟨l_j|`.
pub fn outer_product(left: &State, right: &State) -> Operator {
    let mut op = Operator::default();
    for (out, c) in left.iter() {
        for (inp, d) in right.iter() {
            op.accumulate(
                BaseOperator::new(out.clone(), inp.clone()),
                c.clone() * d.conjugate(),
            );
        }
    }
    op
}

/// A sum of weighted outer products.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Operator {
    terms: BTreeMap<BaseOperator, Scalar>,
}

impl Operator {
    /// Build from `(|out⟩⟨in|, coefficient)` pairs; repeated terms are summed.
    pub fn new(pairs: Vec<(BaseOperator, Scalar)>) -> Result<Self> {
        let mut op = Operator::default();
        for (base, scalar) in pairs {
            op.check_term(&base, "operator construction")?;
            op.accumulate(base, scalar);
        }
        Ok(op)
    }

    /// `Σ |k⟩⟨k|` over an explicit basis.
    pub fn identity(basis: &[BaseState]) -> Result<Self> {
        Self::new(
            basis
                .iter()
                .map(|k| (BaseOperator::new(k.clone(), k.clone()), Scalar::one()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BaseOperator, &Scalar)> {
        self.terms.iter()
    }

    /// Coefficient of `|output⟩⟨input|`, zero when absent.
    pub fn get_scalar(&self, output: &BaseState, input: &BaseState) -> Scalar {
        self.terms
            .get(&BaseOperator::new(output.clone(), input.clone()))
            .cloned()
            .unwrap_or_else(Scalar::zero)
    }

    fn accumulate(&mut self, base: BaseOperator, scalar: Scalar) {
        match self.terms.remove(&base) {
            Some(existing) => {
                self.terms.insert(base, existing + scalar);
            }
            None => {
                self.terms.insert(base, scalar);
            }
        }
    }

    fn check_term(&self, base: &BaseOperator, operation: &'static str) -> Result<()> {
        let Some(first) = self.terms.keys().next() else {
            return Ok(());
        };
        for (mine, theirs) in [(&first.output, &base.output), (&first.input, &base.input)] {
            if !mine.is_compatible(theirs) {
                return Err(AlgebraError::ShapeMismatch {
                    operation,
                    left: first.to_string(),
                    right: base.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Operator) -> Result<Operator> {
        let mut out = self.clone();
        for (base, scalar) in &other.terms {
            out.check_term(base, "operator addition")?;
            out.accumulate(base.clone(), scalar.clone());
        }
        Ok(out)
    }

    pub fn scale(&self, factor: &Scalar) -> Operator {
        let terms = self
            .terms
            .iter()
            .map(|(base, c)| (base.clone(), factor.clone() * c.clone()))
            .collect();
        Operator { terms }
    }

    /// Hermitian conjugate.
    pub fn dagger(&self) -> Operator {
        let terms = self
            .terms
            .iter()
            .map(|(base, c)| (base.dagger(), c.conjugate()))
            .collect();
        Operator { terms }
    }

    /// Simplify every coefficient and drop the ones that vanish.
    pub fn simplify(&self) -> Operator {
        let terms = self
            .terms
            .iter()
            .map(|(base, c)| (base.clone(), c.simplify()))
            .filter(|(_, c)| !c.is_zero())
            .collect();
        Operator { terms }
    }

    /// `Σ c·d·⟨in|k⟩ |out⟩` over all terms `c |out⟩⟨in|` and `d |k⟩`.
    ///
    /// For discrete kets the overlap is exact structural matching; for Fock
    /// kets it contracts the excitation variables with deltas. Variables
    /// shared between the operator and the state are the same quantity.
    pub fn apply(&self, state: &State) -> Result<State> {
        let mut out = State::default();
        for (base, c) in &self.terms {
            if c.is_zero() {
                continue;
            }
            for (ket, d) in state.iter() {
                if d.is_zero() {
                    continue;
                }
                let overlap = base.input.inner_product(ket)?;
                if overlap.is_zero() {
                    continue;
                }
                out.accumulate(base.output.clone(), c.clone() * d.clone() * overlap);
            }
        }
        Ok(out)
    }

    /// [`Operator::apply`] after renaming the state's variables that collide
    /// with the operator's.
    pub fn apply_with(&self, state: &State, ctx: &mut VariableContext) -> Result<State> {
        let state = ctx.disambiguate(&self.variables(), state);
        self.apply(&state)
    }

    /// Operator product: `|a⟩⟨b| · |c⟩⟨d| = ⟨b|c⟩ |a⟩⟨d|`.
    pub fn compose(&self, other: &Operator) -> Result<Operator> {
        let mut out = Operator::default();
        for (left, c) in &self.terms {
            if c.is_zero() {
                continue;
            }
            for (right, d) in &other.terms {
                if d.is_zero() {
                    continue;
                }
                let overlap = left.input.inner_product(&right.output)?;
                if overlap.is_zero() {
                    continue;
                }
                let base = BaseOperator::new(left.output.clone(), right.input.clone());
                out.check_term(&base, "operator composition")?;
                out.accumulate(base, c.clone() * d.clone() * overlap);
            }
        }
        Ok(out)
    }

    /// [`Operator::compose`] after renaming `other`'s colliding variables.
    pub fn compose_with(&self, other: &Operator, ctx: &mut VariableContext) -> Result<Operator> {
        let other = ctx.disambiguate(&self.variables(), other);
        self.compose(&other)
    }

    /// `self ⊗ other`, renaming colliding variables of `other` first.
    pub fn tensor_product(&self, other: &Operator, ctx: &mut VariableContext) -> Result<Operator> {
        let other = ctx.disambiguate(&self.variables(), other);
        let mut out = Operator::default();
        for (left, c) in &self.terms {
            for (right, d) in &other.terms {
                let base = BaseOperator::new(
                    left.output.tensor_product(&right.output)?,
                    left.input.tensor_product(&right.input)?,
                );
                out.check_term(&base, "tensor product")?;
                out.accumulate(base, c.clone() * d.clone());
            }
        }
        Ok(out)
    }

    /// Integrate every coefficient over the variables that label neither of
    /// its kets.
    pub fn integrate_bound(&self) -> Operator {
        let terms = self
            .terms
            .iter()
            .map(|(base, c)| {
                let bound: BTreeSet<Variable> =
                    c.variables().difference(&base.variables()).cloned().collect();
                (base.clone(), integrate(c, &bound))
            })
            .filter(|(_, c)| !c.is_zero())
            .collect();
        Operator { terms }
    }
}

impl Symbolic for Operator {
    fn variables(&self) -> BTreeSet<Variable> {
        self.terms
            .iter()
            .flat_map(|(base, c)| base.variables().into_iter().chain(c.variables()))
            .collect()
    }

    fn replace_var(&self, old: &Variable, new: &Variable) -> Self {
        let mut out = Operator::default();
        for (base, c) in &self.terms {
            out.accumulate(base.replace_var(old, new), c.replace_var(old, new));
        }
        out
    }
}

impl Neg for Operator {
    type Output = Operator;

    fn neg(self) -> Operator {
        self.scale(&Scalar::number(-1.0))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, (base, c)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}*{}", c, base)?;
        }
        Ok(())
    }
}
