// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Symbolic variables and variable hygiene.
//!
//! Every algebraic value (scalars, kets, states, operators) implements
//! [`Symbolic`], which exposes its free variables and substitution.
//! Substitution never mutates: it returns a new value.
//!
//! Combining two values that were written independently (tensor products,
//! hygienic inner products, operator application) must first rename the
//! variables of the right-hand operand that collide with the left-hand one.
//! Fresh names come from an explicit [`VariableContext`], so the renaming is
//! deterministic for a given sequence of calls.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::trace;

/// An opaque symbolic variable (e.g. a mode frequency `w`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Variable {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&Variable> for Variable {
    fn from(v: &Variable) -> Self {
        v.clone()
    }
}

/// Capability set shared by everything that can carry symbolic variables.
pub trait Symbolic: Sized {
    /// The set of free variables.
    fn variables(&self) -> BTreeSet<Variable>;

    /// Substitute `new` for every free occurrence of `old`.
    fn replace_var(&self, old: &Variable, new: &Variable) -> Self;

    fn has_variable(&self, variable: &Variable) -> bool {
        self.variables().contains(variable)
    }

    /// Apply a whole renaming map, one variable at a time.
    ///
    /// Targets must not collide with any source still to be renamed;
    /// [`VariableContext`] guarantees this for the maps it builds.
    fn rename(&self, renaming: &BTreeMap<Variable, Variable>) -> Self
    where
        Self: Clone,
    {
        renaming
            .iter()
            .fold(self.clone(), |acc, (old, new)| acc.replace_var(old, new))
    }
}

/// Generator of fresh variables.
///
/// Fresh names are `<base>_<n>` with a counter shared across all bases, and a
/// name is never issued twice by the same context.
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    counter: u64,
    issued: BTreeSet<Variable>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fresh variables issued so far.
    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    /// A variable derived from `base` that is neither in `avoid` nor issued
    /// before.
    pub fn fresh(&mut self, base: &Variable, avoid: &BTreeSet<Variable>) -> Variable {
        let stem = base.as_str().split('_').next().unwrap_or(base.as_str());
        let stem = if stem.is_empty() { "v" } else { stem };
        loop {
            self.counter += 1;
            let candidate = Variable::new(format!("{}_{}", stem, self.counter));
            if !avoid.contains(&candidate) && !self.issued.contains(&candidate) {
                self.issued.insert(candidate.clone());
                return candidate;
            }
        }
    }

    /// Build a renaming for every variable of `value` that also appears in
    /// `reserved`.
    pub fn collision_map<T: Symbolic>(
        &mut self,
        reserved: &BTreeSet<Variable>,
        value: &T,
    ) -> BTreeMap<Variable, Variable> {
        let own = value.variables();
        let avoid: BTreeSet<Variable> = reserved.union(&own).cloned().collect();
        let mut map = BTreeMap::new();
        for v in own.intersection(reserved) {
            let fresh = self.fresh(v, &avoid);
            trace!(from = %v, to = %fresh, "Renaming colliding variable");
            map.insert(v.clone(), fresh);
        }
        map
    }

    /// Rename the variables of `value` that collide with `reserved`.
    pub fn disambiguate<T: Symbolic + Clone>(
        &mut self,
        reserved: &BTreeSet<Variable>,
        value: &T,
    ) -> T {
        let map = self.collision_map(reserved, value);
        if map.is_empty() {
            value.clone()
        } else {
            value.rename(&map)
        }
    }

    /// Rename every variable of `value` to a fresh one.
    pub fn refresh<T: Symbolic + Clone>(&mut self, value: &T) -> T {
        let own = value.variables();
        self.disambiguate(&own, value)
    }
}
