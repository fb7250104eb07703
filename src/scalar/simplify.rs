// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Canonicalization passes: [`Scalar::simplify`] and [`Scalar::expand`].

use std::collections::BTreeMap;

use itertools::Itertools;

use super::{Number, Scalar};

impl Scalar {
    /// Rewrite into canonical form without distributing.
    ///
    /// Children are simplified and flattened, numeric factors fold into a
    /// single leading coefficient, like terms of a sum are merged by adding
    /// their coefficients, and the remaining children are sorted. Zero terms
    /// and unit factors are dropped. The result is a fixed point:
    /// `x.simplify().simplify() == x.simplify()`.
    pub fn simplify(&self) -> Scalar {
        match self {
            Scalar::Number(_) | Scalar::Function { .. } => self.clone(),
            Scalar::Delta(a, b) if a == b => Scalar::one(),
            Scalar::Delta(..) => self.clone(),
            Scalar::InnerProduct { bra, ket } if bra == ket => Scalar::one(),
            Scalar::InnerProduct { .. } => self.clone(),
            Scalar::Integral {
                variable,
                integrand,
            } => {
                let inner = integrand.simplify();
                if inner.is_zero() {
                    Scalar::zero()
                } else {
                    Scalar::integral(variable.clone(), inner)
                }
            }
            Scalar::Product(factors) => simplify_product(factors),
            Scalar::Sum(terms) => simplify_sum(terms),
        }
    }

    /// Distribute every product over its sums.
    ///
    /// The result is a `Sum` of `Product`s whose factors are atoms. Nothing
    /// is merged; follow with [`Scalar::simplify`] (or call
    /// [`Scalar::normal_form`]) to collect terms.
    pub fn expand(&self) -> Scalar {
        Scalar::Sum(
            self.expanded_terms()
                .into_iter()
                .map(Scalar::Product)
                .collect(),
        )
    }

    /// `expand` followed by `simplify`.
    pub fn normal_form(&self) -> Scalar {
        self.expand().simplify()
    }

    /// Each inner vector is one product of atoms.
    pub(crate) fn expanded_terms(&self) -> Vec<Vec<Scalar>> {
        match self {
            Scalar::Sum(terms) => terms.iter().flat_map(Scalar::expanded_terms).collect(),
            Scalar::Product(factors) => factors.iter().fold(vec![Vec::new()], |acc, factor| {
                acc.iter()
                    .cartesian_product(factor.expanded_terms())
                    .map(|(prefix, suffix)| {
                        let mut term = prefix.clone();
                        term.extend(suffix);
                        term
                    })
                    .collect()
            }),
            Scalar::Integral {
                variable,
                integrand,
            } => vec![vec![Scalar::integral(variable.clone(), integrand.expand())]],
            atom => vec![vec![atom.clone()]],
        }
    }
}

fn simplify_product(factors: &[Scalar]) -> Scalar {
    let mut coefficient = Number::ONE;
    let mut rest = Vec::new();

    for factor in factors.iter().map(Scalar::simplify) {
        let children = match factor {
            Scalar::Product(inner) => inner,
            other => vec![other],
        };
        for child in children {
            match child {
                Scalar::Number(n) => coefficient = coefficient * n,
                other if other.is_one() => {}
                other => rest.push(other),
            }
        }
    }

    if coefficient.is_zero() {
        return Scalar::zero();
    }
    rest.sort();
    build_term(coefficient, rest)
}

fn simplify_sum(terms: &[Scalar]) -> Scalar {
    let mut groups: BTreeMap<Vec<Scalar>, Number> = BTreeMap::new();

    for term in terms.iter().map(Scalar::simplify) {
        let children = match term {
            Scalar::Sum(inner) => inner,
            other => vec![other],
        };
        for child in children.into_iter().filter(|c| !c.is_zero()) {
            let (coefficient, rest) = split_coefficient(child);
            let entry = groups.entry(rest).or_insert(Number::ZERO);
            *entry = *entry + coefficient;
        }
    }

    let mut out: Vec<Scalar> = groups
        .into_iter()
        .filter(|(_, c)| !c.is_zero())
        .map(|(rest, c)| build_term(c, rest))
        .collect();
    out.sort();

    match out.len() {
        0 => Scalar::zero(),
        1 => out.remove(0),
        _ => Scalar::Sum(out),
    }
}

/// Split a simplified term into its numeric coefficient and symbolic part.
fn split_coefficient(term: Scalar) -> (Number, Vec<Scalar>) {
    match term {
        Scalar::Number(n) => (n, Vec::new()),
        Scalar::Product(mut factors) => match factors.first() {
            Some(Scalar::Number(n)) => {
                let n = *n;
                factors.remove(0);
                (n, factors)
            }
            _ => (Number::ONE, factors),
        },
        other => (Number::ONE, vec![other]),
    }
}

fn build_term(coefficient: Number, mut rest: Vec<Scalar>) -> Scalar {
    if rest.is_empty() {
        return Scalar::Number(coefficient);
    }
    if coefficient.is_one() {
        if rest.len() == 1 {
            return rest.remove(0);
        }
        return Scalar::Product(rest);
    }
    let mut factors = Vec::with_capacity(rest.len() + 1);
    factors.push(Scalar::Number(coefficient));
    factors.extend(rest);
    Scalar::Product(factors)
}
