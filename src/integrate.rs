// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Symbolic integration over variables.
//!
//! The integrand is expanded into a sum of products of atoms, and each
//! product is integrated one variable at a time using a fixed set of rules:
//!
//! - a factor not depending on the variable passes through unchanged
//! - `∫ δ(v - w) g(v) dv = g(w)`
//! - `∫ f*(v) f(v) dv = 1` (mode profiles are normalized)
//! - `∫ f*(v) g(v) dv = ⟨f|g⟩`
//!
//! Anything else is left as an unresolved [`Scalar::Integral`]. Integration
//! never fails.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::scalar::{Profile, Scalar};
use crate::variable::{Symbolic, Variable};

/// Integrate `expr` over every variable in `variables`.
pub fn integrate(expr: &Scalar, variables: &BTreeSet<Variable>) -> Scalar {
    if variables.is_empty() {
        return expr.simplify();
    }
    let terms = expr.expanded_terms();
    debug!(
        terms = terms.len(),
        variables = variables.len(),
        "Integrating expression"
    );
    let integrated = terms
        .into_iter()
        .map(|factors| integrate_product(factors, variables))
        .collect();
    Scalar::Sum(integrated).simplify()
}

/// Integrate `expr` over all of its free variables.
pub fn integrate_all(expr: &Scalar) -> Scalar {
    integrate(expr, &expr.variables())
}

fn integrate_product(mut factors: Vec<Scalar>, variables: &BTreeSet<Variable>) -> Scalar {
    if factors.iter().any(Scalar::is_zero) {
        return Scalar::zero();
    }
    factors.retain(|f| !f.is_one());

    for v in variables {
        if !factors.iter().any(|f| f.has_variable(v)) {
            continue;
        }

        if let Some((pos, target)) = find_sifting_delta(&factors, v) {
            factors.remove(pos);
            factors = factors
                .iter()
                .map(|f| f.replace_var(v, &target))
                .filter(|f| !f.simplify().is_one())
                .collect();
            continue;
        }

        let (dependent, mut rest): (Vec<Scalar>, Vec<Scalar>) =
            factors.into_iter().partition(|f| f.has_variable(v));

        match overlap_of(&dependent, v) {
            Some(overlap) => {
                if !overlap.is_one() {
                    rest.push(overlap);
                }
            }
            None => {
                trace!(variable = %v, factors = dependent.len(), "Leaving integral unresolved");
                rest.push(Scalar::integral(v.clone(), Scalar::Product(dependent)));
            }
        }
        factors = rest;
    }

    Scalar::Product(factors).simplify()
}

/// A delta `δ(v - w)` with `w != v`, and the variable `w` it sifts onto.
fn find_sifting_delta(factors: &[Scalar], v: &Variable) -> Option<(usize, Variable)> {
    factors.iter().enumerate().find_map(|(i, f)| match f {
        Scalar::Delta(a, b) if a == v && b != v => Some((i, b.clone())),
        Scalar::Delta(a, b) if b == v && a != v => Some((i, a.clone())),
        _ => None,
    })
}

/// `∫ f*(v) g(v) dv` when the dependent factors are exactly one conjugated
/// and one plain function of `v`.
fn overlap_of(dependent: &[Scalar], v: &Variable) -> Option<Scalar> {
    let [first, second] = dependent else {
        return None;
    };
    let (bra, ket) = match (as_function_of(first, v)?, as_function_of(second, v)?) {
        ((bra, true), (ket, false)) | ((ket, false), (bra, true)) => (bra, ket),
        _ => return None,
    };
    if bra == ket {
        return Some(Scalar::one());
    }
    Some(Scalar::InnerProduct {
        bra: Profile::new(bra, None),
        ket: Profile::new(ket, None),
    })
}

fn as_function_of<'a>(factor: &'a Scalar, v: &Variable) -> Option<(&'a str, bool)> {
    match factor {
        Scalar::Function {
            name,
            variable,
            conjugated,
        } if variable == v => Some((name.as_str(), *conjugated)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(names: &[&str]) -> BTreeSet<Variable> {
        names.iter().map(|n| Variable::new(*n)).collect()
    }

    fn f(name: &str, var: &str) -> Scalar {
        Scalar::function(name, var)
    }

    // =========================================================================
    // Identities
    // =========================================================================

    #[test]
    fn test_delta_sifting() {
        let expr = Scalar::delta("x", "y") * f("f", "x");
        assert_eq!(integrate(&expr, &vars(&["x"])), f("f", "y"));
    }

    #[test]
    fn test_delta_sifting_either_side() {
        let expr = f("g", "y") * Scalar::delta("x", "y");
        assert_eq!(integrate(&expr, &vars(&["y"])), f("g", "x"));
    }

    #[test]
    fn test_delta_chain() {
        let expr = Scalar::delta("x", "y") * Scalar::delta("y", "z") * f("f", "x");
        assert_eq!(integrate(&expr, &vars(&["x", "y"])), f("f", "z"));
    }

    #[test]
    fn test_delta_sifting_collapses_to_one() {
        let expr = Scalar::delta("x", "y") * Scalar::delta("x", "y");
        assert_eq!(integrate(&expr, &vars(&["x"])), Scalar::one());
    }

    #[test]
    fn test_normalized_profile() {
        let expr = f("f", "x").conjugate() * f("f", "x");
        assert_eq!(integrate_all(&expr), Scalar::one());
    }

    #[test]
    fn test_overlap_of_profiles() {
        let expr = f("g", "x") * f("f", "x").conjugate();
        assert_eq!(integrate_all(&expr), Scalar::overlap("f", "g"));
    }

    #[test]
    fn test_independent_factors_pass_through() {
        let expr = Scalar::number(3.0) * f("h", "y") * f("f", "x").conjugate() * f("f", "x");
        let out = integrate(&expr, &vars(&["x"]));
        assert_eq!(out, (Scalar::number(3.0) * f("h", "y")).simplify());
    }

    #[test]
    fn test_absent_variable_is_noop() {
        let expr = f("f", "x");
        assert_eq!(integrate(&expr, &vars(&["z"])), f("f", "x"));
    }

    #[test]
    fn test_unresolved_integral() {
        let expr = f("f", "x") * f("g", "x");
        let out = integrate_all(&expr);
        assert!(matches!(out, Scalar::Integral { .. }));
        assert!(out.variables().is_empty());
    }

    #[test]
    fn test_distributes_over_sums() {
        // ∫ f*(x) (f(x) + g(x)) dx = 1 + ⟨f|g⟩
        let expr = f("f", "x").conjugate() * (f("f", "x") + f("g", "x"));
        let expected = (Scalar::one() + Scalar::overlap("f", "g")).simplify();
        assert_eq!(integrate_all(&expr), expected);
    }

    #[test]
    fn test_zero_integrand() {
        let expr = Scalar::zero() * f("f", "x");
        assert_eq!(integrate_all(&expr), Scalar::zero());
    }

    #[test]
    fn test_single_photon_norm() {
        // ∫∫ f*(x) f(y) δ(x - y) dx dy = 1
        let expr = f("f", "x").conjugate() * f("f", "y") * Scalar::delta("x", "y");
        assert_eq!(integrate_all(&expr), Scalar::one());
    }
}
