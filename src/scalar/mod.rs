// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Symbolic complex scalars.
//!
//! A [`Scalar`] is an expression tree over a closed set of atoms:
//!
//! - [`Scalar::Number`]: a complex constant
//! - [`Scalar::Function`]: an opaque single-variable function `f(x)` (or its
//!   conjugate `f*(x)`)
//! - [`Scalar::Delta`]: the symbolic delta `δ(x - y)`
//! - [`Scalar::InnerProduct`]: the overlap `⟨f|g⟩` of two mode profiles
//! - [`Scalar::Integral`]: an integral the engine could not resolve
//!
//! combined by [`Scalar::Sum`] and [`Scalar::Product`].
//!
//! Construction never simplifies. `+` and `*` only append to an existing
//! left-hand sum or product, so the raw structure stays inspectable until
//! [`Scalar::simplify`] or [`Scalar::expand`] is requested.
//!
//! # Example
//!
//! ```
//! use qualg::scalar::Scalar;
//!
//! let f = Scalar::function("f", "x");
//! let expr = Scalar::delta("x", "y") * f.clone() * Scalar::zero();
//! assert!(expr.simplify().is_zero());
//! ```

mod number;
mod simplify;

pub use number::{Number, EPSILON, TOLERANCE};

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;

use crate::error::AlgebraError;
use crate::variable::{Symbolic, Variable};

/// A named mode profile taking part in an overlap.
///
/// The variable is `None` once it has been integrated out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Profile {
    pub name: String,
    pub variable: Option<Variable>,
}

impl Profile {
    pub fn new(name: impl Into<String>, variable: Option<Variable>) -> Self {
        Self {
            name: name.into(),
            variable,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variable {
            Some(v) => write!(f, "{}({})", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

/// A symbolic complex coefficient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scalar {
    /// Complex constant.
    Number(Number),
    /// Opaque function of a single variable.
    Function {
        name: String,
        variable: Variable,
        conjugated: bool,
    },
    /// Delta function between two variables, kept in sorted order.
    Delta(Variable, Variable),
    /// Overlap `⟨bra|ket⟩` of two mode profiles.
    InnerProduct { bra: Profile, ket: Profile },
    /// Unresolved integral over a bound variable.
    Integral {
        variable: Variable,
        integrand: Box<Scalar>,
    },
    /// Sum of terms.
    Sum(Vec<Scalar>),
    /// Product of factors.
    Product(Vec<Scalar>),
}

impl Scalar {
    pub fn number(value: impl Into<Number>) -> Self {
        Scalar::Number(value.into())
    }

    pub fn zero() -> Self {
        Scalar::Number(Number::ZERO)
    }

    pub fn one() -> Self {
        Scalar::Number(Number::ONE)
    }

    /// `name(variable)`.
    pub fn function(name: impl Into<String>, variable: impl Into<Variable>) -> Self {
        Scalar::Function {
            name: name.into(),
            variable: variable.into(),
            conjugated: false,
        }
    }

    /// `δ(a - b)`.
    pub fn delta(a: impl Into<Variable>, b: impl Into<Variable>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Scalar::Delta(a, b)
        } else {
            Scalar::Delta(b, a)
        }
    }

    /// `⟨name1(var1)|name2(var2)⟩`.
    pub fn inner_product_fn(
        name1: impl Into<String>,
        var1: impl Into<Variable>,
        name2: impl Into<String>,
        var2: impl Into<Variable>,
    ) -> Self {
        Scalar::InnerProduct {
            bra: Profile::new(name1, Some(var1.into())),
            ket: Profile::new(name2, Some(var2.into())),
        }
    }

    /// `⟨name1|name2⟩` for profiles whose variable has been integrated out.
    pub fn overlap(name1: impl Into<String>, name2: impl Into<String>) -> Self {
        Scalar::InnerProduct {
            bra: Profile::new(name1, None),
            ket: Profile::new(name2, None),
        }
    }

    pub fn integral(variable: impl Into<Variable>, integrand: Scalar) -> Self {
        Scalar::Integral {
            variable: variable.into(),
            integrand: Box::new(integrand),
        }
    }

    pub fn sum(terms: Vec<Scalar>) -> Self {
        Scalar::Sum(terms)
    }

    pub fn product(factors: Vec<Scalar>) -> Self {
        Scalar::Product(factors)
    }

    /// Complex conjugate.
    pub fn conjugate(&self) -> Scalar {
        match self {
            Scalar::Number(n) => Scalar::Number(n.conj()),
            Scalar::Function {
                name,
                variable,
                conjugated,
            } => Scalar::Function {
                name: name.clone(),
                variable: variable.clone(),
                conjugated: !conjugated,
            },
            Scalar::Delta(..) => self.clone(),
            Scalar::InnerProduct { bra, ket } => Scalar::InnerProduct {
                bra: ket.clone(),
                ket: bra.clone(),
            },
            Scalar::Integral {
                variable,
                integrand,
            } => Scalar::Integral {
                variable: variable.clone(),
                integrand: Box::new(integrand.conjugate()),
            },
            Scalar::Sum(terms) => Scalar::Sum(terms.iter().map(Scalar::conjugate).collect()),
            Scalar::Product(factors) => {
                Scalar::Product(factors.iter().map(Scalar::conjugate).collect())
            }
        }
    }

    /// Conservative zero test: `true` only if the expression is certainly zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Scalar::Number(n) => n.is_zero(),
            Scalar::Sum(terms) => terms.iter().all(Scalar::is_zero),
            Scalar::Product(factors) => factors.iter().any(Scalar::is_zero),
            Scalar::Integral { integrand, .. } => integrand.is_zero(),
            Scalar::Function { .. } | Scalar::Delta(..) | Scalar::InnerProduct { .. } => false,
        }
    }

    /// Conservative one test: `true` only if the expression is certainly one.
    pub fn is_one(&self) -> bool {
        match self {
            Scalar::Number(n) => n.is_one(),
            Scalar::Delta(a, b) => a == b,
            Scalar::InnerProduct { bra, ket } => bra == ket,
            Scalar::Product(factors) => factors.iter().all(Scalar::is_one),
            Scalar::Sum(terms) => {
                if let Some(total) = terms
                    .iter()
                    .map(Scalar::as_number)
                    .sum::<Option<Complex64>>()
                {
                    return Number::from(total).is_one();
                }
                let mut nonzero = terms.iter().filter(|t| !t.is_zero());
                matches!((nonzero.next(), nonzero.next()), (Some(t), None) if t.is_one())
            }
            Scalar::Function { .. } | Scalar::Integral { .. } => false,
        }
    }

    /// The constant value, if this is a bare number.
    pub fn as_number(&self) -> Option<Complex64> {
        match self {
            Scalar::Number(n) => Some(n.value()),
            _ => None,
        }
    }

    /// Whether this is a leaf of the expression tree.
    pub fn is_atom(&self) -> bool {
        !matches!(self, Scalar::Sum(_) | Scalar::Product(_))
    }

    /// Number of terms [`Scalar::expand`] would produce, saturating.
    pub fn term_count(&self) -> usize {
        match self {
            Scalar::Sum(terms) => terms
                .iter()
                .fold(0usize, |acc, t| acc.saturating_add(t.term_count())),
            Scalar::Product(factors) => factors
                .iter()
                .fold(1usize, |acc, f| acc.saturating_mul(f.term_count())),
            _ => 1,
        }
    }

    /// Reduce to a complex number; fails on any symbolic atom.
    pub fn evaluate(&self) -> Result<Complex64, AlgebraError> {
        self.evaluate_with(&|_: &Scalar| None)
    }

    /// Reduce to a complex number, asking `resolve` for the value of every
    /// symbolic atom that is not trivially one.
    pub fn evaluate_with<F>(&self, resolve: &F) -> Result<Complex64, AlgebraError>
    where
        F: Fn(&Scalar) -> Option<Complex64>,
    {
        match self {
            Scalar::Number(n) => Ok(n.value()),
            Scalar::Sum(terms) => terms.iter().try_fold(Complex64::new(0.0, 0.0), |acc, t| {
                Ok(acc + t.evaluate_with(resolve)?)
            }),
            Scalar::Product(factors) => {
                if factors.iter().any(Scalar::is_zero) {
                    return Ok(Complex64::new(0.0, 0.0));
                }
                factors.iter().try_fold(Complex64::new(1.0, 0.0), |acc, f| {
                    Ok(acc * f.evaluate_with(resolve)?)
                })
            }
            atom if atom.is_one() => Ok(Complex64::new(1.0, 0.0)),
            atom => {
                resolve(atom).ok_or_else(|| AlgebraError::UnresolvedVariable(atom.to_string()))
            }
        }
    }
}

impl Symbolic for Scalar {
    fn variables(&self) -> BTreeSet<Variable> {
        match self {
            Scalar::Number(_) => BTreeSet::new(),
            Scalar::Function { variable, .. } => BTreeSet::from([variable.clone()]),
            Scalar::Delta(a, b) => BTreeSet::from([a.clone(), b.clone()]),
            Scalar::InnerProduct { bra, ket } => bra
                .variable
                .iter()
                .chain(ket.variable.iter())
                .cloned()
                .collect(),
            Scalar::Integral {
                variable,
                integrand,
            } => {
                let mut vars = integrand.variables();
                vars.remove(variable);
                vars
            }
            Scalar::Sum(children) | Scalar::Product(children) => {
                children.iter().flat_map(Scalar::variables).collect()
            }
        }
    }

    fn replace_var(&self, old: &Variable, new: &Variable) -> Scalar {
        let swap = |v: &Variable| if v == old { new.clone() } else { v.clone() };
        match self {
            Scalar::Number(_) => self.clone(),
            Scalar::Function {
                name,
                variable,
                conjugated,
            } => Scalar::Function {
                name: name.clone(),
                variable: swap(variable),
                conjugated: *conjugated,
            },
            Scalar::Delta(a, b) => Scalar::delta(swap(a), swap(b)),
            Scalar::InnerProduct { bra, ket } => Scalar::InnerProduct {
                bra: Profile::new(bra.name.clone(), bra.variable.as_ref().map(swap)),
                ket: Profile::new(ket.name.clone(), ket.variable.as_ref().map(swap)),
            },
            Scalar::Integral {
                variable,
                integrand,
            } => {
                if variable == old {
                    return self.clone();
                }
                if variable == new {
                    // Move the bound variable out of the way before substituting.
                    let mut taken = integrand.variables();
                    taken.insert(new.clone());
                    let mut bound = variable.clone();
                    while taken.contains(&bound) {
                        bound = Variable::new(format!("{}'", bound));
                    }
                    let renamed = integrand.replace_var(variable, &bound);
                    return Scalar::integral(bound, renamed.replace_var(old, new));
                }
                Scalar::integral(variable.clone(), integrand.replace_var(old, new))
            }
            Scalar::Sum(terms) => {
                Scalar::Sum(terms.iter().map(|t| t.replace_var(old, new)).collect())
            }
            Scalar::Product(factors) => {
                Scalar::Product(factors.iter().map(|f| f.replace_var(old, new)).collect())
            }
        }
    }
}

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        Scalar::Number(n)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::number(x)
    }
}

impl From<i32> for Scalar {
    fn from(x: i32) -> Self {
        Scalar::number(x)
    }
}

impl From<Complex64> for Scalar {
    fn from(c: Complex64) -> Self {
        Scalar::number(c)
    }
}

impl Add for Scalar {
    type Output = Scalar;

    fn add(self, rhs: Scalar) -> Scalar {
        match self {
            Scalar::Sum(mut terms) => {
                terms.push(rhs);
                Scalar::Sum(terms)
            }
            lhs => Scalar::Sum(vec![lhs, rhs]),
        }
    }
}

impl Mul for Scalar {
    type Output = Scalar;

    fn mul(self, rhs: Scalar) -> Scalar {
        match self {
            Scalar::Product(mut factors) => {
                factors.push(rhs);
                Scalar::Product(factors)
            }
            lhs => Scalar::Product(vec![lhs, rhs]),
        }
    }
}

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        Scalar::Product(vec![Scalar::number(-1.0), self])
    }
}

impl Sub for Scalar {
    type Output = Scalar;

    fn sub(self, rhs: Scalar) -> Scalar {
        self + (-rhs)
    }
}

impl<'a> Add<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    fn add(self, rhs: &'a Scalar) -> Scalar {
        self.clone() + rhs.clone()
    }
}

impl<'a> Mul<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    fn mul(self, rhs: &'a Scalar) -> Scalar {
        self.clone() * rhs.clone()
    }
}

impl std::iter::Sum for Scalar {
    fn sum<I: Iterator<Item = Scalar>>(iter: I) -> Scalar {
        Scalar::Sum(iter.collect())
    }
}

impl std::iter::Product for Scalar {
    fn product<I: Iterator<Item = Scalar>>(iter: I) -> Scalar {
        Scalar::Product(iter.collect())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Function {
                name,
                variable,
                conjugated,
            } => {
                let star = if *conjugated { "*" } else { "" };
                write!(f, "{}{}({})", name, star, variable)
            }
            Scalar::Delta(a, b) => write!(f, "D[{}-{}]", a, b),
            Scalar::InnerProduct { bra, ket } => write!(f, "<{}|{}>", bra, ket),
            Scalar::Integral {
                variable,
                integrand,
            } => write!(f, "S_{}{{{}}}", variable, integrand),
            Scalar::Sum(terms) => {
                if terms.is_empty() {
                    return f.write_str("0");
                }
                f.write_str("(")?;
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{}", t)?;
                }
                f.write_str(")")
            }
            Scalar::Product(factors) => {
                if factors.is_empty() {
                    return f.write_str("1");
                }
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("*")?;
                    }
                    write!(f, "{}", factor)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn var(name: &str) -> Variable {
        Variable::new(name)
    }

    #[test]
    fn test_construction_does_not_simplify() {
        let expr = Scalar::one() * Scalar::function("f", "x");
        assert_eq!(
            expr,
            Scalar::Product(vec![Scalar::one(), Scalar::function("f", "x")])
        );
    }

    #[test]
    fn test_add_appends_to_left_sum() {
        let a = Scalar::function("a", "x");
        let b = Scalar::function("b", "x");
        let c = Scalar::function("c", "x");
        let expr = a.clone() + b.clone() + c.clone();
        assert_eq!(expr, Scalar::Sum(vec![a, b, c]));
    }

    #[test]
    fn test_delta_is_order_independent() {
        assert_eq!(Scalar::delta("x", "y"), Scalar::delta("y", "x"));
    }

    #[test]
    fn test_conjugate_function_toggles_flag() {
        let f = Scalar::function("f", "x");
        let fc = f.conjugate();
        assert_ne!(f, fc);
        assert_eq!(fc.conjugate(), f);
        assert_eq!(fc.to_string(), "f*(x)");
    }

    #[test]
    fn test_conjugate_inner_product_swaps() {
        let ip = Scalar::inner_product_fn("f", "x", "g", "y");
        assert_eq!(
            ip.conjugate(),
            Scalar::inner_product_fn("g", "y", "f", "x")
        );
    }

    #[test]
    fn test_conjugate_number() {
        let z = Scalar::number(Complex64::new(1.0, 2.0));
        assert_eq!(z.conjugate(), Scalar::number(Complex64::new(1.0, -2.0)));
    }

    #[test]
    fn test_variables() {
        let expr = Scalar::function("f", "x") * Scalar::delta("y", "z") + Scalar::overlap("f", "g");
        let vars = expr.variables();
        assert_eq!(vars, BTreeSet::from([var("x"), var("y"), var("z")]));
        assert!(expr.has_variable(&var("y")));
        assert!(!expr.has_variable(&var("w")));
    }

    #[test]
    fn test_integral_binds_variable() {
        let expr = Scalar::integral("x", Scalar::function("f", "x") * Scalar::function("g", "y"));
        assert_eq!(expr.variables(), BTreeSet::from([var("y")]));
        // Bound variables are not substituted.
        assert_eq!(expr.replace_var(&var("x"), &var("z")), expr);
    }

    #[test]
    fn test_integral_avoids_capture() {
        let expr = Scalar::integral("x", Scalar::function("f", "x") * Scalar::function("g", "y"));
        let out = expr.replace_var(&var("y"), &var("x"));
        assert_eq!(out.variables(), BTreeSet::from([var("x")]));
    }

    #[test]
    fn test_replace_var() {
        let expr = Scalar::function("f", "x") * Scalar::delta("x", "y");
        let out = expr.replace_var(&var("x"), &var("z"));
        assert_eq!(
            out,
            Scalar::function("f", "z") * Scalar::delta("y", "z")
        );
    }

    #[test]
    fn test_is_zero_is_conservative() {
        assert!(Scalar::zero().is_zero());
        assert!(Scalar::sum(vec![]).is_zero());
        assert!((Scalar::function("f", "x") * Scalar::zero()).is_zero());
        assert!(!Scalar::function("f", "x").is_zero());
        assert!(!Scalar::delta("x", "y").is_zero());
        // Cancellation is not detected without simplification.
        let f = Scalar::function("f", "x");
        assert!(!(f.clone() - f).is_zero());
        // Small but genuine amplitudes are not zero
        assert!(!Scalar::number(1e-13).is_zero());
        assert!(!(Scalar::number(1e-7) * Scalar::number(1e-7)).simplify().is_zero());
    }

    #[test]
    fn test_is_one() {
        assert!(Scalar::one().is_one());
        assert!(Scalar::delta("x", "x").is_one());
        assert!(!Scalar::delta("x", "y").is_one());
        assert!(Scalar::overlap("f", "f").is_one());
        assert!(Scalar::sum(vec![Scalar::number(0.5), Scalar::number(0.5)]).is_one());
        assert!(Scalar::product(vec![]).is_one());
        assert!(!Scalar::function("f", "x").is_one());
    }

    #[test]
    fn test_term_count() {
        let a = Scalar::function("a", "x");
        let b = Scalar::function("b", "x");
        let expr = (a.clone() + b.clone()) * (a + b) * Scalar::one();
        assert_eq!(expr.term_count(), 4);
    }

    #[test]
    fn test_evaluate() {
        let expr = Scalar::number(2.0) * (Scalar::number(0.5) + Scalar::delta("x", "x"));
        assert_relative_eq!(expr.evaluate().unwrap().re, 3.0);
    }

    #[test]
    fn test_evaluate_unresolved() {
        let expr = Scalar::number(2.0) * Scalar::overlap("phi", "psi");
        assert!(matches!(
            expr.evaluate(),
            Err(AlgebraError::UnresolvedVariable(_))
        ));
        let value = expr
            .evaluate_with(&|s: &Scalar| match s {
                Scalar::InnerProduct { .. } => Some(Complex64::new(0.9, 0.0)),
                _ => None,
            })
            .unwrap();
        assert_relative_eq!(value.re, 1.8);
    }

    #[test]
    fn test_evaluate_zero_product_short_circuits() {
        let expr = Scalar::zero() * Scalar::function("f", "x");
        assert_eq!(expr.evaluate().unwrap(), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_display() {
        let expr = Scalar::number(2.0) * Scalar::function("f", "x")
            + Scalar::delta("x", "y")
            + Scalar::inner_product_fn("f", "x", "g", "y");
        assert_eq!(expr.to_string(), "(2*f(x) + D[x-y] + <f(x)|g(y)>)");
    }
}
