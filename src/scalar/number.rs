// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Complex constants with structural equality.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg};

use num_complex::Complex64;

/// Absolute tolerance of the structural `is_zero`/`is_one` tests.
///
/// Only round-off in the last bits is absorbed; any amplitude a caller could
/// mean stays non-zero.
pub const EPSILON: f64 = 1e-16;

/// Default absolute tolerance for numeric results such as probabilities.
pub const TOLERANCE: f64 = 1e-12;

/// An immutable complex constant.
///
/// Equality, hashing and ordering work on the bit patterns of the real and
/// imaginary parts (with `-0.0` folded into `0.0`), so numbers can be used as
/// parts of map keys. Closeness tests go through [`Number::is_zero`] and
/// [`Number::is_one`].
#[derive(Debug, Clone, Copy)]
pub struct Number(Complex64);

impl Number {
    pub const ZERO: Number = Number(Complex64::new(0.0, 0.0));
    pub const ONE: Number = Number(Complex64::new(1.0, 0.0));

    pub fn new(re: f64, im: f64) -> Self {
        Self(Complex64::new(re, im))
    }

    pub fn real(re: f64) -> Self {
        Self::new(re, 0.0)
    }

    pub fn value(&self) -> Complex64 {
        self.0
    }

    pub fn conj(&self) -> Self {
        Self(self.0.conj())
    }

    pub fn is_zero(&self) -> bool {
        self.0.norm() <= EPSILON
    }

    pub fn is_one(&self) -> bool {
        (self.0 - Complex64::new(1.0, 0.0)).norm() <= EPSILON
    }

    fn key(&self) -> (f64, f64) {
        (fold_zero(self.0.re), fold_zero(self.0.im))
    }
}

fn fold_zero(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        let (a_re, a_im) = self.key();
        let (b_re, b_im) = other.key();
        a_re.to_bits() == b_re.to_bits() && a_im.to_bits() == b_im.to_bits()
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (re, im) = self.key();
        re.to_bits().hash(state);
        im.to_bits().hash(state);
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_re, a_im) = self.key();
        let (b_re, b_im) = other.key();
        a_re.total_cmp(&b_re).then(a_im.total_cmp(&b_im))
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        Number(self.0 + rhs.0)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        Number(self.0 * rhs.0)
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        Number(-self.0)
    }
}

impl From<Complex64> for Number {
    fn from(c: Complex64) -> Self {
        Number(c)
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Number::real(x)
    }
}

impl From<i32> for Number {
    fn from(x: i32) -> Self {
        Number::real(x as f64)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Complex64 { re, im } = self.0;
        if im == 0.0 {
            write!(f, "{}", re)
        } else if re == 0.0 {
            write!(f, "{}i", im)
        } else {
            write!(f, "({}{:+}i)", re, im)
        }
    }
}
