// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for kets, measurements and configuration values.

use crate::error::{Result, ValidationError};

/// Largest qudit base; digits are written as `0-9a-z`.
pub const MAX_BASE: u32 = 36;

/// Validate a qudit base.
pub fn validate_base(base: u32) -> Result<()> {
    if !(2..=MAX_BASE).contains(&base) {
        return Err(ValidationError::Field {
            field: "base".into(),
            message: format!("must be between 2 and {}, got {}", MAX_BASE, base),
        }
        .into());
    }
    Ok(())
}

/// Validate numeric qudit digits against their base.
pub fn validate_digits(digits: &[u32], base: u32) -> Result<()> {
    validate_base(base)?;

    if digits.is_empty() {
        return Err(ValidationError::Field {
            field: "digits".into(),
            message: "must not be empty".into(),
        }
        .into());
    }

    if let Some((i, d)) = digits.iter().enumerate().find(|(_, d)| **d >= base) {
        return Err(ValidationError::Field {
            field: "digits".into(),
            message: format!("digit {} at index {} is out of range for base {}", d, i, base),
        }
        .into());
    }

    Ok(())
}

/// Parse a digit string such as `"0120"` into digit values.
pub fn parse_digits(digits: &str, base: u32) -> Result<Vec<u32>> {
    validate_base(base)?;

    let mut values = Vec::with_capacity(digits.len());
    for (i, c) in digits.chars().enumerate() {
        match c.to_digit(base) {
            Some(d) => values.push(d),
            None => {
                return Err(ValidationError::Field {
                    field: "digits".into(),
                    message: format!(
                        "'{}' at index {} is not a digit in base {}",
                        c, i, base
                    ),
                }
                .into())
            }
        }
    }

    validate_digits(&values, base)?;
    Ok(values)
}

/// Validate a mode-overlap visibility.
pub fn validate_visibility(visibility: f64) -> Result<()> {
    if !visibility.is_finite() || !(0.0..=1.0).contains(&visibility) {
        return Err(ValidationError::Field {
            field: "visibility".into(),
            message: format!("must be within [0, 1], got {}", visibility),
        }
        .into());
    }
    Ok(())
}

/// Validate the photon number per beam splitter input.
///
/// Input occupations `(n, m)` are labelled by two qudit digits of base
/// `max_photons + 1`.
pub fn validate_max_photons(max_photons: u32) -> Result<()> {
    if max_photons == 0 || max_photons >= MAX_BASE {
        return Err(ValidationError::Field {
            field: "max_photons".into(),
            message: format!("must be between 1 and {}, got {}", MAX_BASE - 1, max_photons),
        }
        .into());
    }
    Ok(())
}

/// Validate a set of measurement operators.
pub fn validate_kraus_ops(count: usize) -> Result<()> {
    if count == 0 {
        return Err(ValidationError::Field {
            field: "kraus_ops".into(),
            message: "at least one measurement operator is required".into(),
        }
        .into());
    }
    Ok(())
}

/// Guard against expressions that would expand into too many terms.
pub fn validate_term_budget(requested: usize, limit: u64) -> Result<()> {
    if requested as u64 > limit {
        return Err(ValidationError::ResourceLimit {
            resource: "expanded_terms".into(),
            limit,
            requested: requested as u64,
        }
        .into());
    }
    Ok(())
}

/// Check a computed probability and clamp round-off below zero.
pub fn validate_probability(probability: f64, tolerance: f64) -> Result<f64> {
    if probability.is_nan() {
        return Err(ValidationError::PhysicsConstraint("probability is NaN".into()).into());
    }
    if probability < -tolerance {
        return Err(ValidationError::PhysicsConstraint(format!(
            "negative probability {}",
            probability
        ))
        .into());
    }
    if probability > 1.0 + tolerance {
        tracing::warn!(probability, "Probability exceeds 1; state may not be normalized");
    }
    Ok(probability.max(0.0))
}
