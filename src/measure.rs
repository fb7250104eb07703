// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Measurement of states with a set of Kraus operators.
//!
//! For every Kraus operator `K_m` the unnormalized post-measurement state
//! `K_m|ψ⟩` is computed symbolically, its squared norm is integrated over
//! all free variables and reduced to a probability, and the state is
//! normalized. Choosing an outcome is left to the caller
//! ([`sample_outcome`] does it with a `rand` generator).
//!
//! # Example
//!
//! ```
//! use qualg::measure::measure;
//! use qualg::operator::outer_product;
//! use qualg::state::{BaseState, State};
//!
//! let zero = State::from_base(BaseState::qubit("0").unwrap());
//! let one = State::from_base(BaseState::qubit("1").unwrap());
//! let kraus = vec![(0, outer_product(&zero, &zero)), (1, outer_product(&one, &one))];
//! let results = measure(&zero, &kraus).unwrap();
//! assert!((results[0].probability - 1.0).abs() < 1e-12);
//! assert!(results[1].post_meas_state.is_none());
//! ```

use num_complex::Complex64;
use rand::Rng;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{AlgebraError, Result};
use crate::integrate::integrate_all;
use crate::operator::Operator;
use crate::scalar::Scalar;
use crate::state::State;
use crate::validation::{validate_kraus_ops, validate_probability, validate_term_budget};
use crate::variable::VariableContext;

/// Outcome of one Kraus operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementResult<O> {
    /// Label of the Kraus operator
    pub outcome: O,
    /// Probability of this outcome
    pub probability: f64,
    /// Normalized post-measurement state, `None` for an impossible outcome
    #[serde(serialize_with = "serialize_state")]
    pub post_meas_state: Option<State>,
}

fn serialize_state<S: Serializer>(
    state: &Option<State>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match state {
        Some(s) => serializer.serialize_some(&s.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Measure with default engine settings; every coefficient must reduce to a
/// number.
pub fn measure<O: Clone>(
    state: &State,
    kraus_ops: &[(O, Operator)],
) -> Result<Vec<MeasurementResult<O>>> {
    measure_with(state, kraus_ops, &EngineConfig::default(), &|_: &Scalar| None)
}

/// Measure `state`, resolving leftover symbolic atoms (such as mode
/// overlaps) through `resolve`.
pub fn measure_with<O, F>(
    state: &State,
    kraus_ops: &[(O, Operator)],
    engine: &EngineConfig,
    resolve: &F,
) -> Result<Vec<MeasurementResult<O>>>
where
    O: Clone,
    F: Fn(&Scalar) -> Option<Complex64>,
{
    validate_kraus_ops(kraus_ops.len())?;
    let mut ctx = VariableContext::new();
    let mut results = Vec::with_capacity(kraus_ops.len());

    for (outcome, kraus) in kraus_ops {
        let post = kraus.apply_with(state, &mut ctx)?.integrate_bound();
        let norm = post.inner_product_with(&post, &mut ctx)?;
        validate_term_budget(norm.term_count(), engine.max_expanded_terms)?;

        let value = integrate_all(&norm).evaluate_with(resolve)?;
        if value.im.abs() > engine.tolerance {
            warn!(imaginary = value.im, "Probability has an imaginary part");
        }
        let probability = validate_probability(value.re, engine.tolerance)?;

        let post_meas_state = if probability <= engine.tolerance {
            None
        } else {
            Some(normalize(&post, probability)?)
        };
        debug!(
            probability,
            possible = post_meas_state.is_some(),
            "Measured outcome"
        );

        results.push(MeasurementResult {
            outcome: outcome.clone(),
            probability,
            post_meas_state,
        });
    }

    Ok(results)
}

/// `state / √p`.
pub fn normalize(state: &State, probability: f64) -> Result<State> {
    if !probability.is_finite() || probability <= 0.0 {
        return Err(AlgebraError::DivideByZero(format!(
            "cannot normalize by probability {}",
            probability
        ))
        .into());
    }
    Ok(state
        .scale(&Scalar::number(1.0 / probability.sqrt()))
        .simplify())
}

/// Sum of the outcome probabilities; one for a complete set of Kraus
/// operators.
pub fn total_probability<O>(results: &[MeasurementResult<O>]) -> f64 {
    results.iter().map(|r| r.probability).sum()
}

/// Pick an outcome with the computed probabilities.
///
/// Returns `None` if the draw falls beyond the total probability, which can
/// only happen for an incomplete set of Kraus operators.
pub fn sample_outcome<'a, O, R: Rng + ?Sized>(
    results: &'a [MeasurementResult<O>],
    rng: &mut R,
) -> Option<&'a MeasurementResult<O>> {
    let r: f64 = rng.gen();
    let mut cumulative = 0.0;
    for result in results {
        if result.probability <= 0.0 {
            continue;
        }
        cumulative += result.probability;
        if r < cumulative {
            return Some(result);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ValidationError};
    use crate::operator::matrix::qudit_basis;
    use crate::operator::{outer_product, BaseOperator};
    use crate::state::BaseState;
    use crate::test_utils::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn computational_kraus() -> Vec<(u8, Operator)> {
        let s0 = qubit_state("0");
        let s1 = qubit_state("1");
        vec![(0, outer_product(&s0, &s0)), (1, outer_product(&s1, &s1))]
    }

    // =========================================================================
    // Qubit measurements
    // =========================================================================

    #[test]
    fn test_measure_basis_states() {
        let kraus = computational_kraus();

        let results = measure(&qubit_state("0"), &kraus).unwrap();
        assert_relative_eq!(results[0].probability, 1.0, epsilon = 1e-12);
        assert_relative_eq!(results[1].probability, 0.0);
        assert_eq!(results[0].post_meas_state, Some(qubit_state("0")));
        assert!(results[1].post_meas_state.is_none());

        let results = measure(&qubit_state("1"), &kraus).unwrap();
        assert_eq!(results[1].outcome, 1);
        assert_relative_eq!(results[1].probability, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_measure_plus_state() {
        let results = measure(&plus_state(), &computational_kraus()).unwrap();
        assert_relative_eq!(results[0].probability, 0.5, epsilon = 1e-12);
        assert_relative_eq!(results[1].probability, 0.5, epsilon = 1e-12);

        // Post-measurement states are normalized
        let post = results[0].post_meas_state.as_ref().unwrap();
        let norm = post.inner_product(post).unwrap().evaluate().unwrap();
        assert_relative_eq!(norm.re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_measurement_completeness() {
        let state = State::new(vec![
            (BaseState::qubit("0").unwrap(), Scalar::number(0.6)),
            (
                BaseState::qubit("1").unwrap(),
                Scalar::number(Complex64::new(0.0, 0.8)),
            ),
        ])
        .unwrap();
        let results = measure(&state, &computational_kraus()).unwrap();
        assert_relative_eq!(total_probability(&results), 1.0, epsilon = 1e-12);
        assert_relative_eq!(results[1].probability, 0.64, epsilon = 1e-12);
    }

    #[test]
    fn test_small_amplitudes_keep_their_probability() {
        for amplitude in [1e-5_f64, 1e-7] {
            let state = State::new(vec![
                (
                    BaseState::qubit("0").unwrap(),
                    Scalar::number((1.0 - amplitude * amplitude).sqrt()),
                ),
                (BaseState::qubit("1").unwrap(), Scalar::number(amplitude)),
            ])
            .unwrap();
            let results = measure(&state, &computational_kraus()).unwrap();
            assert_relative_eq!(
                results[1].probability,
                amplitude * amplitude,
                max_relative = 1e-9
            );
            assert_relative_eq!(total_probability(&results), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_impossible_outcome_uses_engine_tolerance() {
        // p = 1e-14 is reported but sits below the default cut-off
        let state = State::new(vec![
            (BaseState::qubit("0").unwrap(), Scalar::number(1.0)),
            (BaseState::qubit("1").unwrap(), Scalar::number(1e-7)),
        ])
        .unwrap();
        let results = measure(&state, &computational_kraus()).unwrap();
        assert!(results[1].probability > 0.0);
        assert!(results[1].post_meas_state.is_none());

        let strict = EngineConfig {
            tolerance: 1e-15,
            ..EngineConfig::default()
        };
        let results =
            measure_with(&state, &computational_kraus(), &strict, &|_: &Scalar| None).unwrap();
        assert!(results[1].post_meas_state.is_some());
    }

    #[test]
    fn test_empty_kraus_set() {
        let kraus: Vec<(u8, Operator)> = Vec::new();
        assert!(measure(&qubit_state("0"), &kraus).is_err());
    }

    // =========================================================================
    // Fock measurements
    // =========================================================================

    #[test]
    fn test_measure_single_photon() {
        let occupied =
            BaseOperator::new(fock_ket(&[("a", "x")]), fock_ket(&[("a", "x")])).to_operator();
        let vacuum = BaseOperator::new(vacuum_ket(&["a"]), vacuum_ket(&["a"])).to_operator();
        let kraus = vec![("click", occupied), ("no click", vacuum)];

        let results = measure(&photon_state("a", "phi", "w"), &kraus).unwrap();
        assert_relative_eq!(results[0].probability, 1.0, epsilon = 1e-12);
        assert_relative_eq!(results[1].probability, 0.0);
        assert_relative_eq!(total_probability(&results), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unresolved_overlap_requires_resolver() {
        // (phi(w)|a(w)⟩ + psi(w)|a(w)⟩)/√2 has norm 1 + Re⟨phi|psi⟩
        let ket = fock_ket(&[("a", "w")]);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let state = State::new(vec![
            (ket.clone(), Scalar::number(s) * Scalar::function("phi", "w")),
            (ket, Scalar::number(s) * Scalar::function("psi", "w")),
        ])
        .unwrap();
        let op = BaseOperator::new(fock_ket(&[("a", "x")]), fock_ket(&[("a", "x")])).to_operator();
        let kraus = vec![(0, op)];

        let err = measure(&state, &kraus).unwrap_err();
        assert!(matches!(err, Error::Algebra(AlgebraError::UnresolvedVariable(_))));

        let results = measure_with(
            &state,
            &kraus,
            &EngineConfig::default(),
            &|_: &Scalar| Some(Complex64::new(0.5, 0.0)),
        )
        .unwrap();
        assert_relative_eq!(results[0].probability, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_term_budget() {
        let engine = EngineConfig {
            max_expanded_terms: 1,
            ..EngineConfig::default()
        };
        let identity = Operator::identity(&qudit_basis(1, 2).unwrap()).unwrap();
        let kraus = vec![(0, identity)];
        let err = measure_with(&plus_state(), &kraus, &engine, &|_: &Scalar| None).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::ResourceLimit { .. })
        ));
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn test_normalize_zero_probability() {
        let err = normalize(&qubit_state("0"), 0.0).unwrap_err();
        assert!(matches!(err, Error::Algebra(AlgebraError::DivideByZero(_))));
        assert!(normalize(&qubit_state("0"), 1e-14).is_ok());
    }

    #[test]
    fn test_sample_outcome() {
        let results = measure(&plus_state(), &computational_kraus()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 2];
        for _ in 0..1000 {
            let r = sample_outcome(&results, &mut rng).unwrap();
            counts[r.outcome as usize] += 1;
        }
        assert!(counts[0] > 400 && counts[1] > 400);
    }

    #[test]
    fn test_sample_outcome_skips_impossible() {
        let results = measure(&qubit_state("1"), &computational_kraus()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(sample_outcome(&results, &mut rng).unwrap().outcome, 1);
        }
    }

    #[test]
    fn test_result_serializes_to_json() {
        let results = measure(&qubit_state("0"), &computational_kraus()).unwrap();
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json[0]["outcome"], 0);
        assert_eq!(json[0]["post_meas_state"], "1*|0>");
        assert!(json[1]["post_meas_state"].is_null());
    }
}
