// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Linear-optics toolkit: multi-photon interference on a 50/50 beam splitter.
//!
//! Two input modes hold `n` photons with wavepacket `phi` and `m` photons
//! with wavepacket `psi`. Input occupations are labelled by the two-digit
//! qudit kets `|nm⟩` of base `max_photons + 1`. The beam splitter sends each
//! `phi` photon to `(c† + d†)/√2` and each `psi` photon to `(c† - d†)/√2` on
//! the output modes `c` and `d`. There, photon-number-resolving detectors
//! project onto `left` photons in `c` and `right` photons in `d`. Pulling a
//! detector projector back through the beam splitter gives the effective
//! POVM element on the input labels. Its entries depend on the visibility
//! `⟨phi|psi⟩` of the two wavepackets.

use std::iter;

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use crate::error::Result;
use crate::operator::matrix::qudit_basis;
use crate::operator::{outer_product, Operator};
use crate::scalar::Scalar;
use crate::state::{BaseFockState, BaseQuditState, BaseState, State};
use crate::validation::validate_max_photons;
use crate::variable::VariableContext;

/// Output mode on the left detector.
pub const LEFT_MODE: &str = "c";
/// Output mode on the right detector.
pub const RIGHT_MODE: &str = "d";
/// Wavepacket of the photons in the first input mode.
pub const PHI: &str = "phi";
/// Wavepacket of the photons in the second input mode.
pub const PSI: &str = "psi";

fn fock(excitations: &[(&str, &str)]) -> BaseState {
    BaseState::Fock(BaseFockState::excitations(excitations.iter().copied()))
}

fn factorial(n: u32) -> f64 {
    (1..=n).map(f64::from).product()
}

/// Detection patterns `(left, right)` with at most `total` photons, ordered
/// by `left` and then `right`.
pub fn detection_patterns(total: u32) -> Vec<(u32, u32)> {
    (0..=total)
        .flat_map(|left| (0..=total - left).map(move |right| (left, right)))
        .collect()
}

/// Qudit label `|nm⟩` of the input occupation with `n` `phi` photons and `m`
/// `psi` photons.
pub fn input_label(phi_photons: u32, psi_photons: u32, max_photons: u32) -> Result<BaseState> {
    validate_max_photons(max_photons)?;
    Ok(BaseState::Qudit(BaseQuditState::from_digits(
        vec![phi_photons, psi_photons],
        max_photons + 1,
    )?))
}

/// All input labels with up to `max_photons` photons per input, in
/// vector-index order.
pub fn input_basis(max_photons: u32) -> Result<Vec<BaseState>> {
    validate_max_photons(max_photons)?;
    qudit_basis(2, max_photons + 1)
}

/// `profile(v) (|c(v)⟩ ± |d(v)⟩)`, unnormalized.
fn split_photon(profile: &str, variable: &str, sign: f64) -> Result<State> {
    let f = Scalar::function(profile, variable);
    State::new(vec![
        (fock(&[(LEFT_MODE, variable)]), f.clone()),
        (fock(&[(RIGHT_MODE, variable)]), Scalar::number(sign) * f),
    ])
}

/// Tensor `n` split `phi` photons with `m` split `psi` photons. Every photon
/// starts out on `variable`; the tensor product renames repeats to fresh
/// variables.
fn split_photons(phi_photons: u32, psi_photons: u32, variable: &str) -> Result<State> {
    let phi = split_photon(PHI, variable, 1.0)?;
    let psi = split_photon(PSI, variable, -1.0)?;

    let mut ctx = VariableContext::new();
    let mut state = State::from_base(BaseState::Fock(BaseFockState::default()));
    let photons = iter::repeat(&phi)
        .take(phi_photons as usize)
        .chain(iter::repeat(&psi).take(psi_photons as usize));
    for photon in photons {
        state = state.tensor_product(photon, &mut ctx)?;
    }

    let total = phi_photons + psi_photons;
    let norm = 1.0
        / (2f64.powi(total as i32) * factorial(phi_photons) * factorial(psi_photons)).sqrt();
    Ok(state.scale(&Scalar::number(norm)).simplify())
}

/// Beam splitter output for `n` `phi` photons and `m` `psi` photons, over
/// the frequency variables `w, w_1, w_2, ...`.
pub fn fock_state(phi_photons: u32, psi_photons: u32) -> Result<State> {
    let state = split_photons(phi_photons, psi_photons, "w")?;
    debug!(
        phi_photons,
        psi_photons,
        terms = state.len(),
        "Built beam splitter output state"
    );
    Ok(state)
}

/// [`fock_state`] for every input occupation with up to `max_photons`
/// photons per input, in the order of [`input_basis`].
pub fn interference_states(max_photons: u32) -> Result<Vec<((u32, u32), State)>> {
    validate_max_photons(max_photons)?;
    let mut states = Vec::new();
    for n in 0..=max_photons {
        for m in 0..=max_photons {
            states.push(((n, m), fock_state(n, m)?));
        }
    }
    Ok(states)
}

/// The beam splitter as an operator from the input labels into Fock states,
/// with frequency variables `b, b_1, b_2, ...`.
pub fn beam_splitter(max_photons: u32) -> Result<Operator> {
    validate_max_photons(max_photons)?;
    let mut u = Operator::default();
    for n in 0..=max_photons {
        for m in 0..=max_photons {
            let output = split_photons(n, m, "b")?;
            let label = input_label(n, m, max_photons)?.to_state();
            u = u.checked_add(&outer_product(&output, &label))?;
        }
    }
    debug!(max_photons, terms = u.len(), "Built beam splitter");
    Ok(u.simplify())
}

/// Projector onto `left` photons in mode `c` and `right` photons in mode
/// `d`, integrated over the photon frequencies `p1, p2, ...`.
pub fn number_projector(left: u32, right: u32) -> Result<Operator> {
    let mut excitations = Vec::new();
    for i in 0..left + right {
        let mode = if i < left { LEFT_MODE } else { RIGHT_MODE };
        excitations.push((mode, format!("p{}", i + 1)));
    }
    let ket = BaseState::Fock(BaseFockState::excitations(excitations));
    let norm = 1.0 / (factorial(left) * factorial(right)).sqrt();
    let state = State::new(vec![(ket, Scalar::number(norm))])?;
    Ok(outer_product(&state, &state).simplify())
}

/// `U† P U`, integrating the frequencies bound by each composition straight
/// away so that intermediate coefficients stay small.
fn pull_back(u: &Operator, projector: &Operator, ctx: &mut VariableContext) -> Result<Operator> {
    let pulled = u.dagger().compose_with(projector, ctx)?.integrate_bound();
    Ok(pulled.compose_with(u, ctx)?.integrate_bound())
}

/// Effective POVM element for `(left, right)` detections on the input labels
/// with up to `max_photons` photons per input.
pub fn effective_povm(
    left: u32,
    right: u32,
    max_photons: u32,
    ctx: &mut VariableContext,
) -> Result<Operator> {
    let u = beam_splitter(max_photons)?;
    let povm = pull_back(&u, &number_projector(left, right)?, ctx)?;
    debug!(left, right, terms = povm.len(), "Computed effective POVM");
    Ok(povm)
}

/// Effective POVM elements for every detection pattern that the inputs can
/// produce, i.e. with at most `2 * max_photons` photons.
pub fn effective_povms(max_photons: u32) -> Result<Vec<((u32, u32), Operator)>> {
    let u = beam_splitter(max_photons)?;
    let mut ctx = VariableContext::new();
    detection_patterns(2 * max_photons)
        .into_iter()
        .map(|(left, right)| {
            let povm = pull_back(&u, &number_projector(left, right)?, &mut ctx)?;
            debug!(left, right, terms = povm.len(), "Computed effective POVM");
            Ok(((left, right), povm))
        })
        .collect()
}

/// Dense matrix of [`effective_povm`] over [`input_basis`] for a given
/// visibility.
pub fn povm_matrix(
    left: u32,
    right: u32,
    max_photons: u32,
    visibility: f64,
) -> Result<Array2<Complex64>> {
    let mut ctx = VariableContext::new();
    let povm = effective_povm(left, right, max_photons, &mut ctx)?;
    let basis = input_basis(max_photons)?;
    povm.to_matrix_with(&basis, &basis, &visibility_resolver(visibility))
}

/// Dense matrices of [`effective_povms`] over [`input_basis`].
pub fn povm_matrices(
    max_photons: u32,
    visibility: f64,
) -> Result<Vec<((u32, u32), Array2<Complex64>)>> {
    let basis = input_basis(max_photons)?;
    let resolve = visibility_resolver(visibility);
    effective_povms(max_photons)?
        .into_iter()
        .map(|(pattern, povm)| Ok((pattern, povm.to_matrix_with(&basis, &basis, &resolve)?)))
        .collect()
}

/// Resolve the overlaps `⟨phi|psi⟩` and `⟨psi|phi⟩` to a real visibility.
pub fn visibility_resolver(visibility: f64) -> impl Fn(&Scalar) -> Option<Complex64> {
    move |scalar: &Scalar| match scalar {
        Scalar::InnerProduct { bra, ket }
            if bra.variable.is_none()
                && ket.variable.is_none()
                && ((bra.name == PHI && ket.name == PSI) || (bra.name == PSI && ket.name == PHI)) =>
        {
            Some(Complex64::new(visibility, 0.0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::integrate::integrate_all;
    use crate::measure::{measure, measure_with, total_probability};
    use crate::variable::Symbolic;
    use approx::assert_relative_eq;

    const V: f64 = 0.9;

    fn norm(state: &State) -> Complex64 {
        let mut ctx = VariableContext::new();
        let inner = state.inner_product_with(state, &mut ctx).unwrap();
        integrate_all(&inner)
            .evaluate_with(&visibility_resolver(V))
            .unwrap()
    }

    fn projectors(total: u32) -> Vec<((u32, u32), Operator)> {
        detection_patterns(total)
            .into_iter()
            .map(|(l, r)| ((l, r), number_projector(l, r).unwrap()))
            .collect()
    }

    fn assert_identity(m: &Array2<Complex64>) {
        for ((i, j), x) in m.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(x.re, expected, epsilon = 1e-12);
            assert_relative_eq!(x.im, 0.0, epsilon = 1e-12);
        }
    }

    // =========================================================================
    // Input states
    // =========================================================================

    #[test]
    fn test_detection_patterns() {
        assert_eq!(
            detection_patterns(2),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (2, 0)]
        );
        assert_eq!(detection_patterns(4).len(), 15);
        assert_eq!(detection_patterns(0), vec![(0, 0)]);
    }

    #[test]
    fn test_input_labels() {
        assert_eq!(input_label(2, 1, 2).unwrap(), BaseState::qudit("21", 3).unwrap());
        assert!(input_label(2, 0, 1).is_err());
        assert!(input_label(0, 0, 0).is_err());
        let basis = input_basis(2).unwrap();
        assert_eq!(basis.len(), 9);
        assert_eq!(basis[5], input_label(1, 2, 2).unwrap());
    }

    #[test]
    fn test_fock_state_term_count() {
        assert_eq!(fock_state(0, 0).unwrap().len(), 1);
        let state = fock_state(2, 1).unwrap();
        assert_eq!(state.len(), 8);
        assert_eq!(state.variables().len(), 3);
    }

    #[test]
    fn test_two_photon_state_from_tensor_product() {
        // phi(w) psi(w_1) (c + d)(c - d) / 2
        let state = fock_state(1, 1).unwrap();
        assert_eq!(state.len(), 4);
        let both = Scalar::function(PHI, "w") * Scalar::function(PSI, "w_1");
        let expected = [
            ([(LEFT_MODE, "w"), (LEFT_MODE, "w_1")], 0.5),
            ([(RIGHT_MODE, "w"), (LEFT_MODE, "w_1")], 0.5),
            ([(LEFT_MODE, "w"), (RIGHT_MODE, "w_1")], -0.5),
            ([(RIGHT_MODE, "w"), (RIGHT_MODE, "w_1")], -0.5),
        ];
        for (ket, amplitude) in expected {
            assert_eq!(
                state.get_scalar(&fock(&ket)),
                (Scalar::number(amplitude) * both.clone()).simplify()
            );
        }
    }

    #[test]
    fn test_interference_states_are_normalized() {
        let states = interference_states(2).unwrap();
        assert_eq!(states.len(), 9);
        for (_, state) in &states {
            assert_relative_eq!(norm(state).re, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_photon_overlap() {
        // ⟨phi out|psi out⟩ = ⟨phi|psi⟩ (1 - 1)/2 = 0
        let phi = fock_state(1, 0).unwrap();
        let psi = fock_state(0, 1).unwrap();
        let mut ctx = VariableContext::new();
        let inner = phi.inner_product_with(&psi, &mut ctx).unwrap();
        let value = integrate_all(&inner)
            .evaluate_with(&visibility_resolver(V))
            .unwrap();
        assert_relative_eq!(value.re, 0.0, epsilon = 1e-12);
    }

    // =========================================================================
    // Beam splitter and projectors
    // =========================================================================

    #[test]
    fn test_beam_splitter_terms() {
        let u = beam_splitter(1).unwrap();
        // 1 vacuum + 2 + 2 + 4 two-photon terms
        assert_eq!(u.len(), 9);
        let names: Vec<String> = u.variables().iter().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["b", "b_1"]);

        // (1 + 2 + 4)^2 output kets for up to two photons per input
        assert_eq!(beam_splitter(2).unwrap().len(), 49);
    }

    #[test]
    fn test_beam_splitter_rejects_zero_photons() {
        assert!(beam_splitter(0).is_err());
    }

    #[test]
    fn test_number_projector_normalization() {
        let p = number_projector(2, 0).unwrap();
        assert_eq!(p.len(), 1);
        let (_, c) = p.iter().next().unwrap();
        assert_relative_eq!(c.evaluate().unwrap().re, 0.5, epsilon = 1e-12);
        let vac = number_projector(0, 0).unwrap();
        assert!(vac.variables().is_empty());
    }

    // =========================================================================
    // Effective POVMs
    // =========================================================================

    #[test]
    fn test_single_click_povm() {
        let m = povm_matrix(1, 0, 1, V).unwrap();
        assert_relative_eq!(m[[0, 0]].re, 0.0);
        assert_relative_eq!(m[[1, 1]].re, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m[[2, 2]].re, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m[[1, 2]].re, 0.5 * V, epsilon = 1e-12);
        assert_relative_eq!(m[[2, 1]].re, 0.5 * V, epsilon = 1e-12);
        assert_relative_eq!(m[[3, 3]].re, 0.0);
    }

    #[test]
    fn test_coincidence_povm_shows_hong_ou_mandel_dip() {
        let m = povm_matrix(1, 1, 1, V).unwrap();
        assert_relative_eq!(m[[3, 3]].re, (1.0 - V * V) / 2.0, epsilon = 1e-12);
        let perfect = povm_matrix(1, 1, 1, 1.0).unwrap();
        assert_relative_eq!(perfect[[3, 3]].re, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_povms_sum_to_identity() {
        let matrices = povm_matrices(1, V).unwrap();
        assert_eq!(matrices.len(), 6);
        let total = matrices
            .iter()
            .fold(Array2::<Complex64>::zeros((4, 4)), |acc, (_, m)| acc + m);
        assert_identity(&total);
    }

    #[test]
    fn test_two_photon_povms_sum_to_identity() {
        let matrices = povm_matrices(2, V).unwrap();
        assert_eq!(matrices.len(), 15);
        let total = matrices
            .iter()
            .fold(Array2::<Complex64>::zeros((9, 9)), |acc, (_, m)| acc + m);
        assert_identity(&total);
    }

    #[test]
    fn test_effective_povms_match_single_element() {
        let all = effective_povms(1).unwrap();
        let (_, coincidence) = all.iter().find(|(p, _)| *p == (1, 1)).unwrap();
        let basis = input_basis(1).unwrap();
        let resolve = visibility_resolver(V);
        let from_set = coincidence.to_matrix_with(&basis, &basis, &resolve).unwrap();
        let single = povm_matrix(1, 1, 1, V).unwrap();
        for (a, b) in from_set.iter().zip(single.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
        }
    }

    // =========================================================================
    // Measurements
    // =========================================================================

    #[test]
    fn test_measure_two_photon_state() {
        let state = fock_state(1, 1).unwrap();
        let results = measure_with(
            &state,
            &projectors(2),
            &EngineConfig::default(),
            &visibility_resolver(V),
        )
        .unwrap();
        assert_relative_eq!(total_probability(&results), 1.0, epsilon = 1e-12);
        let coincidence = results.iter().find(|r| r.outcome == (1, 1)).unwrap();
        assert_relative_eq!(coincidence.probability, (1.0 - V * V) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_photons_in_one_input_split_binomially() {
        // (c† + d†)² |0⟩ / (2√2): no visibility involved
        let results = measure(&fock_state(2, 0).unwrap(), &projectors(2)).unwrap();
        let p = |pattern: (u32, u32)| {
            results
                .iter()
                .find(|r| r.outcome == pattern)
                .map(|r| r.probability)
                .unwrap()
        };
        assert_relative_eq!(p((2, 0)), 0.25, epsilon = 1e-12);
        assert_relative_eq!(p((1, 1)), 0.5, epsilon = 1e-12);
        assert_relative_eq!(p((0, 2)), 0.25, epsilon = 1e-12);
        assert_relative_eq!(p((1, 0)), 0.0);
    }

    #[test]
    fn test_resolver_ignores_other_atoms() {
        let resolve = visibility_resolver(V);
        assert_eq!(resolve(&Scalar::overlap(PSI, PHI)), Some(Complex64::new(V, 0.0)));
        assert_eq!(resolve(&Scalar::overlap(PHI, "chi")), None);
        assert_eq!(resolve(&Scalar::function(PHI, "w")), None);
    }
}
