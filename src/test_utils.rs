// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for unit tests.

use std::f64::consts::FRAC_1_SQRT_2;

use crate::scalar::Scalar;
use crate::state::{BaseFockState, BaseState, State};

/// Fock ket with one photon per `(mode, variable)` pair.
pub fn fock_ket(excitations: &[(&str, &str)]) -> BaseState {
    BaseState::Fock(BaseFockState::excitations(excitations.iter().copied()))
}

/// Fock vacuum over the given modes.
pub fn vacuum_ket(modes: &[&str]) -> BaseState {
    BaseState::Fock(BaseFockState::vacuum(modes.iter().copied()))
}

/// Qubit basis state such as `|01⟩`.
pub fn qubit_state(digits: &str) -> State {
    State::from_base(BaseState::qubit(digits).unwrap())
}

/// `(|0⟩ + |1⟩)/√2`.
pub fn plus_state() -> State {
    State::new(vec![
        (BaseState::qubit("0").unwrap(), Scalar::number(FRAC_1_SQRT_2)),
        (BaseState::qubit("1").unwrap(), Scalar::number(FRAC_1_SQRT_2)),
    ])
    .unwrap()
}

/// Single photon in `mode` with wavepacket `profile(var)`.
pub fn photon_state(mode: &str, profile: &str, var: &str) -> State {
    State::new(vec![(
        fock_ket(&[(mode, var)]),
        Scalar::function(profile, var),
    )])
    .unwrap()
}
