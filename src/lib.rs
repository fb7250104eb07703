// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! QuAlg: symbolic algebra for quantum states and operators
//!
//! States and operators are sums of basis kets (or ket-bras) with symbolic
//! scalar coefficients. Qudit kets carry digit strings; Fock kets carry
//! creation operators over named modes with continuous frequency variables.
//! Frequency integrals are resolved with Dirac-delta sifting and profile
//! normalization, which is enough to compute measurement probabilities and
//! effective POVMs of linear-optics setups.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        measure       photonics           │
//! ├──────────────────┬──────────────────────┤
//! │     operator     │      integrate       │
//! ├──────────────────┴──────────────────────┤
//! │     state (qudit kets, Fock kets)        │
//! ├─────────────────────────────────────────┤
//! │         scalar          variable         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`scalar`]: Symbolic scalar expressions and simplification
//! - [`variable`]: Variables, renaming and fresh-name generation
//! - [`state`]: Basis kets and superpositions
//! - [`operator`]: Operators, composition and dense export
//! - [`integrate`]: Symbolic integration over frequency variables
//! - [`measure`]: Kraus-operator measurements
//! - [`photonics`]: Beam splitter and photon-number POVMs
//! - [`config`]: Configuration management
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod integrate;
pub mod measure;
pub mod operator;
pub mod photonics;
pub mod scalar;
pub mod state;
pub mod validation;
pub mod variable;

pub use config::Config;
pub use error::{Error, Result};
pub use operator::{outer_product, BaseOperator, Operator};
pub use scalar::Scalar;
pub use state::{BaseFockState, BaseQuditState, BaseState, State};
pub use variable::{Symbolic, Variable, VariableContext};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
