// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the symbolic engine.

use std::fmt;

/// Result type alias for QuAlg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Algebraic error raised by a scalar, state or operator operation
    Algebra(AlgebraError),
    /// Validation error
    Validation(ValidationError),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Algebra(e) => write!(f, "Algebra error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Algebra(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<AlgebraError> for Error {
    fn from(e: AlgebraError) -> Self {
        Error::Algebra(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Errors raised by the algebra itself.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgebraError {
    /// Operands have incompatible dimensions
    ShapeMismatch {
        operation: &'static str,
        left: String,
        right: String,
    },
    /// An operation received a value of the wrong kind
    TypeMismatch {
        operation: &'static str,
        expected: String,
        found: String,
    },
    /// Numeric conversion requested while symbolic quantities remain
    UnresolvedVariable(String),
    /// Normalizing by a zero probability or norm
    DivideByZero(String),
}

impl fmt::Display for AlgebraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgebraError::ShapeMismatch {
                operation,
                left,
                right,
            } => write!(
                f,
                "Shape mismatch in {}: {} is incompatible with {}",
                operation, left, right
            ),
            AlgebraError::TypeMismatch {
                operation,
                expected,
                found,
            } => write!(
                f,
                "Type mismatch in {}: expected {}, found {}",
                operation, expected, found
            ),
            AlgebraError::UnresolvedVariable(what) => {
                write!(f, "Unresolved symbolic quantity: {}", what)
            }
            AlgebraError::DivideByZero(what) => write!(f, "Division by zero: {}", what),
        }
    }
}

impl std::error::Error for AlgebraError {}

/// Validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Physics constraint violated
    PhysicsConstraint(String),
    /// Resource limit exceeded
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::PhysicsConstraint(msg) => {
                write!(f, "Physics constraint violated: {}", msg)
            }
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: limit={}, requested={}",
                    resource, limit, requested
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
