// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Error types for RNS polynomial operations.

use thiserror::Error;

/// Errors that can occur while building chains, tables or loading polynomials.
#[derive(Debug, Error)]
pub enum PolynomialError {
    /// The modulus chain is not usable for a negacyclic ring of the given degree
    #[error("Invalid modulus chain: {message}")]
    InvalidChain { message: String },

    /// No primitive 2N-th root of unity exists for this modulus
    #[error("Modulus {modulus} has no primitive {order}-th root of unity")]
    NoPrimitiveRoot { modulus: u64, order: usize },

    /// Residue data does not match the `N * k` layout of the chain
    #[error("Expected {expected} residues, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A persisted polynomial document lacks a required field
    #[error("Missing field `{0}` in polynomial document")]
    MissingField(&'static str),

    /// A persisted polynomial document is structurally invalid
    #[error("Invalid polynomial document: {message}")]
    InvalidDocument { message: String },

    /// Modulus operation error from fhe-math
    #[error("Modulus error: {0}")]
    Modulus(#[from] fhe_math::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PolynomialError {
    pub(crate) fn invalid_document(message: impl Into<String>) -> Self {
        PolynomialError::InvalidDocument {
            message: message.into(),
        }
    }
}
