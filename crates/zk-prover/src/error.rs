// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZkError {
    #[error("FHE error: {0}")]
    Fhe(#[from] fhe::Error),

    #[error("Parameter error: {0}")]
    Preset(#[from] zkhe_fhe_params::PresetError),

    #[error("Ring error: {0}")]
    Ring(#[from] zkhe_ring::RingError),

    #[error("Constraint system error: {0}")]
    R1cs(#[from] zkhe_r1cs::R1csError),

    #[error("Polynomial error: {0}")]
    Polynomial(#[from] zkhe_polynomial::PolynomialError),

    #[error("Encoding parameters do not match the proof ring: {0}")]
    EncodingMismatch(String),

    #[error("Cannot generate keys for a constraint system without constraints")]
    EmptyConstraintSystem,

    #[error("{constraints} constraints exceed the {bound} available interpolation points")]
    TooManyConstraints { constraints: usize, bound: u64 },

    #[error("Expected {expected} primary inputs, got {actual}")]
    InputLength { expected: usize, actual: usize },
}
