// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::circuit::CircuitStage;
use std::fmt;
use thiserror::Error;
use zkhe_fhe::FheError;
use zkhe_r1cs::R1csError;
use zkhe_ring::RingError;
use zkhe_zk_prover::ZkError;

/// Why an instruction was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    UnknownOpcode(i64),
    WrongArity { expected: usize, actual: usize },
    /// The operand has not been written by any earlier instruction or input.
    UndefinedIndex(usize),
    IndexOutOfRange { index: usize, size: usize },
    NegativeIndex(i64),
    InvalidVariableName(i64),
    /// Registers 0 and 1 hold the constants `1` and `-1` and are never written.
    ReservedRegister(usize),
    UnknownVariable(char),
    MissingConstant(usize),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode(op) => write!(f, "unknown opcode {op}"),
            Self::WrongArity { expected, actual } => {
                write!(f, "expected {expected} words, found {actual}")
            }
            Self::UndefinedIndex(i) => write!(f, "register {i} is read before it is defined"),
            Self::IndexOutOfRange { index, size } => {
                write!(f, "register {index} is outside the {size} allocated registers")
            }
            Self::NegativeIndex(i) => write!(f, "negative register {i}"),
            Self::InvalidVariableName(c) => write!(f, "{c} is not a variable name"),
            Self::ReservedRegister(i) => write!(f, "register {i} is reserved"),
            Self::UnknownVariable(name) => write!(f, "no ciphertext supplied for `{name}`"),
            Self::MissingConstant(i) => write!(f, "no input ciphertext at register {i}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CircuitError {
    #[error("Malformed instruction at position {position}: {reason}")]
    MalformedInstruction {
        position: usize,
        reason: MalformedReason,
    },

    #[error("Noise budget exhausted at register {index}: {remaining} bits left, {required} required")]
    NoiseBudgetExhausted {
        index: usize,
        remaining: usize,
        required: usize,
    },

    #[error("Circuit is {actual}, operation requires {expected}")]
    NotReady {
        expected: CircuitStage,
        actual: CircuitStage,
    },

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Circuit has no computed output")]
    NoOutput,

    #[error("FHE error: {0}")]
    Fhe(#[from] FheError),

    #[error("Proof system error: {0}")]
    Zk(#[from] ZkError),

    #[error("Constraint system error: {0}")]
    R1cs(#[from] R1csError),

    #[error("Ring error: {0}")]
    Ring(#[from] RingError),
}

impl CircuitError {
    pub(crate) fn malformed(position: usize, reason: MalformedReason) -> Self {
        Self::MalformedInstruction { position, reason }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
