// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::errors::{CircuitError, MalformedReason};
use std::fmt;

/// One step of a circuit. Operands and results are register indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Loads the input ciphertext pre-encrypted at `index`.
    DefineConstant { index: usize },
    /// Loads the caller-supplied ciphertext named `name`.
    DefineVariable { name: char, index: usize },
    Multiply { a: usize, b: usize, result: usize },
    Add { a: usize, b: usize, one: usize, result: usize },
    Subtract { a: usize, b: usize, one: usize, result: usize },
    Negate { a: usize, neg_one: usize, result: usize },
    /// Makes `lhs` an alias of `rhs`.
    Assign { lhs: usize, rhs: usize, one: usize },
}

impl Instruction {
    pub const DEFINE_CONSTANT: i64 = 0;
    pub const MULTIPLY: i64 = 1;
    pub const DEFINE_VARIABLE: i64 = 2;
    pub const ADD: i64 = 3;
    pub const NEGATE: i64 = 4;
    pub const SUBTRACT: i64 = 5;
    pub const ASSIGN: i64 = 6;

    pub fn opcode(&self) -> i64 {
        match self {
            Self::DefineConstant { .. } => Self::DEFINE_CONSTANT,
            Self::Multiply { .. } => Self::MULTIPLY,
            Self::DefineVariable { .. } => Self::DEFINE_VARIABLE,
            Self::Add { .. } => Self::ADD,
            Self::Negate { .. } => Self::NEGATE,
            Self::Subtract { .. } => Self::SUBTRACT,
            Self::Assign { .. } => Self::ASSIGN,
        }
    }

    /// Decodes the numeric form `[opcode, operands...]`.
    ///
    /// Layouts: `[0, value, index]`, `[1, a, b, result]`, `[2, name, index]`,
    /// `[3, a, b, one, result]`, `[4, a, neg_one, result]`, `[5, a, b, one, result]`,
    /// `[6, lhs, rhs, one]`. The value of a constant travels in the input pool and is
    /// ignored here.
    pub fn decode(position: usize, words: &[i64]) -> Result<Self, CircuitError> {
        let malformed = |reason| CircuitError::malformed(position, reason);
        let (&opcode, operands) = words.split_first().ok_or_else(|| {
            malformed(MalformedReason::WrongArity {
                expected: 1,
                actual: 0,
            })
        })?;
        let arity = match opcode {
            Self::DEFINE_CONSTANT | Self::DEFINE_VARIABLE => 2,
            Self::MULTIPLY | Self::NEGATE | Self::ASSIGN => 3,
            Self::ADD | Self::SUBTRACT => 4,
            other => return Err(malformed(MalformedReason::UnknownOpcode(other))),
        };
        if operands.len() != arity {
            return Err(malformed(MalformedReason::WrongArity {
                expected: arity + 1,
                actual: words.len(),
            }));
        }
        let reg = |i: usize| {
            usize::try_from(operands[i])
                .map_err(|_| malformed(MalformedReason::NegativeIndex(operands[i])))
        };

        Ok(match opcode {
            Self::DEFINE_CONSTANT => Self::DefineConstant { index: reg(1)? },
            Self::DEFINE_VARIABLE => {
                let name = u8::try_from(operands[0])
                    .ok()
                    .map(char::from)
                    .filter(char::is_ascii_alphabetic)
                    .ok_or_else(|| malformed(MalformedReason::InvalidVariableName(operands[0])))?;
                Self::DefineVariable {
                    name,
                    index: reg(1)?,
                }
            }
            Self::MULTIPLY => Self::Multiply {
                a: reg(0)?,
                b: reg(1)?,
                result: reg(2)?,
            },
            Self::ADD => Self::Add {
                a: reg(0)?,
                b: reg(1)?,
                one: reg(2)?,
                result: reg(3)?,
            },
            Self::NEGATE => Self::Negate {
                a: reg(0)?,
                neg_one: reg(1)?,
                result: reg(2)?,
            },
            Self::SUBTRACT => Self::Subtract {
                a: reg(0)?,
                b: reg(1)?,
                one: reg(2)?,
                result: reg(3)?,
            },
            _ => Self::Assign {
                lhs: reg(0)?,
                rhs: reg(1)?,
                one: reg(2)?,
            },
        })
    }

    /// Registers read by the instruction.
    pub fn operands(&self) -> Vec<usize> {
        match *self {
            Self::DefineConstant { .. } | Self::DefineVariable { .. } => Vec::new(),
            Self::Multiply { a, b, .. } => vec![a, b],
            Self::Add { a, b, one, .. } | Self::Subtract { a, b, one, .. } => vec![a, b, one],
            Self::Negate { a, neg_one, .. } => vec![a, neg_one],
            Self::Assign { rhs, one, .. } => vec![rhs, one],
        }
    }

    /// Register written by the instruction.
    pub fn target(&self) -> usize {
        match *self {
            Self::DefineConstant { index } | Self::DefineVariable { index, .. } => index,
            Self::Multiply { result, .. }
            | Self::Add { result, .. }
            | Self::Subtract { result, .. }
            | Self::Negate { result, .. } => result,
            Self::Assign { lhs, .. } => lhs,
        }
    }

    /// Whether the instruction contributes a constraint.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Multiply { .. } | Self::Add { .. } | Self::Subtract { .. } | Self::Negate { .. }
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefineConstant { index } => write!(f, "$r{index} := <input>"),
            Self::DefineVariable { name, index } => write!(f, "$r{index} := {name}"),
            Self::Multiply { a, b, result } => write!(f, "$r{result} := $r{a} * $r{b}"),
            Self::Add { a, b, result, .. } => write!(f, "$r{result} := $r{a} + $r{b}"),
            Self::Subtract { a, b, result, .. } => write!(f, "$r{result} := $r{a} - $r{b}"),
            Self::Negate { a, result, .. } => write!(f, "$r{result} := -$r{a}"),
            Self::Assign { lhs, rhs, .. } => write!(f, "$r{lhs} := r{rhs}"),
        }
    }
}
