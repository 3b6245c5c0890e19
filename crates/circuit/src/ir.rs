// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Textual circuit programs.
//!
//! ```text
//! # x^2 + 3
//! $r2 := 3
//! $r3 := x
//! $r4 := $r3 * $r3
//! $r5 := $r4 + $r2
//! ```
//!
//! Each line is one of `$rN := $rA <op> $rB` with `op` in `*`, `+`, `-`;
//! `$rN := -$rA`; `$rN := <integer>` (a constant pre-encrypted into register `N`);
//! `$rN := rM` or `$rN := $rM` (assignment); `$rN := <letter>` (a named input).
//! Registers `0` and `1` always hold the constants `1` and `-1`.

use crate::errors::{CircuitError, MalformedReason};
use crate::inputs::{InputPool, NEG_ONE_REGISTER, ONE_REGISTER};
use crate::instruction::Instruction;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use zkhe_fhe::CiphertextAlgebra;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    /// Plaintext constants by register, including the two reserved ones.
    pub constants: BTreeMap<usize, i64>,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            instructions: Vec::new(),
            constants: BTreeMap::from([(ONE_REGISTER, 1), (NEG_ONE_REGISTER, -1)]),
        }
    }
}

fn is_reserved(index: usize) -> bool {
    index == ONE_REGISTER || index == NEG_ONE_REGISTER
}

fn register(token: &str, line: usize) -> Result<usize, CircuitError> {
    token
        .strip_prefix("$r")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| CircuitError::parse(line, format!("`{token}` is not a register")))
}

impl Program {
    pub fn parse(source: &str) -> Result<Self, CircuitError> {
        let mut program = Self::default();
        for (i, raw) in source.lines().enumerate() {
            let line = i + 1;
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.len() < 3 || tokens[1] != ":=" {
                return Err(CircuitError::parse(line, "expected `$rN := ...`"));
            }
            let target = register(tokens[0], line)?;
            if is_reserved(target) {
                return Err(CircuitError::parse(
                    line,
                    format!("register {target} is reserved"),
                ));
            }

            match tokens[2..] {
                [a, op, b] => {
                    let (a, b) = (register(a, line)?, register(b, line)?);
                    let instruction = match op {
                        "*" => Instruction::Multiply { a, b, result: target },
                        "+" => Instruction::Add {
                            a,
                            b,
                            one: ONE_REGISTER,
                            result: target,
                        },
                        "-" => Instruction::Subtract {
                            a,
                            b,
                            one: ONE_REGISTER,
                            result: target,
                        },
                        other => {
                            return Err(CircuitError::parse(
                                line,
                                format!("unknown operator `{other}`"),
                            ))
                        }
                    };
                    program.instructions.push(instruction);
                }
                [operand] => program.push_unary(target, operand, line)?,
                _ => return Err(CircuitError::parse(line, "unexpected number of tokens")),
            }
        }
        debug!(
            instructions = program.instructions.len(),
            constants = program.constants.len(),
            "parsed program"
        );
        Ok(program)
    }

    fn push_unary(&mut self, target: usize, operand: &str, line: usize) -> Result<(), CircuitError> {
        if let Ok(value) = operand.parse::<i64>() {
            self.constants.insert(target, value);
        } else if let Some(a) = operand.strip_prefix('-') {
            self.instructions.push(Instruction::Negate {
                a: register(a, line)?,
                neg_one: NEG_ONE_REGISTER,
                result: target,
            });
        } else if operand.starts_with("$r") || (operand.starts_with('r') && operand.len() > 1) {
            let rhs = register(operand, line)
                .or_else(|_| register(&format!("${operand}"), line))?;
            self.instructions.push(Instruction::Assign {
                lhs: target,
                rhs,
                one: ONE_REGISTER,
            });
        } else {
            let mut chars = operand.chars();
            match (chars.next(), chars.next()) {
                (Some(name), None) if name.is_ascii_alphabetic() => {
                    self.instructions
                        .push(Instruction::DefineVariable { name, index: target });
                }
                _ => {
                    return Err(CircuitError::parse(
                        line,
                        format!("`{operand}` is not a constant, register or variable"),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Builds a program from numeric instructions; constant values come from the
    /// `DefineConstant` words.
    pub fn from_numeric(words: &[Vec<i64>]) -> Result<Self, CircuitError> {
        let mut program = Self::default();
        for (position, w) in words.iter().enumerate() {
            let instruction = Instruction::decode(position, w)?;
            if is_reserved(instruction.target()) {
                return Err(CircuitError::malformed(
                    position,
                    MalformedReason::ReservedRegister(instruction.target()),
                ));
            }
            if let Instruction::DefineConstant { index } = instruction {
                program.constants.insert(index, w[1]);
            }
            program.instructions.push(instruction);
        }
        Ok(program)
    }

    /// Names of the inputs the program reads.
    pub fn variables(&self) -> Vec<char> {
        let mut names: Vec<char> = self
            .instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::DefineVariable { name, .. } => Some(*name),
                _ => None,
            })
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Encrypts every constant into the register it was declared at.
    pub fn encrypt_constants<A: CiphertextAlgebra>(
        &self,
        algebra: &A,
    ) -> Result<InputPool<A::Ciphertext>, CircuitError> {
        self.constants
            .iter()
            .map(|(&index, &value)| -> Result<_, CircuitError> {
                Ok((index, algebra.encrypt_value(value)?))
            })
            .collect()
    }
}

impl FromStr for Program {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, value) in &self.constants {
            if *index != ONE_REGISTER && *index != NEG_ONE_REGISTER {
                writeln!(f, "$r{index} := {value}")?;
            }
        }
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}
