// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::arena::Arena;
use crate::errors::CircuitError;
use crate::instruction::Instruction;
use crate::track::Track;
use tracing::{debug, trace};

/// Registers after a run, plus the last register an arithmetic or assign instruction wrote.
#[derive(Debug, Clone)]
pub struct Evaluation<V> {
    pub registers: Arena<V>,
    pub output: Option<usize>,
}

/// Walks one instruction stream over any [`Track`].
pub struct Interpreter<'a> {
    instructions: &'a [Instruction],
    size: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(instructions: &'a [Instruction], size: usize) -> Self {
        Self { instructions, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn run<T: Track>(&self, track: &mut T) -> Result<Evaluation<T::Value>, CircuitError> {
        let mut registers = Arena::new(self.size);
        for (index, value) in track.inputs()? {
            registers.set(0, index, value)?;
        }

        let mut output = None;
        for (position, instruction) in self.instructions.iter().enumerate() {
            for index in instruction.operands() {
                registers.check(position, index)?;
            }
            registers.check(position, instruction.target())?;
            trace!(track = track.name(), position, %instruction, "step");

            match *instruction {
                Instruction::DefineConstant { index } => {
                    if let Some(v) = track.define_constant(position, index)? {
                        registers.set(position, index, v)?;
                    }
                }
                Instruction::DefineVariable { name, index } => {
                    if let Some(v) = track.define_variable(position, name, index)? {
                        registers.set(position, index, v)?;
                    }
                }
                Instruction::Multiply { a, b, result } => {
                    let v = track.multiply(
                        registers.get(position, a)?,
                        registers.get(position, b)?,
                        result,
                    )?;
                    registers.set(position, result, v)?;
                    output = Some(result);
                }
                Instruction::Add { a, b, one, result } => {
                    let v = track.add(
                        registers.get(position, a)?,
                        registers.get(position, b)?,
                        registers.get(position, one)?,
                        result,
                    )?;
                    registers.set(position, result, v)?;
                    output = Some(result);
                }
                Instruction::Subtract { a, b, one, result } => {
                    let v = track.subtract(
                        registers.get(position, a)?,
                        registers.get(position, b)?,
                        registers.get(position, one)?,
                        result,
                    )?;
                    registers.set(position, result, v)?;
                    output = Some(result);
                }
                Instruction::Negate { a, neg_one, result } => {
                    let v = track.negate(
                        registers.get(position, a)?,
                        registers.get(position, neg_one)?,
                        result,
                    )?;
                    registers.set(position, result, v)?;
                    output = Some(result);
                }
                Instruction::Assign { lhs, rhs, one } => {
                    registers.get(position, one)?;
                    registers.alias(position, lhs, rhs)?;
                    output = Some(lhs);
                }
            }
        }
        debug!(
            track = track.name(),
            instructions = self.instructions.len(),
            ?output,
            "interpreted circuit"
        );
        Ok(Evaluation { registers, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MalformedReason;
    use std::collections::HashMap;

    /// Plain integer arithmetic mirroring the constraint shapes.
    struct Integers {
        pool: Vec<i64>,
        names: HashMap<char, i64>,
    }

    impl Track for Integers {
        type Value = i64;

        fn name(&self) -> &'static str {
            "integers"
        }

        fn inputs(&mut self) -> Result<Vec<(usize, i64)>, CircuitError> {
            Ok(self.pool.iter().copied().enumerate().collect())
        }

        fn define_constant(&mut self, _: usize, index: usize) -> Result<Option<i64>, CircuitError> {
            Ok(Some(self.pool[index]))
        }

        fn define_variable(
            &mut self,
            position: usize,
            name: char,
            _: usize,
        ) -> Result<Option<i64>, CircuitError> {
            self.names.get(&name).copied().map(Some).ok_or_else(|| {
                CircuitError::malformed(position, MalformedReason::UnknownVariable(name))
            })
        }

        fn multiply(&mut self, a: &i64, b: &i64, _: usize) -> Result<i64, CircuitError> {
            Ok(a * b)
        }

        fn add(&mut self, a: &i64, b: &i64, one: &i64, _: usize) -> Result<i64, CircuitError> {
            Ok((a + b) * one)
        }

        fn subtract(&mut self, a: &i64, b: &i64, one: &i64, _: usize) -> Result<i64, CircuitError> {
            Ok((a - b) * one)
        }

        fn negate(&mut self, a: &i64, neg_one: &i64, _: usize) -> Result<i64, CircuitError> {
            Ok(a * neg_one)
        }
    }

    fn integers() -> Integers {
        Integers {
            pool: vec![1, -1, 7],
            names: HashMap::from([('x', 3)]),
        }
    }

    #[test]
    fn test_runs_in_order() {
        let program = [
            Instruction::DefineVariable { name: 'x', index: 3 },
            Instruction::Multiply { a: 3, b: 3, result: 4 },
            Instruction::Multiply { a: 4, b: 2, result: 5 },
            Instruction::Subtract { a: 5, b: 3, one: 0, result: 6 },
            Instruction::Negate { a: 6, neg_one: 1, result: 7 },
        ];
        let eval = Interpreter::new(&program, 8).run(&mut integers()).unwrap();
        assert_eq!(eval.output, Some(7));
        assert_eq!(eval.registers.value(5), Some(&63));
        assert_eq!(eval.registers.value(7), Some(&-60));
    }

    #[test]
    fn test_assign_is_an_alias() {
        let program = [
            Instruction::DefineVariable { name: 'x', index: 3 },
            Instruction::Assign { lhs: 4, rhs: 3, one: 0 },
            Instruction::Add { a: 4, b: 2, one: 0, result: 5 },
        ];
        let eval = Interpreter::new(&program, 6).run(&mut integers()).unwrap();
        assert_eq!(eval.registers.value(5), Some(&10));
        assert_eq!(eval.registers.resolve(4), 3);
    }

    #[test]
    fn test_fails_closed_on_bad_registers() {
        let undefined = [Instruction::Multiply { a: 2, b: 4, result: 5 }];
        assert!(matches!(
            Interpreter::new(&undefined, 6).run(&mut integers()),
            Err(CircuitError::MalformedInstruction {
                position: 0,
                reason: MalformedReason::UndefinedIndex(4)
            })
        ));

        let out_of_range = [
            Instruction::Add { a: 0, b: 0, one: 0, result: 3 },
            Instruction::Add { a: 0, b: 0, one: 0, result: 9 },
        ];
        assert!(matches!(
            Interpreter::new(&out_of_range, 4).run(&mut integers()),
            Err(CircuitError::MalformedInstruction {
                position: 1,
                reason: MalformedReason::IndexOutOfRange { index: 9, size: 4 }
            })
        ));

        let unknown = [Instruction::DefineVariable { name: 'q', index: 3 }];
        assert!(matches!(
            Interpreter::new(&unknown, 4).run(&mut integers()),
            Err(CircuitError::MalformedInstruction {
                reason: MalformedReason::UnknownVariable('q'),
                ..
            })
        ));
    }
}
