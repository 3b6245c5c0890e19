// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum R1csError {
    #[error("Variable {index} is out of range for {size} variables")]
    VariableOutOfRange { index: usize, size: usize },

    #[error("The constant-one variable cannot be assigned")]
    ConstantVariable,

    #[error("Cannot mark {requested} public inputs out of {available} variables")]
    InvalidInputCount { requested: usize, available: usize },

    #[error("Expected {expected} assignment values, got {actual}")]
    AssignmentLength { expected: usize, actual: usize },
}
