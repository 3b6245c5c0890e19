// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Rank-1 constraint systems whose variables take values in the proof ring.

mod constraint_system;
mod errors;
mod linear_combination;

pub use constraint_system::{ConstraintSystem, R1cs, R1csConstraint};
pub use errors::R1csError;
pub use linear_combination::{LinearCombination, Term, Variable};
