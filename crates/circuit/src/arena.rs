// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Fixed-size register file with checked access.

use crate::errors::{CircuitError, MalformedReason};

#[derive(Debug, Clone)]
enum Slot<T> {
    Empty,
    Value(T),
    /// Points at a slot holding a value. Always a root at the time it is created.
    Alias(usize),
}

/// Registers `0..size`, each empty, holding a value, or aliasing another register.
///
/// Every access names the instruction position so failures can be reported as malformed
/// instructions.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Arena<T> {
    pub fn new(size: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| Slot::Empty).take(size).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn check(&self, position: usize, index: usize) -> Result<(), CircuitError> {
        if index >= self.slots.len() {
            return Err(CircuitError::malformed(
                position,
                MalformedReason::IndexOutOfRange {
                    index,
                    size: self.slots.len(),
                },
            ));
        }
        Ok(())
    }

    /// Writes `value`, dropping any alias `index` had.
    pub fn set(&mut self, position: usize, index: usize, value: T) -> Result<(), CircuitError> {
        self.check(position, index)?;
        self.slots[index] = Slot::Value(value);
        Ok(())
    }

    /// The register `index` ultimately refers to.
    pub fn resolve(&self, index: usize) -> usize {
        let mut i = index;
        while let Some(Slot::Alias(next)) = self.slots.get(i) {
            i = *next;
        }
        i
    }

    pub fn get(&self, position: usize, index: usize) -> Result<&T, CircuitError> {
        self.check(position, index)?;
        match &self.slots[self.resolve(index)] {
            Slot::Value(v) => Ok(v),
            _ => Err(CircuitError::malformed(
                position,
                MalformedReason::UndefinedIndex(index),
            )),
        }
    }

    /// Value at `index`, if any, without an instruction context.
    pub fn value(&self, index: usize) -> Option<&T> {
        match self.slots.get(self.resolve(index)) {
            Some(Slot::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn is_alias(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Alias(_)))
    }

    /// Makes `lhs` read whatever `rhs` reads.
    ///
    /// # Errors
    ///
    /// Fails if either register is out of range or `rhs` holds no value.
    pub fn alias(&mut self, position: usize, lhs: usize, rhs: usize) -> Result<(), CircuitError> {
        self.check(position, lhs)?;
        self.get(position, rhs)?;
        let root = self.resolve(rhs);
        if root != lhs {
            self.slots[lhs] = Slot::Alias(root);
        }
        Ok(())
    }
}
