// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::errors::R1csError;
use crate::linear_combination::{LinearCombination, Variable};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use zkhe_ring::{RingContext, RingElement};

/// One rank-1 constraint `a · b = c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct R1csConstraint {
    pub a: LinearCombination,
    pub b: LinearCombination,
    pub c: LinearCombination,
}

impl R1csConstraint {
    pub fn is_satisfied_by(&self, z: &[RingElement], zero: &RingElement) -> bool {
        let a = self.a.evaluate(z, zero);
        let b = self.b.evaluate(z, zero);
        let c = self.c.evaluate(z, zero);
        &a * &b == c
    }
}

impl fmt::Display for R1csConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) * ({}) = ({})", self.a, self.b, self.c)
    }
}

/// A value-free snapshot of the constraints, as consumed by key generation.
///
/// Layout of a full assignment: `z = (1, primary..., auxiliary...)`.
#[derive(Debug, Clone)]
pub struct R1cs {
    ctx: Arc<RingContext>,
    constraints: Vec<R1csConstraint>,
    num_variables: usize,
    num_inputs: usize,
}

impl R1cs {
    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    pub fn constraints(&self) -> &[R1csConstraint] {
        &self.constraints
    }

    /// Number of allocated variables, the constant one excluded.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Builds `z = (1, primary, auxiliary)`.
    ///
    /// # Errors
    ///
    /// Returns [`R1csError::AssignmentLength`] if the two slices do not add up to the
    /// variable layout.
    pub fn full_assignment(
        &self,
        primary: &[RingElement],
        auxiliary: &[RingElement],
    ) -> Result<Vec<RingElement>, R1csError> {
        if primary.len() != self.num_inputs {
            return Err(R1csError::AssignmentLength {
                expected: self.num_inputs,
                actual: primary.len(),
            });
        }
        let expected_aux = self.num_variables - self.num_inputs;
        if auxiliary.len() != expected_aux {
            return Err(R1csError::AssignmentLength {
                expected: expected_aux,
                actual: auxiliary.len(),
            });
        }
        let mut z = Vec::with_capacity(self.num_variables + 1);
        z.push(RingElement::one(&self.ctx));
        z.extend_from_slice(primary);
        z.extend_from_slice(auxiliary);
        Ok(z)
    }

    pub fn is_satisfied_by(&self, primary: &[RingElement], auxiliary: &[RingElement]) -> bool {
        let Ok(z) = self.full_assignment(primary, auxiliary) else {
            return false;
        };
        let zero = RingElement::zero(&self.ctx);
        self.constraints
            .iter()
            .all(|c| c.is_satisfied_by(&z, &zero))
    }
}

/// Constraint builder and assignment holder (a "protoboard").
///
/// Variables are allocated up front; the first `num_inputs` of them are public, the rest
/// private. Unassigned variables read as zero.
#[derive(Debug, Clone)]
pub struct ConstraintSystem {
    ctx: Arc<RingContext>,
    values: Vec<RingElement>,
    num_inputs: usize,
    constraints: Vec<R1csConstraint>,
}

impl ConstraintSystem {
    pub fn new(ctx: &Arc<RingContext>) -> Self {
        Self {
            ctx: ctx.clone(),
            values: Vec::new(),
            num_inputs: 0,
            constraints: Vec::new(),
        }
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    /// Allocates `n` fresh variables, all initially zero.
    pub fn allocate(&mut self, n: usize) -> Vec<Variable> {
        let start = self.values.len() + 1;
        self.values
            .extend(std::iter::repeat_with(|| RingElement::zero(&self.ctx)).take(n));
        debug!(count = n, total = self.values.len(), "allocated variables");
        (start..start + n).map(Variable::new).collect()
    }

    pub fn set_public_input_count(&mut self, k: usize) -> Result<(), R1csError> {
        if k > self.values.len() {
            return Err(R1csError::InvalidInputCount {
                requested: k,
                available: self.values.len(),
            });
        }
        self.num_inputs = k;
        Ok(())
    }

    fn check(&self, variable: Variable) -> Result<(), R1csError> {
        if variable.index() > self.values.len() {
            return Err(R1csError::VariableOutOfRange {
                index: variable.index(),
                size: self.values.len() + 1,
            });
        }
        Ok(())
    }

    /// Records `a · b = c`.
    ///
    /// # Errors
    ///
    /// Returns [`R1csError::VariableOutOfRange`] if any term names an unallocated variable.
    pub fn add_constraint(
        &mut self,
        a: impl Into<LinearCombination>,
        b: impl Into<LinearCombination>,
        c: impl Into<LinearCombination>,
    ) -> Result<(), R1csError> {
        let constraint = R1csConstraint {
            a: a.into(),
            b: b.into(),
            c: c.into(),
        };
        for v in constraint
            .a
            .variables()
            .chain(constraint.b.variables())
            .chain(constraint.c.variables())
        {
            self.check(v)?;
        }
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn assign(&mut self, variable: Variable, value: RingElement) -> Result<(), R1csError> {
        if variable == Variable::ONE {
            return Err(R1csError::ConstantVariable);
        }
        self.check(variable)?;
        self.values[variable.index() - 1] = value;
        Ok(())
    }

    pub fn value(&self, variable: Variable) -> Result<RingElement, R1csError> {
        if variable == Variable::ONE {
            return Ok(RingElement::one(&self.ctx));
        }
        self.check(variable)?;
        Ok(self.values[variable.index() - 1].clone())
    }

    /// Mutable access to an assigned value.
    pub fn value_mut(&mut self, variable: Variable) -> Result<&mut RingElement, R1csError> {
        if variable == Variable::ONE {
            return Err(R1csError::ConstantVariable);
        }
        self.check(variable)?;
        Ok(&mut self.values[variable.index() - 1])
    }

    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[R1csConstraint] {
        &self.constraints
    }

    pub fn primary_input(&self) -> Vec<RingElement> {
        self.values[..self.num_inputs].to_vec()
    }

    pub fn auxiliary_input(&self) -> Vec<RingElement> {
        self.values[self.num_inputs..].to_vec()
    }

    pub fn is_satisfied(&self) -> bool {
        let mut z = Vec::with_capacity(self.values.len() + 1);
        z.push(RingElement::one(&self.ctx));
        z.extend_from_slice(&self.values);
        let zero = RingElement::zero(&self.ctx);
        for (i, c) in self.constraints.iter().enumerate() {
            if !c.is_satisfied_by(&z, &zero) {
                warn!(constraint = i, "constraint not satisfied: {c}");
                return false;
            }
        }
        true
    }

    pub fn r1cs(&self) -> R1cs {
        R1cs {
            ctx: self.ctx.clone(),
            constraints: self.constraints.clone(),
            num_variables: self.values.len(),
            num_inputs: self.num_inputs,
        }
    }
}
