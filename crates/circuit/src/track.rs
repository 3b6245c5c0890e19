// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! The value domains an instruction stream is evaluated over.

use crate::errors::{CircuitError, MalformedReason};
use crate::inputs::{InputPool, Variables};
use std::sync::Arc;
use tracing::trace;
use zkhe_fhe::{embed_ciphertext, CiphertextAlgebra};
use zkhe_r1cs::{ConstraintSystem, Variable};
use zkhe_ring::{RingContext, RingElement};

/// One interpretation of the circuit's instructions.
///
/// Arithmetic methods receive resolved operand values and the result register, and return
/// the value to store there. `Add` and `Subtract` carry the `one` operand and `Negate` the
/// `neg_one` operand so every track can mirror the constraint shape.
pub trait Track {
    type Value: Clone;

    fn name(&self) -> &'static str;

    /// Values loaded before the first instruction.
    fn inputs(&mut self) -> Result<Vec<(usize, Self::Value)>, CircuitError> {
        Ok(Vec::new())
    }

    /// `None` keeps the register's current contents.
    fn define_constant(
        &mut self,
        position: usize,
        index: usize,
    ) -> Result<Option<Self::Value>, CircuitError>;

    fn define_variable(
        &mut self,
        position: usize,
        name: char,
        index: usize,
    ) -> Result<Option<Self::Value>, CircuitError>;

    fn multiply(
        &mut self,
        a: &Self::Value,
        b: &Self::Value,
        result: usize,
    ) -> Result<Self::Value, CircuitError>;

    fn add(
        &mut self,
        a: &Self::Value,
        b: &Self::Value,
        one: &Self::Value,
        result: usize,
    ) -> Result<Self::Value, CircuitError>;

    fn subtract(
        &mut self,
        a: &Self::Value,
        b: &Self::Value,
        one: &Self::Value,
        result: usize,
    ) -> Result<Self::Value, CircuitError>;

    fn negate(
        &mut self,
        a: &Self::Value,
        neg_one: &Self::Value,
        result: usize,
    ) -> Result<Self::Value, CircuitError>;
}

/// Emits one rank-1 constraint per arithmetic instruction. Register `i` is variable
/// `i + 1`; no values are involved.
pub struct StructuralTrack<'a> {
    cs: &'a mut ConstraintSystem,
    vars: &'a [Variable],
}

impl<'a> StructuralTrack<'a> {
    pub fn new(cs: &'a mut ConstraintSystem, vars: &'a [Variable]) -> Self {
        Self { cs, vars }
    }
}

impl Track for StructuralTrack<'_> {
    type Value = Variable;

    fn name(&self) -> &'static str {
        "structure"
    }

    fn inputs(&mut self) -> Result<Vec<(usize, Variable)>, CircuitError> {
        Ok(self.vars.iter().copied().enumerate().collect())
    }

    fn define_constant(&mut self, _: usize, _: usize) -> Result<Option<Variable>, CircuitError> {
        Ok(None)
    }

    fn define_variable(
        &mut self,
        _: usize,
        _: char,
        _: usize,
    ) -> Result<Option<Variable>, CircuitError> {
        Ok(None)
    }

    fn multiply(&mut self, a: &Variable, b: &Variable, result: usize) -> Result<Variable, CircuitError> {
        let r = self.vars[result];
        self.cs.add_constraint(*a, *b, r)?;
        Ok(r)
    }

    fn add(
        &mut self,
        a: &Variable,
        b: &Variable,
        one: &Variable,
        result: usize,
    ) -> Result<Variable, CircuitError> {
        let r = self.vars[result];
        self.cs.add_constraint(*a + *b, *one, r)?;
        Ok(r)
    }

    fn subtract(
        &mut self,
        a: &Variable,
        b: &Variable,
        one: &Variable,
        result: usize,
    ) -> Result<Variable, CircuitError> {
        let r = self.vars[result];
        self.cs.add_constraint(*a - *b, *one, r)?;
        Ok(r)
    }

    fn negate(
        &mut self,
        a: &Variable,
        neg_one: &Variable,
        result: usize,
    ) -> Result<Variable, CircuitError> {
        let r = self.vars[result];
        self.cs.add_constraint(*a, *neg_one, r)?;
        Ok(r)
    }
}

/// How the ciphertext track manages noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoisePolicy {
    /// Relinearize after every multiplication.
    pub relinearize: bool,
    /// Fail once a product's remaining noise budget drops below this many bits.
    pub min_budget_bits: Option<usize>,
}

impl Default for NoisePolicy {
    fn default() -> Self {
        Self {
            relinearize: true,
            min_budget_bits: None,
        }
    }
}

fn lookup_constant<'c, C>(
    pool: &'c InputPool<C>,
    position: usize,
    index: usize,
) -> Result<&'c C, CircuitError> {
    pool.get(index)
        .ok_or_else(|| CircuitError::malformed(position, MalformedReason::MissingConstant(index)))
}

fn lookup_variable<'c, C>(
    variables: &'c Variables<C>,
    position: usize,
    name: char,
) -> Result<&'c C, CircuitError> {
    variables
        .get(&name)
        .ok_or_else(|| CircuitError::malformed(position, MalformedReason::UnknownVariable(name)))
}

/// Homomorphic evaluation.
pub struct CiphertextTrack<'a, A: CiphertextAlgebra> {
    algebra: &'a A,
    pool: &'a InputPool<A::Ciphertext>,
    variables: &'a Variables<A::Ciphertext>,
    policy: NoisePolicy,
}

impl<'a, A: CiphertextAlgebra> CiphertextTrack<'a, A> {
    pub fn new(
        algebra: &'a A,
        pool: &'a InputPool<A::Ciphertext>,
        variables: &'a Variables<A::Ciphertext>,
        policy: NoisePolicy,
    ) -> Self {
        Self {
            algebra,
            pool,
            variables,
            policy,
        }
    }
}

impl<A: CiphertextAlgebra> Track for CiphertextTrack<'_, A> {
    type Value = A::Ciphertext;

    fn name(&self) -> &'static str {
        "ciphertext"
    }

    fn inputs(&mut self) -> Result<Vec<(usize, A::Ciphertext)>, CircuitError> {
        Ok(self.pool.iter().map(|(i, c)| (i, c.clone())).collect())
    }

    fn define_constant(
        &mut self,
        position: usize,
        index: usize,
    ) -> Result<Option<A::Ciphertext>, CircuitError> {
        Ok(Some(lookup_constant(self.pool, position, index)?.clone()))
    }

    fn define_variable(
        &mut self,
        position: usize,
        name: char,
        _: usize,
    ) -> Result<Option<A::Ciphertext>, CircuitError> {
        Ok(Some(lookup_variable(self.variables, position, name)?.clone()))
    }

    fn multiply(
        &mut self,
        a: &A::Ciphertext,
        b: &A::Ciphertext,
        result: usize,
    ) -> Result<A::Ciphertext, CircuitError> {
        let mut product = self.algebra.multiply(a, b)?;
        if self.policy.relinearize {
            self.algebra.relinearize_inplace(&mut product)?;
        }
        if let Some(required) = self.policy.min_budget_bits {
            let remaining = self.algebra.noise_budget(&product)?;
            trace!(register = result, remaining, "noise budget after multiplication");
            if remaining < required {
                return Err(CircuitError::NoiseBudgetExhausted {
                    index: result,
                    remaining,
                    required,
                });
            }
        }
        Ok(product)
    }

    fn add(
        &mut self,
        a: &A::Ciphertext,
        b: &A::Ciphertext,
        _: &A::Ciphertext,
        _: usize,
    ) -> Result<A::Ciphertext, CircuitError> {
        Ok(self.algebra.add(a, b)?)
    }

    fn subtract(
        &mut self,
        a: &A::Ciphertext,
        b: &A::Ciphertext,
        _: &A::Ciphertext,
        _: usize,
    ) -> Result<A::Ciphertext, CircuitError> {
        Ok(self.algebra.subtract(a, b)?)
    }

    fn negate(
        &mut self,
        a: &A::Ciphertext,
        _: &A::Ciphertext,
        _: usize,
    ) -> Result<A::Ciphertext, CircuitError> {
        Ok(self.algebra.negate(a)?)
    }
}

/// The proof-ring shadow of the computation.
///
/// Inputs are ciphertext embeddings in evaluation form; results follow the constraint
/// shapes exactly, so `(a + b) · one` rather than `a + b`.
pub struct RingTrack<'a, A: CiphertextAlgebra> {
    algebra: &'a A,
    ctx: &'a Arc<RingContext>,
    pool: &'a InputPool<A::Ciphertext>,
    variables: &'a Variables<A::Ciphertext>,
}

impl<'a, A: CiphertextAlgebra> RingTrack<'a, A> {
    pub fn new(
        algebra: &'a A,
        ctx: &'a Arc<RingContext>,
        pool: &'a InputPool<A::Ciphertext>,
        variables: &'a Variables<A::Ciphertext>,
    ) -> Self {
        Self {
            algebra,
            ctx,
            pool,
            variables,
        }
    }

    fn embed(&self, ciphertext: &A::Ciphertext) -> RingElement {
        embed_ciphertext(self.algebra, ciphertext, self.ctx)
    }
}

impl<A: CiphertextAlgebra> Track for RingTrack<'_, A> {
    type Value = RingElement;

    fn name(&self) -> &'static str {
        "ring"
    }

    fn inputs(&mut self) -> Result<Vec<(usize, RingElement)>, CircuitError> {
        Ok(self.pool.iter().map(|(i, c)| (i, self.embed(c))).collect())
    }

    fn define_constant(
        &mut self,
        position: usize,
        index: usize,
    ) -> Result<Option<RingElement>, CircuitError> {
        let ct = lookup_constant(self.pool, position, index)?;
        Ok(Some(self.embed(ct)))
    }

    fn define_variable(
        &mut self,
        position: usize,
        name: char,
        _: usize,
    ) -> Result<Option<RingElement>, CircuitError> {
        let ct = lookup_variable(self.variables, position, name)?;
        Ok(Some(self.embed(ct)))
    }

    fn multiply(&mut self, a: &RingElement, b: &RingElement, _: usize) -> Result<RingElement, CircuitError> {
        Ok(a * b)
    }

    fn add(
        &mut self,
        a: &RingElement,
        b: &RingElement,
        one: &RingElement,
        _: usize,
    ) -> Result<RingElement, CircuitError> {
        Ok(&(a + b) * one)
    }

    fn subtract(
        &mut self,
        a: &RingElement,
        b: &RingElement,
        one: &RingElement,
        _: usize,
    ) -> Result<RingElement, CircuitError> {
        Ok(&(a - b) * one)
    }

    fn negate(
        &mut self,
        a: &RingElement,
        neg_one: &RingElement,
        _: usize,
    ) -> Result<RingElement, CircuitError> {
        Ok(a * neg_one)
    }
}
