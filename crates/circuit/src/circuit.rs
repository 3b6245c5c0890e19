// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::arena::Arena;
use crate::errors::CircuitError;
use crate::inputs::{InputPool, Variables};
use crate::instruction::Instruction;
use crate::interpreter::Interpreter;
use crate::track::{CiphertextTrack, NoisePolicy, RingTrack, StructuralTrack};
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use zkhe_fhe::CiphertextAlgebra;
use zkhe_r1cs::{ConstraintSystem, Variable};
use zkhe_ring::{RingContext, RingElement};
use zkhe_zk_prover::ProofSystem;

/// Lifecycle of a [`Circuit`]. Stages are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CircuitStage {
    Uninitialized,
    StructurallyBuilt,
    Executed,
    Proved,
    Verified,
}

impl CircuitStage {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::StructurallyBuilt => "StructurallyBuilt",
            Self::Executed => "Executed",
            Self::Proved => "Proved",
            Self::Verified => "Verified",
        }
    }
}

impl fmt::Display for CircuitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variant_name())
    }
}

/// What a verified circuit computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitResults {
    pub output_index: usize,
    pub satisfied: bool,
    /// Decrypted constant coefficient of the output ciphertext.
    pub value: i64,
    pub noise_budget: usize,
}

/// A circuit evaluated over ciphertexts and, in lockstep, over the proof ring.
///
/// Register `i` of the circuit is backed by a ciphertext, its ring value and the
/// constraint-system variable `i + 1`. Every register but the last is a public input.
pub struct Circuit<A: CiphertextAlgebra> {
    algebra: A,
    ctx: Arc<RingContext>,
    policy: NoisePolicy,
    stage: CircuitStage,
    instructions: Vec<Instruction>,
    pool: InputPool<A::Ciphertext>,
    cs: ConstraintSystem,
    vars: Vec<Variable>,
    ciphertexts: Option<Arena<A::Ciphertext>>,
    ring_values: Option<Arena<RingElement>>,
    output: Option<usize>,
}

impl<A: CiphertextAlgebra> Circuit<A> {
    pub fn new(algebra: A, ctx: &Arc<RingContext>, policy: NoisePolicy) -> Self {
        Self {
            algebra,
            ctx: ctx.clone(),
            policy,
            stage: CircuitStage::Uninitialized,
            instructions: Vec::new(),
            pool: InputPool::new(),
            cs: ConstraintSystem::new(ctx),
            vars: Vec::new(),
            ciphertexts: None,
            ring_values: None,
            output: None,
        }
    }

    pub fn stage(&self) -> CircuitStage {
        self.stage
    }

    pub fn algebra(&self) -> &A {
        &self.algebra
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    pub fn policy(&self) -> NoisePolicy {
        self.policy
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// `|instructions| + |inputs|`, fixed once the circuit is built.
    pub fn size(&self) -> usize {
        self.vars.len()
    }

    fn require_exactly(&self, expected: CircuitStage) -> Result<(), CircuitError> {
        if self.stage != expected {
            return Err(CircuitError::NotReady {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    fn require_at_least(&self, expected: CircuitStage) -> Result<(), CircuitError> {
        if self.stage < expected {
            return Err(CircuitError::NotReady {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    /// Allocates the register file and records one constraint per arithmetic
    /// instruction. Nothing is kept if any instruction is malformed.
    #[instrument(skip_all)]
    pub fn create_circuit(
        &mut self,
        instructions: Vec<Instruction>,
        pool: InputPool<A::Ciphertext>,
    ) -> Result<(), CircuitError> {
        self.require_exactly(CircuitStage::Uninitialized)?;

        let size = instructions.len() + pool.size();
        let mut cs = ConstraintSystem::new(&self.ctx);
        let vars = cs.allocate(size);
        cs.set_public_input_count(size.saturating_sub(1))?;
        Interpreter::new(&instructions, size).run(&mut StructuralTrack::new(&mut cs, &vars))?;

        info!(
            registers = size,
            constraints = cs.num_constraints(),
            inputs = pool.len(),
            "created circuit"
        );
        self.cs = cs;
        self.vars = vars;
        self.instructions = instructions;
        self.pool = pool;
        self.stage = CircuitStage::StructurallyBuilt;
        Ok(())
    }

    /// Replays the instructions over ciphertexts and over the proof ring, then assigns
    /// every register's ring value to its variable.
    #[instrument(skip_all)]
    pub fn execute(&mut self, variables: &Variables<A::Ciphertext>) -> Result<(), CircuitError> {
        self.require_exactly(CircuitStage::StructurallyBuilt)?;
        let interpreter = Interpreter::new(&self.instructions, self.vars.len());

        let ciphertexts = interpreter.run(&mut CiphertextTrack::new(
            &self.algebra,
            &self.pool,
            variables,
            self.policy,
        ))?;
        let ring = interpreter.run(&mut RingTrack::new(
            &self.algebra,
            &self.ctx,
            &self.pool,
            variables,
        ))?;

        let zero = self.ctx.zero();
        for (i, var) in self.vars.iter().enumerate() {
            let value = ring.registers.value(i).unwrap_or(&zero).clone();
            self.cs.assign(*var, value)?;
        }

        info!(output = ?ring.output, "executed circuit");
        self.output = ring.output;
        self.ciphertexts = Some(ciphertexts.registers);
        self.ring_values = Some(ring.registers);
        self.stage = CircuitStage::Executed;
        Ok(())
    }

    #[instrument(skip_all)]
    pub fn generate_keys<P, R>(
        &self,
        system: &P,
        rng: &mut R,
    ) -> Result<(P::ProvingKey, P::VerificationKey), CircuitError>
    where
        P: ProofSystem,
        R: RngCore + CryptoRng,
    {
        self.require_at_least(CircuitStage::StructurallyBuilt)?;
        Ok(system.generate_keys(&self.cs.r1cs(), rng)?)
    }

    /// Proves the current assignment. May be called again after tampering.
    #[instrument(skip_all)]
    pub fn prove<P, R>(
        &mut self,
        system: &P,
        pk: &P::ProvingKey,
        rng: &mut R,
    ) -> Result<P::Proof, CircuitError>
    where
        P: ProofSystem,
        R: RngCore + CryptoRng,
    {
        self.require_at_least(CircuitStage::Executed)?;
        let proof = system.prove(pk, &self.primary_input(), &self.auxiliary_input(), rng)?;
        self.stage = CircuitStage::Proved;
        Ok(proof)
    }

    /// Checks `proof` against the current public inputs.
    #[instrument(skip_all)]
    pub fn verify<P>(
        &mut self,
        system: &P,
        vk: &P::VerificationKey,
        proof: &P::Proof,
    ) -> Result<bool, CircuitError>
    where
        P: ProofSystem,
    {
        self.require_at_least(CircuitStage::Proved)?;
        let verified = system.verify(vk, &self.primary_input(), proof)?;
        if verified {
            self.stage = CircuitStage::Verified;
        } else {
            warn!("proof rejected");
            self.stage = CircuitStage::Proved;
        }
        info!(verified, "verification finished");
        Ok(verified)
    }

    pub fn results(&self) -> Result<CircuitResults, CircuitError> {
        self.require_exactly(CircuitStage::Verified)?;
        let output_index = self.output.ok_or(CircuitError::NoOutput)?;
        let ct = self.ciphertext(output_index).ok_or(CircuitError::NoOutput)?;
        Ok(CircuitResults {
            output_index,
            satisfied: self.cs.is_satisfied(),
            value: self.algebra.decrypt_value(ct)?,
            noise_budget: self.algebra.noise_budget(ct)?,
        })
    }

    /// Logs the listing at info level.
    pub fn print_circuit(&self) {
        for (position, instruction) in self.instructions.iter().enumerate() {
            info!(position, "{instruction}");
        }
    }

    pub fn output_index(&self) -> Option<usize> {
        self.output
    }

    pub fn ciphertext(&self, index: usize) -> Option<&A::Ciphertext> {
        self.ciphertexts.as_ref()?.value(index)
    }

    pub fn ring_value(&self, index: usize) -> Option<&RingElement> {
        self.ring_values.as_ref()?.value(index)
    }

    /// Variable backing register `index`.
    pub fn variable(&self, index: usize) -> Option<Variable> {
        self.vars.get(index).copied()
    }

    pub fn constraint_system(&self) -> &ConstraintSystem {
        &self.cs
    }

    pub fn constraint_system_mut(&mut self) -> &mut ConstraintSystem {
        &mut self.cs
    }

    pub fn primary_input(&self) -> Vec<RingElement> {
        self.cs.primary_input()
    }

    pub fn auxiliary_input(&self) -> Vec<RingElement> {
        self.cs.auxiliary_input()
    }
}

impl<A: CiphertextAlgebra> fmt::Display for Circuit<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}
