// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Circuits evaluated over homomorphic ciphertexts and mirrored into a rank-1 constraint
//! system over the proof ring.
//!
//! A [`Circuit`] is driven through [`CircuitStage`]s: the instruction stream is first
//! turned into constraints, then replayed over ciphertexts and ring embeddings, and the
//! resulting assignment is proved with any [`ProofSystem`](zkhe_zk_prover::ProofSystem).

mod arena;
mod circuit;
mod errors;
mod inputs;
mod instruction;
mod interpreter;
mod ir;
mod track;

pub use arena::Arena;
pub use circuit::{Circuit, CircuitResults, CircuitStage};
pub use errors::{CircuitError, MalformedReason};
pub use inputs::{InputPool, Variables, NEG_ONE_REGISTER, ONE_REGISTER};
pub use instruction::Instruction;
pub use interpreter::{Evaluation, Interpreter};
pub use ir::Program;
pub use track::{CiphertextTrack, NoisePolicy, RingTrack, StructuralTrack, Track};
