// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! # RNS Polynomial Library
//!
//! Polynomials over `Z_Q[X]/(X^N + 1)` held in residue number system form, used as the
//! proof ring of the zkhe constraint system.
//!
//! ## Features
//!
//! - Modulus chains: validated NTT-friendly primes and a power-of-two degree.
//! - Negacyclic NTT: per-modulus tables computed once per chain and shared read-only.
//! - Arithmetic: row-wise modular add, subtract, negate, scalar ops, pointwise multiply and
//!   per-slot inversion, parallelised across moduli with `rayon`.
//! - Serialization: a JSON document with `degree`, `ntt`, `moduli` and `coefficients`.
//!
//! ## Mathematical Background
//!
//! With `Q = q_1 ⋯ q_k`, the Chinese Remainder Theorem gives
//! `Z_Q[X]/(X^N+1) ≅ ∏ Z_{q_i}[X]/(X^N+1)`, so every operation is applied independently to
//! each residue row. When `q_i ≡ 1 (mod 2N)` the NTT further splits each row into `N` copies
//! of `Z_{q_i}`, where multiplication and inversion act slot by slot.

pub mod chain;
pub mod errors;
pub mod ntt;
pub mod rns_polynomial;
pub mod serialization;
pub mod utils;

pub use chain::{ModulusChain, MAX_MODULUS_BITS};
pub use errors::PolynomialError;
pub use ntt::{NttTable, NttTables};
pub use rns_polynomial::{Representation, RnsPolynomial};
pub use utils::*;
