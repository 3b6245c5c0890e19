// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Zero-knowledge proofs for rank-1 constraint systems over the proof ring.

mod encoding;
mod error;
pub mod qrp;
mod rinocchio;
mod traits;

pub use encoding::{BfvEncoded, BfvEncoding, BfvEncodingKey};
pub use error::ZkError;
pub use qrp::Qrp;
pub use rinocchio::{Proof, ProvingKey, Rinocchio, Shifted, VerificationKey};
pub use traits::{LinearEncoding, ProofSystem};

/// Rinocchio over BFV-encoded ring elements.
pub type BfvRinocchio = Rinocchio<BfvEncoding>;
