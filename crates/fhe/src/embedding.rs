// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Embedding of ciphertexts into the proof ring.

use crate::algebra::CiphertextAlgebra;
use std::sync::Arc;
use zkhe_polynomial::RnsPolynomial;
use zkhe_ring::{RingContext, RingElement};

/// Reads the ciphertext's coefficient stream as an integer polynomial, reduces it into
/// `Z_Q[X]/(X^N + 1)` and returns it in evaluation form.
pub fn embed_ciphertext<A: CiphertextAlgebra>(
    algebra: &A,
    ciphertext: &A::Ciphertext,
    ctx: &Arc<RingContext>,
) -> RingElement {
    let stream = algebra.ring_embedding(ciphertext);
    let mut p = RnsPolynomial::from_negacyclic_stream(ctx.chain(), &stream);
    p.ntt_inplace(ctx.tables());
    RingElement::from_polynomial(ctx, p)
}
