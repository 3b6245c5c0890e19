// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Randomness for ring elements.
//!
//! The rejection samplers loop without an iteration cap: non-invertible and zero elements
//! are a negligible fraction of the ring for the prime sizes in use.

use crate::context::RingContext;
use crate::element::RingElement;
use rand::{CryptoRng, Rng, RngCore};
use std::sync::Arc;
use tracing::trace;
use zkhe_polynomial::{Representation, RnsPolynomial};

impl RingElement {
    /// Uniform element of the whole ring, in coefficient form.
    pub fn random_element<R: RngCore + CryptoRng>(ctx: &Arc<RingContext>, rng: &mut R) -> Self {
        let p = RnsPolynomial::from_fn(ctx.chain(), Representation::Coefficient, |q| {
            rng.gen_range(0..q)
        });
        RingElement::from_polynomial(ctx, p)
    }

    /// Uniform invertible element, returned in evaluation form.
    pub fn random_invertible_element<R: RngCore + CryptoRng>(
        ctx: &Arc<RingContext>,
        rng: &mut R,
    ) -> Self {
        let mut attempts = 0usize;
        loop {
            attempts += 1;
            let mut e = Self::random_element(ctx, rng);
            e.to_evaluation_form();
            if e.is_invertible() {
                trace!(attempts, "sampled invertible ring element");
                return e;
            }
        }
    }

    pub fn random_nonzero_element<R: RngCore + CryptoRng>(
        ctx: &Arc<RingContext>,
        rng: &mut R,
    ) -> Self {
        loop {
            let e = Self::random_element(ctx, rng);
            if !e.is_zero() {
                return e;
            }
        }
    }

    /// Scalar drawn from `[0, min q_i)`.
    ///
    /// The difference of two distinct such scalars is a unit in every residue field.
    pub fn random_exceptional_element<R: RngCore + CryptoRng>(
        ctx: &Arc<RingContext>,
        rng: &mut R,
    ) -> Self {
        let bound = ctx.chain().min_modulus();
        RingElement::scalar(ctx, rng.gen_range(0..bound))
    }
}
