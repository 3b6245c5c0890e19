// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Ring elements of the zkhe proof ring.
//!
//! A [`RingElement`] is either a scalar of `Z_Q` or an [`RnsPolynomial`] of
//! `Z_Q[X]/(X^N + 1)`, always paired with the [`RingContext`] it was built from.
//! Contexts are passed explicitly; [`ContextSlot`] provides set-once storage for owners
//! that need to publish one.
//!
//! [`RnsPolynomial`]: zkhe_polynomial::RnsPolynomial

mod context;
mod element;
mod errors;
mod sampling;

pub use context::{ContextSlot, RingContext};
pub use element::{RingElement, RingValue};
pub use errors::RingError;
