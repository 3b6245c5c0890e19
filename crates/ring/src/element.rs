// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::RingContext;
use crate::errors::RingError;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::sync::Arc;
use zkhe_polynomial::{Representation, RnsPolynomial};

/// The two shapes a ring element can take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RingValue {
    /// An element of `Z_Q`, canonical (`< Q`) when `Q` fits in a `u64`.
    Scalar(u64),
    Polynomial(RnsPolynomial),
}

/// A value of the proof ring: either a bare scalar or an [`RnsPolynomial`].
///
/// Scalars are promoted to constant polynomials whenever they meet a polynomial operand or
/// when exact scalar arithmetic would leave `u64`. A polynomial never collapses back
/// to a scalar. Products of two polynomials require both in evaluation form.
#[derive(Clone)]
pub struct RingElement {
    ctx: Arc<RingContext>,
    value: RingValue,
}

impl RingElement {
    pub fn zero(ctx: &Arc<RingContext>) -> Self {
        Self::scalar(ctx, 0)
    }

    pub fn one(ctx: &Arc<RingContext>) -> Self {
        Self::scalar(ctx, 1)
    }

    /// A scalar, reduced modulo `Q` when `Q` fits in a `u64`.
    pub fn scalar(ctx: &Arc<RingContext>, value: u64) -> Self {
        let value = match ctx.characteristic() {
            Some(q) => value % q,
            None => value,
        };
        Self {
            ctx: ctx.clone(),
            value: RingValue::Scalar(value),
        }
    }

    /// The image of a signed integer.
    pub fn from_i64(ctx: &Arc<RingContext>, value: i64) -> Self {
        let mut e = Self::scalar(ctx, value.unsigned_abs());
        if value < 0 {
            e.negate_inplace();
        }
        e
    }

    /// # Panics
    ///
    /// Panics if the polynomial does not use the context's modulus chain.
    pub fn from_polynomial(ctx: &Arc<RingContext>, polynomial: RnsPolynomial) -> Self {
        assert!(
            **polynomial.chain() == **ctx.chain(),
            "polynomial does not belong to this ring context"
        );
        Self {
            ctx: ctx.clone(),
            value: RingValue::Polynomial(polynomial),
        }
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    pub fn value(&self) -> &RingValue {
        &self.value
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.value, RingValue::Scalar(_))
    }

    pub fn is_poly(&self) -> bool {
        matches!(self.value, RingValue::Polynomial(_))
    }

    pub fn as_scalar(&self) -> Option<u64> {
        match self.value {
            RingValue::Scalar(s) => Some(s),
            RingValue::Polynomial(_) => None,
        }
    }

    pub fn as_polynomial(&self) -> Option<&RnsPolynomial> {
        match &self.value {
            RingValue::Polynomial(p) => Some(p),
            RingValue::Scalar(_) => None,
        }
    }

    pub fn into_polynomial(mut self) -> RnsPolynomial {
        self.to_poly_inplace();
        match self.value {
            RingValue::Polynomial(p) => p,
            RingValue::Scalar(_) => unreachable!("to_poly_inplace always yields a polynomial"),
        }
    }

    fn constant(&self, c: u64, representation: Representation) -> RnsPolynomial {
        RnsPolynomial::constant(self.ctx.chain(), c, representation)
    }

    /// Promotes a scalar to its constant polynomial in evaluation form.
    pub fn to_poly_inplace(&mut self) {
        if let RingValue::Scalar(c) = self.value {
            self.value = RingValue::Polynomial(self.constant(c, Representation::Evaluation));
        }
    }

    /// Moves a coefficient-form polynomial into evaluation form. Scalars are left untouched.
    pub fn to_evaluation_form(&mut self) {
        if let RingValue::Polynomial(p) = &mut self.value {
            if !p.is_ntt() {
                p.ntt_inplace(self.ctx.tables());
            }
        }
    }

    /// A copy in evaluation form, promoting scalars.
    fn evaluation_polynomial(&self) -> RnsPolynomial {
        let mut e = self.clone();
        e.to_poly_inplace();
        e.to_evaluation_form();
        e.into_polynomial()
    }

    fn assert_same_ring(&self, other: &Self) {
        assert!(
            Arc::ptr_eq(&self.ctx, &other.ctx) || **self.ctx.chain() == **other.ctx.chain(),
            "ring elements belong to different contexts"
        );
    }

    /// Replaces a scalar by its polynomial image, for results that leave exact scalar range.
    fn promoted_scalar_op(
        &mut self,
        a: u64,
        rhs: &RingValue,
        op: fn(&mut RnsPolynomial, &RnsPolynomial),
    ) {
        let mut p = self.constant(a, Representation::Evaluation);
        let q = match rhs {
            RingValue::Scalar(b) => self.constant(*b, Representation::Evaluation),
            RingValue::Polynomial(q) => q.clone(),
        };
        op(&mut p, &q);
        self.value = RingValue::Polynomial(p);
    }

    pub fn add_assign_ref(&mut self, rhs: &Self) {
        self.assert_same_ring(rhs);
        match (&mut self.value, &rhs.value) {
            (RingValue::Scalar(a), RingValue::Scalar(b)) => {
                let (a, b) = (*a, *b);
                match self.ctx.characteristic() {
                    Some(q) => {
                        self.value = RingValue::Scalar(((a as u128 + b as u128) % q as u128) as u64)
                    }
                    None => match a.checked_add(b) {
                        Some(r) => self.value = RingValue::Scalar(r),
                        None => self.promoted_scalar_op(a, &rhs.value, RnsPolynomial::add_inplace),
                    },
                }
            }
            (RingValue::Polynomial(p), RingValue::Scalar(b)) => p.add_scalar_inplace(*b),
            (RingValue::Scalar(a), RingValue::Polynomial(q)) => {
                let mut p = q.clone();
                p.add_scalar_inplace(*a);
                self.value = RingValue::Polynomial(p);
            }
            (RingValue::Polynomial(p), RingValue::Polynomial(q)) => p.add_inplace(q),
        }
    }

    pub fn sub_assign_ref(&mut self, rhs: &Self) {
        self.assert_same_ring(rhs);
        match (&mut self.value, &rhs.value) {
            (RingValue::Scalar(a), RingValue::Scalar(b)) => {
                let (a, b) = (*a, *b);
                match self.ctx.characteristic() {
                    Some(q) => {
                        self.value = RingValue::Scalar(
                            ((a as u128 + q as u128 - b as u128) % q as u128) as u64,
                        )
                    }
                    None if a >= b => self.value = RingValue::Scalar(a - b),
                    None => self.promoted_scalar_op(a, &rhs.value, RnsPolynomial::subtract_inplace),
                }
            }
            (RingValue::Polynomial(p), RingValue::Scalar(b)) => p.subtract_scalar_inplace(*b),
            (RingValue::Scalar(a), RingValue::Polynomial(q)) => {
                let mut p = q.clone();
                p.negate_inplace();
                p.add_scalar_inplace(*a);
                self.value = RingValue::Polynomial(p);
            }
            (RingValue::Polynomial(p), RingValue::Polynomial(q)) => p.subtract_inplace(q),
        }
    }

    /// # Panics
    ///
    /// Panics when two polynomial operands are not both in evaluation form.
    pub fn mul_assign_ref(&mut self, rhs: &Self) {
        self.assert_same_ring(rhs);
        match (&mut self.value, &rhs.value) {
            (RingValue::Scalar(a), RingValue::Scalar(b)) => {
                let (a, b) = (*a, *b);
                match self.ctx.characteristic() {
                    Some(q) => {
                        self.value = RingValue::Scalar(((a as u128 * b as u128) % q as u128) as u64)
                    }
                    None => match a.checked_mul(b) {
                        Some(r) => self.value = RingValue::Scalar(r),
                        None => {
                            self.promoted_scalar_op(a, &rhs.value, RnsPolynomial::multiply_inplace)
                        }
                    },
                }
            }
            (RingValue::Polynomial(p), RingValue::Scalar(b)) => p.multiply_scalar_inplace(*b),
            (RingValue::Scalar(a), RingValue::Polynomial(q)) => {
                let mut p = q.clone();
                p.multiply_scalar_inplace(*a);
                self.value = RingValue::Polynomial(p);
            }
            (RingValue::Polynomial(p), RingValue::Polynomial(q)) => p.multiply_inplace(q),
        }
    }

    pub fn negate_inplace(&mut self) {
        match (&mut self.value, self.ctx.characteristic()) {
            (RingValue::Scalar(0), _) => {}
            (RingValue::Scalar(a), Some(q)) => *a = q - *a,
            (RingValue::Scalar(a), None) => {
                let mut p =
                    RnsPolynomial::constant(self.ctx.chain(), *a, Representation::Evaluation);
                p.negate_inplace();
                self.value = RingValue::Polynomial(p);
            }
            (RingValue::Polynomial(p), _) => p.negate_inplace(),
        }
    }

    /// Multiplicative inverse, always returned as a polynomial in evaluation form
    /// (or the scalar `1` for `1`).
    ///
    /// # Errors
    ///
    /// Returns [`RingError::NotInvertible`] if any RNS slot has no inverse.
    pub fn inverse(&self) -> Result<Self, RingError> {
        match self.value {
            RingValue::Scalar(0) => return Err(RingError::NotInvertible),
            RingValue::Scalar(1) => return Ok(self.clone()),
            _ => {}
        }
        let mut p = self.evaluation_polynomial();
        if !p.invert_inplace() {
            return Err(RingError::NotInvertible);
        }
        Ok(Self {
            ctx: self.ctx.clone(),
            value: RingValue::Polynomial(p),
        })
    }

    pub fn is_invertible(&self) -> bool {
        match self.value {
            RingValue::Scalar(s) => self.ctx.chain().values().iter().all(|&q| s % q != 0),
            RingValue::Polynomial(_) => self.evaluation_polynomial().all_slots_nonzero(),
        }
    }

    /// `self /= rhs`, i.e. `self *= rhs.inverse()`.
    ///
    /// A coefficient-form dividend is moved into evaluation form first.
    pub fn try_div_assign(&mut self, rhs: &Self) -> Result<(), RingError> {
        let inv = rhs.inverse()?;
        if inv.is_poly() {
            self.to_evaluation_form();
        }
        self.mul_assign_ref(&inv);
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        match &self.value {
            RingValue::Scalar(s) => *s == 0,
            RingValue::Polynomial(p) => p.is_zero(),
        }
    }

    pub fn is_one(&self) -> bool {
        *self == Self::one(&self.ctx)
    }

    /// Size of the element's representation.
    pub fn size_in_bits(&self) -> usize {
        match &self.value {
            RingValue::Scalar(_) => u64::BITS as usize,
            RingValue::Polynomial(p) => {
                let bits: usize = p
                    .moduli()
                    .iter()
                    .map(|q| (u64::BITS - q.leading_zeros()) as usize)
                    .sum();
                p.coeff_count() * bits
            }
        }
    }
}

impl PartialEq for RingElement {
    fn eq(&self, other: &Self) -> bool {
        if let (RingValue::Scalar(a), RingValue::Scalar(b)) = (&self.value, &other.value) {
            return a == b;
        }
        if **self.ctx.chain() != **other.ctx.chain() {
            return false;
        }
        self.evaluation_polynomial()
            .is_equal(&other.evaluation_polynomial())
    }
}

impl fmt::Debug for RingElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            RingValue::Scalar(s) => write!(f, "RingElement::Scalar({s})"),
            RingValue::Polynomial(p) => write!(f, "RingElement::Polynomial({p:?})"),
        }
    }
}

impl AddAssign<&RingElement> for RingElement {
    fn add_assign(&mut self, rhs: &RingElement) {
        self.add_assign_ref(rhs);
    }
}

impl SubAssign<&RingElement> for RingElement {
    fn sub_assign(&mut self, rhs: &RingElement) {
        self.sub_assign_ref(rhs);
    }
}

impl MulAssign<&RingElement> for RingElement {
    fn mul_assign(&mut self, rhs: &RingElement) {
        self.mul_assign_ref(rhs);
    }
}

impl Add for &RingElement {
    type Output = RingElement;
    fn add(self, rhs: &RingElement) -> RingElement {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Sub for &RingElement {
    type Output = RingElement;
    fn sub(self, rhs: &RingElement) -> RingElement {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl Mul for &RingElement {
    type Output = RingElement;
    fn mul(self, rhs: &RingElement) -> RingElement {
        let mut out = self.clone();
        out *= rhs;
        out
    }
}

impl Neg for &RingElement {
    type Output = RingElement;
    fn neg(self) -> RingElement {
        let mut out = self.clone();
        out.negate_inplace();
        out
    }
}

impl Neg for RingElement {
    type Output = RingElement;
    fn neg(mut self) -> RingElement {
        self.negate_inplace();
        self
    }
}
