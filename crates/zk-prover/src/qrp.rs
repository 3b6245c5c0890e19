// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Quadratic ring programs.
//!
//! Constraint `j` of an R1CS is attached to the interpolation point `g_j = j + 1`. Column
//! `k` of the `A`, `B`, `C` matrices becomes the polynomials `v_k`, `w_k`, `y_k` in a fresh
//! variable `x` that take the column's entries at the `g_j`, and the target polynomial is
//! `t(x) = ∏ (x - g_j)`. Polynomials in `x` are coefficient vectors over the proof ring,
//! lowest degree first.

use crate::error::ZkError;
use std::sync::Arc;
use zkhe_r1cs::R1cs;
use zkhe_ring::{RingContext, RingElement};

pub struct Qrp {
    ctx: Arc<RingContext>,
    points: Vec<RingElement>,
    target: Vec<RingElement>,
    basis: Vec<Vec<RingElement>>,
}

/// `v_k(s)`, `w_k(s)`, `y_k(s)` for every variable `k`, constant one included.
pub struct ColumnEvaluations {
    pub v: Vec<RingElement>,
    pub w: Vec<RingElement>,
    pub y: Vec<RingElement>,
}

impl Qrp {
    /// # Errors
    ///
    /// Returns [`ZkError::TooManyConstraints`] when the points `1..=m` are not pairwise
    /// distinct modulo every `q_i`.
    pub fn new(ctx: &Arc<RingContext>, num_constraints: usize) -> Result<Self, ZkError> {
        let bound = ctx.chain().min_modulus();
        if num_constraints as u64 >= bound {
            return Err(ZkError::TooManyConstraints {
                constraints: num_constraints,
                bound,
            });
        }
        let points: Vec<RingElement> = (1..=num_constraints as u64)
            .map(|g| ctx.scalar(g))
            .collect();

        let mut target = vec![ctx.one()];
        for g in &points {
            target = multiply_by_linear(&target, g, ctx);
        }

        let mut basis = Vec::with_capacity(points.len());
        for g in &points {
            let numerator = divide_by_linear(&target, g);
            let denominator = evaluate(&numerator, g, ctx);
            let inv = denominator.inverse()?;
            basis.push(numerator.iter().map(|c| c * &inv).collect());
        }

        Ok(Self {
            ctx: ctx.clone(),
            points,
            target,
            basis,
        })
    }

    /// Number of constraints `m`; also the degree of `t`.
    pub fn degree(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[RingElement] {
        &self.points
    }

    /// Coefficients of `t(x)`; monic of degree `m`.
    pub fn target(&self) -> &[RingElement] {
        &self.target
    }

    /// `ℓ_j(s)` for every Lagrange basis polynomial.
    pub fn lagrange_at(&self, s: &RingElement) -> Vec<RingElement> {
        self.basis
            .iter()
            .map(|l| evaluate(l, s, &self.ctx))
            .collect()
    }

    /// Evaluates every column polynomial at the point whose Lagrange values are `lagrange`.
    pub fn column_evaluations(&self, r1cs: &R1cs, lagrange: &[RingElement]) -> ColumnEvaluations {
        let size = r1cs.num_variables() + 1;
        let zero = self.ctx.zero();
        let mut out = ColumnEvaluations {
            v: vec![zero.clone(); size],
            w: vec![zero.clone(); size],
            y: vec![zero; size],
        };
        for (c, l) in r1cs.constraints().iter().zip(lagrange) {
            for (lc, column) in [(&c.a, &mut out.v), (&c.b, &mut out.w), (&c.c, &mut out.y)] {
                for t in lc.terms() {
                    let term = l * &RingElement::from_i64(&self.ctx, t.coefficient);
                    column[t.variable.index()] += &term;
                }
            }
        }
        out
    }

    /// Coefficients of the unique polynomial of degree `< m` through `(g_j, values[j])`.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != m`.
    pub fn interpolate(&self, values: &[RingElement]) -> Vec<RingElement> {
        assert_eq!(values.len(), self.degree(), "one value per interpolation point");
        let mut coeffs = vec![self.ctx.zero(); self.degree()];
        for (value, l) in values.iter().zip(&self.basis) {
            if value.is_zero() {
                continue;
            }
            for (c, b) in coeffs.iter_mut().zip(l) {
                *c += &(value * b);
            }
        }
        coeffs
    }
}

/// Horner evaluation of `Σ coeffs[i] · x^i`.
pub fn evaluate(coeffs: &[RingElement], x: &RingElement, ctx: &Arc<RingContext>) -> RingElement {
    let mut acc = ctx.zero();
    for c in coeffs.iter().rev() {
        acc *= x;
        acc += c;
    }
    acc
}

/// `1, x, x^2, ..., x^(count - 1)`
pub fn powers(x: &RingElement, count: usize) -> Vec<RingElement> {
    let mut out = Vec::with_capacity(count);
    let mut p = x.context().one();
    for _ in 0..count {
        out.push(p.clone());
        p *= x;
    }
    out
}

pub fn poly_mul(a: &[RingElement], b: &[RingElement], ctx: &Arc<RingContext>) -> Vec<RingElement> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![ctx.zero(); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        if x.is_zero() {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            out[i + j] += &(x * y);
        }
    }
    out
}

/// `a += b`, growing `a` as needed.
pub fn poly_add_assign(a: &mut Vec<RingElement>, b: &[RingElement], ctx: &Arc<RingContext>) {
    if a.len() < b.len() {
        a.resize(b.len(), ctx.zero());
    }
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
}

/// `a · c` for a ring constant `c`.
pub fn poly_scale(a: &[RingElement], c: &RingElement) -> Vec<RingElement> {
    a.iter().map(|x| x * c).collect()
}

/// Quotient and remainder of `p` by a monic `d`.
///
/// # Panics
///
/// Panics if `d` is empty.
pub fn divide_by_monic(
    p: &[RingElement],
    d: &[RingElement],
    ctx: &Arc<RingContext>,
) -> (Vec<RingElement>, Vec<RingElement>) {
    assert!(!d.is_empty(), "divisor must not be empty");
    let m = d.len() - 1;
    if p.len() <= m {
        return (Vec::new(), p.to_vec());
    }
    let mut rem = p.to_vec();
    let mut quotient = vec![ctx.zero(); p.len() - m];
    for i in (0..quotient.len()).rev() {
        let q = rem[i + m].clone();
        if !q.is_zero() {
            for (j, dj) in d.iter().enumerate() {
                rem[i + j] -= &(&q * dj);
            }
        }
        quotient[i] = q;
    }
    rem.truncate(m);
    (quotient, rem)
}

fn multiply_by_linear(
    p: &[RingElement],
    root: &RingElement,
    ctx: &Arc<RingContext>,
) -> Vec<RingElement> {
    let mut out = vec![ctx.zero(); p.len() + 1];
    for (i, c) in p.iter().enumerate() {
        out[i + 1] += c;
        out[i] -= &(c * root);
    }
    out
}

/// `p / (x - root)` for a `p` that vanishes at `root`.
fn divide_by_linear(p: &[RingElement], root: &RingElement) -> Vec<RingElement> {
    let m = p.len() - 1;
    let mut q = vec![p[m].clone(); m];
    for i in (1..m).rev() {
        let next = &p[i] + &(&q[i] * root);
        q[i - 1] = next;
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn ctx() -> Arc<RingContext> {
        RingContext::from_moduli(16, &[0x3ffffe81, 0x3ffff781]).unwrap()
    }

    #[test]
    fn test_target_vanishes_on_points() {
        let ctx = ctx();
        let qrp = Qrp::new(&ctx, 5).unwrap();
        assert_eq!(qrp.target().len(), 6);
        assert!(qrp.target()[5].is_one());
        for g in qrp.points() {
            assert!(evaluate(qrp.target(), g, &ctx).is_zero());
        }
        assert!(!evaluate(qrp.target(), &ctx.scalar(6), &ctx).is_zero());
    }

    #[test]
    fn test_lagrange_basis_is_a_delta() {
        let ctx = ctx();
        let qrp = Qrp::new(&ctx, 4).unwrap();
        for (j, g) in qrp.points().iter().enumerate() {
            let at = qrp.lagrange_at(g);
            for (l, value) in at.iter().enumerate() {
                assert_eq!(value.is_one(), j == l);
                assert_eq!(value.is_zero(), j != l);
            }
        }
    }

    #[test]
    fn test_interpolation_of_ring_values() {
        let ctx = ctx();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let qrp = Qrp::new(&ctx, 4).unwrap();
        let values: Vec<_> = (0..4)
            .map(|_| RingElement::random_invertible_element(&ctx, &mut rng))
            .collect();
        let coeffs = qrp.interpolate(&values);
        for (g, v) in qrp.points().iter().zip(&values) {
            assert_eq!(&evaluate(&coeffs, g, &ctx), v);
        }
    }

    #[test]
    fn test_division_by_target() {
        let ctx = ctx();
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let qrp = Qrp::new(&ctx, 3).unwrap();
        let h: Vec<_> = (0..2)
            .map(|_| RingElement::random_invertible_element(&ctx, &mut rng))
            .collect();
        let p = poly_mul(&h, qrp.target(), &ctx);
        let (q, r) = divide_by_monic(&p, qrp.target(), &ctx);
        assert_eq!(q, h);
        assert!(r.iter().all(RingElement::is_zero));

        let mut shifted = p.clone();
        shifted[0] += &ctx.one();
        let (_, r) = divide_by_monic(&shifted, qrp.target(), &ctx);
        assert!(r[0].is_one());
    }

    #[test]
    fn test_powers() {
        let ctx = ctx();
        let p = powers(&ctx.scalar(3), 4);
        let expected: Vec<_> = [1u64, 3, 9, 27].iter().map(|&x| ctx.scalar(x)).collect();
        assert_eq!(p, expected);
    }

    #[test]
    fn test_too_many_constraints() {
        let ctx = RingContext::from_moduli(4, &[17]).unwrap();
        assert!(matches!(
            Qrp::new(&ctx, 17),
            Err(ZkError::TooManyConstraints { constraints: 17, bound: 17 })
        ));
    }
}
