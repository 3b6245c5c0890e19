// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Designated-verifier Rinocchio.
//!
//! The verifier keeps the secret evaluation point `s`, the knowledge shifts `α`, `β_v`,
//! `β_w`, `β_y` and the column blinders `r_v`, `r_w`. The prover only ever sees linear-only
//! encodings of these and answers with nine encodings whose decodings satisfy the
//! divisibility check `(r_v v(s))(r_w w(s)) - r_y y(s) = r_y h(s) t(s)`.
//! Proofs are blinded by `δ_v`, `δ_w`, `δ_y` multiples of the target polynomial.

use crate::error::ZkError;
use crate::qrp::{
    divide_by_monic, evaluate, poly_add_assign, poly_mul, poly_scale, ColumnEvaluations, Qrp,
};
use crate::traits::{LinearEncoding, ProofSystem};
use fhe_traits::Serialize;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};
use zkhe_r1cs::R1cs;
use zkhe_ring::RingElement;

/// `E(x)` together with `E(α x)`.
pub struct Shifted<C> {
    pub plain: C,
    pub alpha: C,
}

pub struct ProvingKey<C> {
    r1cs: R1cs,
    qrp: Qrp,
    /// `s^i` for `i = 0..=m`.
    powers: Vec<Shifted<C>>,
    /// Indexed by auxiliary variable.
    v: Vec<Shifted<C>>,
    w: Vec<Shifted<C>>,
    y: Vec<Shifted<C>>,
    z: Vec<C>,
    v_target: Shifted<C>,
    w_target: Shifted<C>,
    y_target: Shifted<C>,
    z_target: [C; 3],
}

impl<C> ProvingKey<C> {
    pub fn r1cs(&self) -> &R1cs {
        &self.r1cs
    }

    pub fn num_encodings(&self) -> usize {
        2 * self.powers.len() + 7 * self.z.len() + 9
    }
}

pub struct VerificationKey<K> {
    key: K,
    alpha: RingElement,
    beta_v: RingElement,
    beta_w: RingElement,
    beta_y: RingElement,
    r_v: RingElement,
    r_w: RingElement,
    r_y: RingElement,
    target_at_s: RingElement,
    /// Column evaluations for the constant and the primary inputs.
    io: ColumnEvaluations,
}

impl<K> VerificationKey<K> {
    pub fn num_inputs(&self) -> usize {
        self.io.v.len() - 1
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Proof<C> {
    pub v: C,
    pub w: C,
    pub y: C,
    pub v_alpha: C,
    pub w_alpha: C,
    pub y_alpha: C,
    pub z: C,
    pub h: C,
    pub h_alpha: C,
}

impl<C: Serialize> Proof<C> {
    fn parts(&self) -> [&C; 9] {
        [
            &self.v,
            &self.w,
            &self.y,
            &self.v_alpha,
            &self.w_alpha,
            &self.y_alpha,
            &self.z,
            &self.h,
            &self.h_alpha,
        ]
    }

    pub fn size_in_bytes(&self) -> usize {
        self.parts().iter().map(|p| p.to_bytes().len()).sum()
    }
}

pub struct Rinocchio<E> {
    encoding: E,
}

impl<E: LinearEncoding> Rinocchio<E> {
    pub fn new(encoding: E) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> &E {
        &self.encoding
    }

    fn shifted<R: RngCore + CryptoRng>(
        &self,
        key: &E::Key,
        value: &RingElement,
        alpha: &RingElement,
        rng: &mut R,
    ) -> Result<Shifted<E::Encoded>, ZkError> {
        Ok(Shifted {
            plain: self.encoding.encode(key, value, rng)?,
            alpha: self.encoding.encode(key, &(value * alpha), rng)?,
        })
    }

    /// `Σ z_k · E(x_k) + δ · E(x_t)`
    fn blinded<'a, I>(
        &self,
        terms: I,
        blind: &E::Encoded,
        delta: &RingElement,
    ) -> Result<E::Encoded, ZkError>
    where
        I: IntoIterator<Item = (&'a E::Encoded, &'a RingElement)>,
        E::Encoded: 'a,
    {
        let mut acc = self.encoding.scale(blind, delta)?;
        if let Some(sum) = self.encoding.combine(terms)? {
            self.encoding.add_assign(&mut acc, &sum);
        }
        Ok(acc)
    }
}

impl<E: LinearEncoding> ProofSystem for Rinocchio<E> {
    type ProvingKey = ProvingKey<E::Encoded>;
    type VerificationKey = VerificationKey<E::Key>;
    type Proof = Proof<E::Encoded>;

    fn generate_keys<R: RngCore + CryptoRng>(
        &self,
        r1cs: &R1cs,
        rng: &mut R,
    ) -> Result<(Self::ProvingKey, Self::VerificationKey), ZkError> {
        let m = r1cs.num_constraints();
        if m == 0 {
            return Err(ZkError::EmptyConstraintSystem);
        }
        let ctx = r1cs.context();
        let qrp = Qrp::new(ctx, m)?;

        let (s, target_at_s) = loop {
            let s = RingElement::random_invertible_element(ctx, rng);
            let t = evaluate(qrp.target(), &s, ctx);
            if t.is_invertible() {
                break (s, t);
            }
        };
        let alpha = RingElement::random_invertible_element(ctx, rng);
        let beta_v = RingElement::random_invertible_element(ctx, rng);
        let beta_w = RingElement::random_invertible_element(ctx, rng);
        let beta_y = RingElement::random_invertible_element(ctx, rng);
        let r_v = RingElement::random_invertible_element(ctx, rng);
        let r_w = RingElement::random_invertible_element(ctx, rng);
        let r_y = &r_v * &r_w;

        let lagrange = qrp.lagrange_at(&s);
        let columns = qrp.column_evaluations(r1cs, &lagrange);
        let key = self.encoding.generate_key(rng)?;

        let mut powers = Vec::with_capacity(m + 1);
        let mut p = ctx.one();
        for _ in 0..=m {
            powers.push(self.shifted(&key, &p, &alpha, rng)?);
            p *= &s;
        }

        let io = r1cs.num_inputs() + 1;
        let aux = r1cs.num_variables() + 1 - io;
        let mut v = Vec::with_capacity(aux);
        let mut w = Vec::with_capacity(aux);
        let mut y = Vec::with_capacity(aux);
        let mut z = Vec::with_capacity(aux);
        for k in io..=r1cs.num_variables() {
            let vk = &r_v * &columns.v[k];
            let wk = &r_w * &columns.w[k];
            let yk = &r_y * &columns.y[k];
            let mut zk = &beta_v * &vk;
            zk += &(&beta_w * &wk);
            zk += &(&beta_y * &yk);
            v.push(self.shifted(&key, &vk, &alpha, rng)?);
            w.push(self.shifted(&key, &wk, &alpha, rng)?);
            y.push(self.shifted(&key, &yk, &alpha, rng)?);
            z.push(self.encoding.encode(&key, &zk, rng)?);
        }

        let vt = &r_v * &target_at_s;
        let wt = &r_w * &target_at_s;
        let yt = &r_y * &target_at_s;
        let z_target = [
            self.encoding.encode(&key, &(&beta_v * &vt), rng)?,
            self.encoding.encode(&key, &(&beta_w * &wt), rng)?,
            self.encoding.encode(&key, &(&beta_y * &yt), rng)?,
        ];
        let v_target = self.shifted(&key, &vt, &alpha, rng)?;
        let w_target = self.shifted(&key, &wt, &alpha, rng)?;
        let y_target = self.shifted(&key, &yt, &alpha, rng)?;

        let io_columns = ColumnEvaluations {
            v: columns.v[..io].to_vec(),
            w: columns.w[..io].to_vec(),
            y: columns.y[..io].to_vec(),
        };

        let pk = ProvingKey {
            r1cs: r1cs.clone(),
            qrp,
            powers,
            v,
            w,
            y,
            z,
            v_target,
            w_target,
            y_target,
            z_target,
        };
        info!(
            constraints = m,
            variables = r1cs.num_variables(),
            inputs = r1cs.num_inputs(),
            encodings = pk.num_encodings(),
            "generated rinocchio keys"
        );

        let vk = VerificationKey {
            key,
            alpha,
            beta_v,
            beta_w,
            beta_y,
            r_v,
            r_w,
            r_y,
            target_at_s,
            io: io_columns,
        };
        Ok((pk, vk))
    }

    fn prove<R: RngCore + CryptoRng>(
        &self,
        pk: &Self::ProvingKey,
        primary: &[RingElement],
        auxiliary: &[RingElement],
        rng: &mut R,
    ) -> Result<Self::Proof, ZkError> {
        let r1cs = &pk.r1cs;
        let ctx = r1cs.context();
        let z = r1cs.full_assignment(primary, auxiliary)?;
        let zero = ctx.zero();

        let mut a = Vec::with_capacity(r1cs.num_constraints());
        let mut b = Vec::with_capacity(r1cs.num_constraints());
        let mut c = Vec::with_capacity(r1cs.num_constraints());
        for constraint in r1cs.constraints() {
            a.push(constraint.a.evaluate(&z, &zero));
            b.push(constraint.b.evaluate(&z, &zero));
            c.push(constraint.c.evaluate(&z, &zero));
        }
        let a = pk.qrp.interpolate(&a);
        let b = pk.qrp.interpolate(&b);
        let c = pk.qrp.interpolate(&c);

        let mut p = poly_mul(&a, &b, ctx);
        poly_add_assign(&mut p, &poly_scale(&c, &RingElement::from_i64(ctx, -1)), ctx);
        let (mut h, remainder) = divide_by_monic(&p, pk.qrp.target(), ctx);
        if !remainder.iter().all(RingElement::is_zero) {
            warn!("witness does not satisfy the constraint system; proof will not verify");
        }

        let [delta_v, delta_w, delta_y] = [(); 3].map(|_| {
            let mut d = RingElement::random_element(ctx, rng);
            d.to_evaluation_form();
            d
        });

        poly_add_assign(&mut h, &poly_scale(&a, &delta_w), ctx);
        poly_add_assign(&mut h, &poly_scale(&b, &delta_v), ctx);
        poly_add_assign(
            &mut h,
            &poly_scale(pk.qrp.target(), &(&delta_v * &delta_w)),
            ctx,
        );
        if h.is_empty() {
            h.push(ctx.zero());
        }
        h[0] -= &delta_y;

        let mid = &z[r1cs.num_inputs() + 1..];
        let e = &self.encoding;
        let proof = Proof {
            v: self.blinded(pk.v.iter().map(|x| &x.plain).zip(mid), &pk.v_target.plain, &delta_v)?,
            w: self.blinded(pk.w.iter().map(|x| &x.plain).zip(mid), &pk.w_target.plain, &delta_w)?,
            y: self.blinded(pk.y.iter().map(|x| &x.plain).zip(mid), &pk.y_target.plain, &delta_y)?,
            v_alpha: self.blinded(
                pk.v.iter().map(|x| &x.alpha).zip(mid),
                &pk.v_target.alpha,
                &delta_v,
            )?,
            w_alpha: self.blinded(
                pk.w.iter().map(|x| &x.alpha).zip(mid),
                &pk.w_target.alpha,
                &delta_w,
            )?,
            y_alpha: self.blinded(
                pk.y.iter().map(|x| &x.alpha).zip(mid),
                &pk.y_target.alpha,
                &delta_y,
            )?,
            z: {
                let mut acc = self.blinded(pk.z.iter().zip(mid), &pk.z_target[0], &delta_v)?;
                e.add_assign(&mut acc, &e.scale(&pk.z_target[1], &delta_w)?);
                e.add_assign(&mut acc, &e.scale(&pk.z_target[2], &delta_y)?);
                acc
            },
            h: e.combine(pk.powers.iter().map(|x| &x.plain).zip(&h))?
                .ok_or(ZkError::EmptyConstraintSystem)?,
            h_alpha: e
                .combine(pk.powers.iter().map(|x| &x.alpha).zip(&h))?
                .ok_or(ZkError::EmptyConstraintSystem)?,
        };
        debug!(degree = h.len() - 1, "computed quotient polynomial");
        info!(bytes = proof.size_in_bytes(), "generated proof");
        Ok(proof)
    }

    fn verify(
        &self,
        vk: &Self::VerificationKey,
        primary: &[RingElement],
        proof: &Self::Proof,
    ) -> Result<bool, ZkError> {
        if primary.len() != vk.num_inputs() {
            return Err(ZkError::InputLength {
                expected: vk.num_inputs(),
                actual: primary.len(),
            });
        }
        let ctx = vk.alpha.context();
        let decode = |c: &E::Encoded| self.encoding.decode(&vk.key, c);

        let v = decode(&proof.v)?;
        let w = decode(&proof.w)?;
        let y = decode(&proof.y)?;
        let h = decode(&proof.h)?;

        let knowledge = [
            (&v, &proof.v_alpha, "v"),
            (&w, &proof.w_alpha, "w"),
            (&y, &proof.y_alpha, "y"),
            (&h, &proof.h_alpha, "h"),
        ];
        for (plain, shifted, name) in knowledge {
            if decode(shifted)? != &vk.alpha * plain {
                info!(term = name, "knowledge check failed");
                return Ok(false);
            }
        }

        let mut z = &vk.beta_v * &v;
        z += &(&vk.beta_w * &w);
        z += &(&vk.beta_y * &y);
        if decode(&proof.z)? != z {
            info!("consistency check failed");
            return Ok(false);
        }

        let mut assignment = Vec::with_capacity(primary.len() + 1);
        assignment.push(ctx.one());
        assignment.extend_from_slice(primary);
        let io = |column: &[RingElement]| {
            let mut acc = ctx.zero();
            for (value, eval) in assignment.iter().zip(column) {
                let mut term = value.clone();
                term.to_evaluation_form();
                acc += &(&term * eval);
            }
            acc
        };

        let full_v = &(&vk.r_v * &io(&vk.io.v)) + &v;
        let full_w = &(&vk.r_w * &io(&vk.io.w)) + &w;
        let full_y = &(&vk.r_y * &io(&vk.io.y)) + &y;
        let lhs = &(&full_v * &full_w) - &full_y;
        let rhs = &(&vk.r_y * &h) * &vk.target_at_s;
        let ok = lhs == rhs;
        if ok {
            info!("proof verified");
        } else {
            info!("divisibility check failed");
        }
        Ok(ok)
    }
}
