// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! RNS polynomials over `Z_Q[X]/(X^N + 1)` in coefficient or evaluation (NTT) form.

use crate::chain::ModulusChain;
use crate::errors::PolynomialError;
use crate::ntt::NttTables;
use crate::utils::reduce_i64;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// Representation of every row of an [`RnsPolynomial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Standard coefficients `a_0 .. a_{N-1}`.
    Coefficient,
    /// Point values produced by the forward negacyclic NTT.
    Evaluation,
}

/// A polynomial held as `k` residue rows of `N` coefficients, row `i` reduced modulo `q_i`.
///
/// The buffer is flat and row-major (`data[i * N + j]` is coefficient `j` modulo `q_i`).
/// Binary operations require both operands to share the chain and the representation;
/// multiplication is only defined in evaluation form. A violation is a programming error
/// and panics.
#[derive(Clone, PartialEq, Eq)]
pub struct RnsPolynomial {
    chain: Arc<ModulusChain>,
    data: Vec<u64>,
    is_ntt: bool,
}

impl RnsPolynomial {
    /// Zero polynomial in coefficient form.
    pub fn zero(chain: &Arc<ModulusChain>) -> Self {
        Self {
            chain: chain.clone(),
            data: vec![0; chain.size()],
            is_ntt: false,
        }
    }

    /// Zero polynomial in evaluation form.
    pub fn zero_ntt(chain: &Arc<ModulusChain>) -> Self {
        let mut p = Self::zero(chain);
        p.is_ntt = true;
        p
    }

    /// The constant polynomial `c`, reduced into every row.
    ///
    /// In coefficient form only the constant term is set; in evaluation form every slot holds `c`.
    pub fn constant(chain: &Arc<ModulusChain>, c: u64, representation: Representation) -> Self {
        let mut p = Self::zero(chain);
        p.is_ntt = representation == Representation::Evaluation;
        let n = chain.degree();
        for (row, m) in p.data.chunks_mut(n).zip(chain.moduli()) {
            let c = m.reduce(c);
            if p.is_ntt {
                row.fill(c);
            } else {
                row[0] = c;
            }
        }
        p
    }

    /// Wraps an explicit residue buffer.
    ///
    /// The representation is whatever the producer of `data` used; the scheme's plaintext
    /// layout is evaluation form, raw coefficient vectors are coefficient form.
    ///
    /// # Errors
    ///
    /// Returns [`PolynomialError::ShapeMismatch`] if `data.len() != N * k`, and
    /// [`PolynomialError::InvalidDocument`] if a residue is not reduced.
    pub fn from_coefficients(
        chain: &Arc<ModulusChain>,
        data: Vec<u64>,
        representation: Representation,
    ) -> Result<Self, PolynomialError> {
        if data.len() != chain.size() {
            return Err(PolynomialError::ShapeMismatch {
                expected: chain.size(),
                actual: data.len(),
            });
        }
        for (i, row) in data.chunks(chain.degree()).enumerate() {
            let q = chain.values()[i];
            if let Some(x) = row.iter().find(|&&x| x >= q) {
                return Err(PolynomialError::invalid_document(format!(
                    "residue {x} is not reduced modulo {q}"
                )));
            }
        }
        Ok(Self {
            chain: chain.clone(),
            data,
            is_ntt: representation == Representation::Evaluation,
        })
    }

    /// Copies one residue row per modulus out of a ciphertext or plaintext component.
    ///
    /// # Errors
    ///
    /// Returns [`PolynomialError::ShapeMismatch`] when the component does not have
    /// exactly `k` rows of `N` residues.
    pub fn from_component(
        chain: &Arc<ModulusChain>,
        rows: &[Vec<u64>],
        representation: Representation,
    ) -> Result<Self, PolynomialError> {
        if rows.len() != chain.len() {
            return Err(PolynomialError::ShapeMismatch {
                expected: chain.len(),
                actual: rows.len(),
            });
        }
        let mut data = Vec::with_capacity(chain.size());
        for row in rows {
            if row.len() != chain.degree() {
                return Err(PolynomialError::ShapeMismatch {
                    expected: chain.degree(),
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_coefficients(chain, data, representation)
    }

    /// Coefficient-form polynomial from small signed coefficients `a_0, a_1, ...`.
    ///
    /// # Panics
    ///
    /// Panics if more than `N` coefficients are given.
    pub fn from_signed(chain: &Arc<ModulusChain>, coefficients: &[i64]) -> Self {
        let n = chain.degree();
        assert!(coefficients.len() <= n, "more coefficients than ring degree");
        let mut p = Self::zero(chain);
        for (row, &q) in p.data.chunks_mut(n).zip(chain.values()) {
            for (dst, &c) in row.iter_mut().zip(coefficients) {
                *dst = reduce_i64(c, q);
            }
        }
        p
    }

    /// Fills every residue from `f(q_i)`, row by row, reducing each value modulo `q_i`.
    pub fn from_fn<F>(chain: &Arc<ModulusChain>, representation: Representation, mut f: F) -> Self
    where
        F: FnMut(u64) -> u64,
    {
        let n = chain.degree();
        let mut p = Self::zero(chain);
        p.is_ntt = representation == Representation::Evaluation;
        for (row, m) in p.data.chunks_mut(n).zip(chain.moduli()) {
            for dst in row.iter_mut() {
                *dst = m.reduce(f(m.modulus()));
            }
        }
        p
    }

    /// Reads an arbitrary-length stream of non-negative integer coefficients `c_0, c_1, ...`
    /// as the polynomial `Σ c_p X^p` and reduces it into the ring.
    ///
    /// Position `p` folds onto `X^(p mod N)` with sign `(-1)^(p / N)`, then every row is
    /// reduced modulo its own `q_i`. The result is in coefficient form.
    pub fn from_negacyclic_stream(chain: &Arc<ModulusChain>, stream: &[u64]) -> Self {
        let n = chain.degree();
        let mut p = Self::zero(chain);
        p.data
            .par_chunks_mut(n)
            .zip(chain.moduli().par_iter())
            .for_each(|(row, m)| {
                for (pos, &c) in stream.iter().enumerate() {
                    let c = m.reduce(c);
                    let slot = pos % n;
                    row[slot] = if (pos / n) % 2 == 0 {
                        m.add(row[slot], c)
                    } else {
                        m.sub(row[slot], c)
                    };
                }
            });
        p
    }

    pub fn chain(&self) -> &Arc<ModulusChain> {
        &self.chain
    }

    /// Number of coefficients per row (`N`).
    pub fn coeff_count(&self) -> usize {
        self.chain.degree()
    }

    /// Modulus values, one per row.
    pub fn moduli(&self) -> &[u64] {
        self.chain.values()
    }

    pub fn is_ntt(&self) -> bool {
        self.is_ntt
    }

    pub fn representation(&self) -> Representation {
        if self.is_ntt {
            Representation::Evaluation
        } else {
            Representation::Coefficient
        }
    }

    /// Row `i` (residues modulo `q_i`).
    pub fn row(&self, i: usize) -> &[u64] {
        let n = self.coeff_count();
        &self.data[i * n..(i + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        self.data.chunks(self.coeff_count())
    }

    /// The flat row-major buffer.
    pub fn data(&self) -> &[u64] {
        &self.data
    }

    fn assert_compatible(&self, other: &Self, op: &str) {
        assert!(
            Arc::ptr_eq(&self.chain, &other.chain) || self.chain == other.chain,
            "{op}: operands use different modulus chains"
        );
        assert_eq!(
            self.is_ntt, other.is_ntt,
            "{op}: operands are in different representations"
        );
    }

    fn zip_rows_with<F>(&mut self, other: &Self, f: F)
    where
        F: Fn(&fhe_math::zq::Modulus, &mut [u64], &[u64]) + Sync + Send,
    {
        let n = self.coeff_count();
        let chain = self.chain.clone();
        self.data
            .par_chunks_mut(n)
            .zip(other.data.par_chunks(n))
            .zip(chain.moduli().par_iter())
            .for_each(|((a, b), m)| f(m, a, b));
    }

    fn map_rows<F>(&mut self, f: F)
    where
        F: Fn(&fhe_math::zq::Modulus, &mut [u64]) + Sync + Send,
    {
        let n = self.coeff_count();
        let chain = self.chain.clone();
        self.data
            .par_chunks_mut(n)
            .zip(chain.moduli().par_iter())
            .for_each(|(a, m)| f(m, a));
    }

    pub fn add_inplace(&mut self, other: &Self) {
        self.assert_compatible(other, "add");
        self.zip_rows_with(other, |m, a, b| {
            a.iter_mut().zip(b).for_each(|(x, &y)| *x = m.add(*x, y));
        });
    }

    pub fn subtract_inplace(&mut self, other: &Self) {
        self.assert_compatible(other, "subtract");
        self.zip_rows_with(other, |m, a, b| {
            a.iter_mut().zip(b).for_each(|(x, &y)| *x = m.sub(*x, y));
        });
    }

    /// Pointwise product; multiplication modulo `X^N + 1` when both sides are NTT images.
    ///
    /// # Panics
    ///
    /// Panics unless both operands are in evaluation form.
    pub fn multiply_inplace(&mut self, other: &Self) {
        assert!(
            self.is_ntt && other.is_ntt,
            "multiply: both operands must be in evaluation form"
        );
        self.assert_compatible(other, "multiply");
        self.zip_rows_with(other, |m, a, b| {
            a.iter_mut().zip(b).for_each(|(x, &y)| *x = m.mul(*x, y));
        });
    }

    pub fn multiply_scalar_inplace(&mut self, c: u64) {
        if c == 1 {
            return;
        }
        self.map_rows(|m, a| m.scalar_mul_vec(a, m.reduce(c)));
    }

    /// Adds the constant polynomial `c`.
    pub fn add_scalar_inplace(&mut self, c: u64) {
        if c == 0 {
            return;
        }
        let is_ntt = self.is_ntt;
        self.map_rows(|m, a| {
            let c = m.reduce(c);
            if is_ntt {
                a.iter_mut().for_each(|x| *x = m.add(*x, c));
            } else {
                a[0] = m.add(a[0], c);
            }
        });
    }

    /// Subtracts the constant polynomial `c`.
    pub fn subtract_scalar_inplace(&mut self, c: u64) {
        if c == 0 {
            return;
        }
        let is_ntt = self.is_ntt;
        self.map_rows(|m, a| {
            let c = m.reduce(c);
            if is_ntt {
                a.iter_mut().for_each(|x| *x = m.sub(*x, c));
            } else {
                a[0] = m.sub(a[0], c);
            }
        });
    }

    pub fn negate_inplace(&mut self) {
        self.map_rows(|m, a| a.iter_mut().for_each(|x| *x = m.neg(*x)));
    }

    fn assert_tables(&self, tables: &NttTables) {
        assert!(
            *tables.chain() == *self.chain,
            "NTT tables were built for a different modulus chain"
        );
    }

    /// Forward transform of every row.
    ///
    /// # Panics
    ///
    /// Panics if the polynomial is already in evaluation form.
    pub fn ntt_inplace(&mut self, tables: &NttTables) {
        assert!(!self.is_ntt, "ntt_inplace: polynomial is already in evaluation form");
        self.assert_tables(tables);
        let n = self.coeff_count();
        self.data
            .par_chunks_mut(n)
            .zip(tables.tables().par_iter())
            .for_each(|(row, table)| table.forward(row));
        self.is_ntt = true;
    }

    /// Inverse transform of every row.
    ///
    /// # Panics
    ///
    /// Panics if the polynomial is already in coefficient form.
    pub fn intt_inplace(&mut self, tables: &NttTables) {
        assert!(self.is_ntt, "intt_inplace: polynomial is already in coefficient form");
        self.assert_tables(tables);
        let n = self.coeff_count();
        self.data
            .par_chunks_mut(n)
            .zip(tables.tables().par_iter())
            .for_each(|(row, table)| table.backward(row));
        self.is_ntt = false;
    }

    /// Replaces every slot by its modular inverse.
    ///
    /// Each row stops at its first non-invertible slot and leaves the remainder untouched.
    /// Returns `true` only if every slot of every row was inverted; on `false` the contents
    /// are unusable.
    ///
    /// # Panics
    ///
    /// Panics if the polynomial is in coefficient form.
    pub fn invert_inplace(&mut self) -> bool {
        assert!(self.is_ntt, "invert_inplace: polynomial must be in evaluation form");
        let n = self.coeff_count();
        let chain = self.chain.clone();
        self.data
            .par_chunks_mut(n)
            .zip(chain.moduli().par_iter())
            .map(|(row, m)| {
                for x in row.iter_mut() {
                    match m.inv(*x) {
                        Some(inv) => *x = inv,
                        None => return false,
                    }
                }
                true
            })
            .reduce(|| true, |a, b| a && b)
    }

    /// `true` when no evaluation slot is zero, i.e. [`invert_inplace`](Self::invert_inplace)
    /// would succeed for prime moduli.
    pub fn all_slots_nonzero(&self) -> bool {
        self.data.iter().all(|&x| x != 0)
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0)
    }

    /// Compares the raw buffers.
    ///
    /// Callers align representation first; the flag itself is not compared.
    pub fn is_equal(&self, other: &Self) -> bool {
        self.data.len() == other.data.len() && self.data == other.data
    }
}

impl fmt::Debug for RnsPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RnsPolynomial")
            .field("degree", &self.coeff_count())
            .field("moduli", &self.moduli())
            .field("is_ntt", &self.is_ntt)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    const DEGREE: usize = 16;
    const MODULI: &[u64] = &[0x3ffffe81, 0x3ffff781];

    fn setup() -> (Arc<ModulusChain>, Arc<NttTables>) {
        let chain = Arc::new(ModulusChain::new(DEGREE, MODULI).unwrap());
        let tables = NttTables::new_arc(&chain).unwrap();
        (chain, tables)
    }

    fn random_poly(chain: &Arc<ModulusChain>, rng: &mut ChaCha20Rng) -> RnsPolynomial {
        let data = chain
            .values()
            .iter()
            .flat_map(|&q| (0..chain.degree()).map(|_| rng.gen_range(0..q)).collect::<Vec<_>>())
            .collect();
        RnsPolynomial::from_coefficients(chain, data, Representation::Coefficient).unwrap()
    }

    /// Schoolbook product modulo `X^N + 1`, row by row.
    fn naive_negacyclic(a: &RnsPolynomial, b: &RnsPolynomial) -> RnsPolynomial {
        let n = a.coeff_count();
        let mut out = RnsPolynomial::zero(a.chain());
        for (i, m) in a.chain().moduli().iter().enumerate() {
            let (ra, rb) = (a.row(i), b.row(i));
            let mut acc = vec![0u64; n];
            for x in 0..n {
                for y in 0..n {
                    let prod = m.mul(ra[x], rb[y]);
                    let k = x + y;
                    if k < n {
                        acc[k] = m.add(acc[k], prod);
                    } else {
                        acc[k - n] = m.sub(acc[k - n], prod);
                    }
                }
            }
            out.data[i * n..(i + 1) * n].copy_from_slice(&acc);
        }
        out
    }

    #[test]
    fn test_zero_and_constant() {
        let (chain, _) = setup();
        let z = RnsPolynomial::zero(&chain);
        assert!(z.is_zero());
        assert!(!z.is_ntt());
        assert!(RnsPolynomial::zero_ntt(&chain).is_ntt());

        let c = RnsPolynomial::constant(&chain, 7, Representation::Coefficient);
        assert_eq!(c.row(0)[0], 7);
        assert!(c.row(1)[1..].iter().all(|&x| x == 0));
        let e = RnsPolynomial::constant(&chain, 7, Representation::Evaluation);
        assert!(e.data().iter().all(|&x| x == 7));
    }

    #[test]
    fn test_from_coefficients_validates_shape() {
        let (chain, _) = setup();
        assert!(matches!(
            RnsPolynomial::from_coefficients(&chain, vec![0; 3], Representation::Coefficient),
            Err(PolynomialError::ShapeMismatch { .. })
        ));
        let mut data = vec![0; chain.size()];
        data[0] = MODULI[0];
        assert!(
            RnsPolynomial::from_coefficients(&chain, data, Representation::Coefficient).is_err()
        );
    }

    #[test]
    fn test_from_component_layout() {
        let (chain, _) = setup();
        let rows = vec![vec![1u64; DEGREE], vec![2u64; DEGREE]];
        let p = RnsPolynomial::from_component(&chain, &rows, Representation::Evaluation).unwrap();
        assert!(p.is_ntt());
        assert_eq!(p.row(0), &rows[0][..]);
        assert_eq!(p.row(1), &rows[1][..]);
        assert!(RnsPolynomial::from_component(&chain, &rows[..1], Representation::Evaluation)
            .is_err());
    }

    #[test]
    fn test_ntt_multiplication_matches_naive() {
        let (chain, tables) = setup();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..4 {
            let a = random_poly(&chain, &mut rng);
            let b = random_poly(&chain, &mut rng);
            let expected = naive_negacyclic(&a, &b);

            let (mut fa, mut fb) = (a.clone(), b.clone());
            fa.ntt_inplace(&tables);
            fb.ntt_inplace(&tables);
            fa.multiply_inplace(&fb);
            fa.intt_inplace(&tables);
            assert_eq!(fa, expected);
        }
    }

    #[test]
    fn test_x_to_the_n_is_minus_one() {
        let (chain, tables) = setup();
        // X^(N/2) * X^(N/2) = X^N = -1
        let mut coeffs = vec![0i64; DEGREE];
        coeffs[DEGREE / 2] = 1;
        let mut a = RnsPolynomial::from_signed(&chain, &coeffs);
        a.ntt_inplace(&tables);
        let b = a.clone();
        a.multiply_inplace(&b);
        a.intt_inplace(&tables);
        assert_eq!(a, RnsPolynomial::from_signed(&chain, &[-1]));
    }

    #[test]
    fn test_negacyclic_stream_folding() {
        let (chain, _) = setup();
        // 3 + 5 X^N + 2 X^(2N+1) = (3 - 5) + 2 X
        let mut stream = vec![0u64; 2 * DEGREE + 2];
        stream[0] = 3;
        stream[DEGREE] = 5;
        stream[2 * DEGREE + 1] = 2;
        let p = RnsPolynomial::from_negacyclic_stream(&chain, &stream);
        assert_eq!(p, RnsPolynomial::from_signed(&chain, &[-2, 2]));
    }

    #[test]
    fn test_scalar_operations() {
        let (chain, tables) = setup();
        let mut p = RnsPolynomial::from_signed(&chain, &[1, 2, 3]);
        let original = p.clone();
        p.multiply_scalar_inplace(1);
        p.add_scalar_inplace(0);
        p.subtract_scalar_inplace(0);
        assert_eq!(p, original);

        p.multiply_scalar_inplace(3);
        assert_eq!(p, RnsPolynomial::from_signed(&chain, &[3, 6, 9]));
        p.add_scalar_inplace(4);
        assert_eq!(p, RnsPolynomial::from_signed(&chain, &[7, 6, 9]));
        p.subtract_scalar_inplace(10);
        assert_eq!(p, RnsPolynomial::from_signed(&chain, &[-3, 6, 9]));

        // Adding a scalar commutes with the transform.
        let mut q = RnsPolynomial::from_signed(&chain, &[5, 1]);
        let mut q_ntt = q.clone();
        q_ntt.ntt_inplace(&tables);
        q.add_scalar_inplace(11);
        q_ntt.add_scalar_inplace(11);
        q_ntt.intt_inplace(&tables);
        assert_eq!(q, q_ntt);
    }

    #[test]
    fn test_invert_roundtrip() {
        let (chain, tables) = setup();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let mut a = random_poly(&chain, &mut rng);
        a.ntt_inplace(&tables);
        assert!(a.all_slots_nonzero());
        let mut inv = a.clone();
        assert!(inv.invert_inplace());
        a.multiply_inplace(&inv);
        assert_eq!(a, RnsPolynomial::constant(&chain, 1, Representation::Evaluation));
    }

    #[test]
    fn test_invert_fails_on_zero_slot() {
        let (chain, tables) = setup();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut a = random_poly(&chain, &mut rng);
        a.ntt_inplace(&tables);
        let n = a.coeff_count();
        // Zero one slot of the second row only.
        a.data[n + 3] = 0;
        assert!(!a.all_slots_nonzero());
        assert!(!a.invert_inplace());
    }

    #[test]
    #[should_panic(expected = "evaluation form")]
    fn test_multiply_in_coefficient_form_panics() {
        let (chain, _) = setup();
        let mut a = RnsPolynomial::from_signed(&chain, &[1]);
        let b = a.clone();
        a.multiply_inplace(&b);
    }

    #[test]
    #[should_panic(expected = "different representations")]
    fn test_add_with_mismatched_forms_panics() {
        let (chain, _) = setup();
        let mut a = RnsPolynomial::zero(&chain);
        a.add_inplace(&RnsPolynomial::zero_ntt(&chain));
    }

    #[test]
    #[should_panic(expected = "already in evaluation form")]
    fn test_double_ntt_panics() {
        let (chain, tables) = setup();
        let mut a = RnsPolynomial::zero_ntt(&chain);
        a.ntt_inplace(&tables);
    }

    #[test]
    #[should_panic(expected = "already in coefficient form")]
    fn test_intt_on_coefficient_form_panics() {
        let (chain, tables) = setup();
        let mut a = RnsPolynomial::zero(&chain);
        a.intt_inplace(&tables);
    }

    #[test]
    #[should_panic(expected = "different modulus chains")]
    fn test_mixing_chains_panics() {
        let (chain, _) = setup();
        let other = Arc::new(ModulusChain::new(DEGREE, &MODULI[..1]).unwrap());
        let mut a = RnsPolynomial::zero(&chain);
        a.add_inplace(&RnsPolynomial::zero(&other));
    }

    #[test]
    fn test_is_equal_compares_buffers_only() {
        let (chain, _) = setup();
        let a = RnsPolynomial::zero(&chain);
        let b = RnsPolynomial::zero_ntt(&chain);
        assert!(a.is_equal(&b));
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn prop_add_then_subtract_is_identity(seed in any::<u64>(), ntt in any::<bool>()) {
            let (chain, tables) = setup();
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut a = random_poly(&chain, &mut rng);
            let mut b = random_poly(&chain, &mut rng);
            if ntt {
                a.ntt_inplace(&tables);
                b.ntt_inplace(&tables);
            }
            let mut c = a.clone();
            c.add_inplace(&b);
            c.subtract_inplace(&b);
            prop_assert_eq!(c, a);
        }

        #[test]
        fn prop_forward_inverse_roundtrip(seed in any::<u64>()) {
            let (chain, tables) = setup();
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let mut a = random_poly(&chain, &mut rng);
            a.ntt_inplace(&tables);
            let expected = a.clone();
            a.intt_inplace(&tables);
            a.ntt_inplace(&tables);
            prop_assert_eq!(a, expected);
        }

        #[test]
        fn prop_double_negation(seed in any::<u64>()) {
            let (chain, _) = setup();
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let a = random_poly(&chain, &mut rng);
            let mut b = a.clone();
            b.negate_inplace();
            b.negate_inplace();
            prop_assert_eq!(b, a);
        }
    }
}
