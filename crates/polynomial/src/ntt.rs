// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Negacyclic number-theoretic transform.
//!
//! The forward transform maps a row in coefficient order to its evaluations at the odd powers
//! of a primitive `2N`-th root of unity `ψ`, in bit-reversed order. In that domain a product
//! modulo `X^N + 1` becomes a pointwise product.

use crate::chain::ModulusChain;
use crate::errors::PolynomialError;
use crate::utils::{bit_reverse, pow_mod};
use fhe_math::zq::Modulus;
use std::sync::Arc;
use tracing::debug;

/// Bound on candidate generators tried while searching for `ψ`.
const ROOT_SEARCH_LIMIT: u64 = 1 << 20;

/// Precomputed twiddle factors for one modulus.
#[derive(Debug, Clone)]
pub struct NttTable {
    modulus: Modulus,
    degree: usize,
    psi_rev: Vec<u64>,
    psi_inv_rev: Vec<u64>,
    degree_inv: u64,
}

impl NttTable {
    pub fn new(modulus: &Modulus, degree: usize) -> Result<Self, PolynomialError> {
        let q = modulus.modulus();
        let order = 2 * degree;
        let psi = find_primitive_root(modulus, order)?;
        let psi_inv = modulus
            .inv(psi)
            .ok_or(PolynomialError::NoPrimitiveRoot { modulus: q, order })?;
        let degree_inv = modulus
            .inv(degree as u64 % q)
            .ok_or(PolynomialError::NoPrimitiveRoot { modulus: q, order })?;

        let bits = degree.trailing_zeros();
        let mut psi_rev = vec![0u64; degree];
        let mut psi_inv_rev = vec![0u64; degree];
        let mut power = 1u64;
        let mut inv_power = 1u64;
        for i in 0..degree {
            let r = bit_reverse(i, bits);
            psi_rev[r] = power;
            psi_inv_rev[r] = inv_power;
            power = modulus.mul(power, psi);
            inv_power = modulus.mul(inv_power, psi_inv);
        }

        Ok(Self {
            modulus: modulus.clone(),
            degree,
            psi_rev,
            psi_inv_rev,
            degree_inv,
        })
    }

    pub fn modulus(&self) -> u64 {
        self.modulus.modulus()
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// In-place forward transform (Cooley–Tukey butterflies).
    pub fn forward(&self, a: &mut [u64]) {
        assert_eq!(a.len(), self.degree, "row length does not match NTT degree");
        let m_ = &self.modulus;
        let n = self.degree;
        let mut t = n;
        let mut m = 1;
        while m < n {
            t >>= 1;
            for i in 0..m {
                let j1 = 2 * i * t;
                let s = self.psi_rev[m + i];
                for j in j1..j1 + t {
                    let u = a[j];
                    let v = m_.mul(a[j + t], s);
                    a[j] = m_.add(u, v);
                    a[j + t] = m_.sub(u, v);
                }
            }
            m <<= 1;
        }
    }

    /// In-place inverse transform (Gentleman–Sande butterflies), including the `N^-1` scaling.
    pub fn backward(&self, a: &mut [u64]) {
        assert_eq!(a.len(), self.degree, "row length does not match NTT degree");
        let m_ = &self.modulus;
        let n = self.degree;
        let mut t = 1;
        let mut m = n;
        while m > 1 {
            let h = m >> 1;
            let mut j1 = 0;
            for i in 0..h {
                let s = self.psi_inv_rev[h + i];
                for j in j1..j1 + t {
                    let u = a[j];
                    let v = a[j + t];
                    a[j] = m_.add(u, v);
                    a[j + t] = m_.mul(m_.sub(u, v), s);
                }
                j1 += 2 * t;
            }
            t <<= 1;
            m = h;
        }
        for x in a.iter_mut() {
            *x = m_.mul(*x, self.degree_inv);
        }
    }
}

/// One [`NttTable`] per modulus of a chain.
///
/// Built once per chain and handed out behind an `Arc`; tables are never mutated.
#[derive(Debug)]
pub struct NttTables {
    chain: ModulusChain,
    tables: Vec<NttTable>,
}

impl NttTables {
    pub fn new(chain: &ModulusChain) -> Result<Self, PolynomialError> {
        let tables = chain
            .moduli()
            .iter()
            .map(|m| NttTable::new(m, chain.degree()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            degree = chain.degree(),
            moduli = chain.len(),
            "built negacyclic NTT tables"
        );
        Ok(Self {
            chain: chain.clone(),
            tables,
        })
    }

    pub fn new_arc(chain: &ModulusChain) -> Result<Arc<Self>, PolynomialError> {
        Ok(Arc::new(Self::new(chain)?))
    }

    pub fn chain(&self) -> &ModulusChain {
        &self.chain
    }

    pub fn table(&self, i: usize) -> &NttTable {
        &self.tables[i]
    }

    pub fn tables(&self) -> &[NttTable] {
        &self.tables
    }
}

fn find_primitive_root(modulus: &Modulus, order: usize) -> Result<u64, PolynomialError> {
    let q = modulus.modulus();
    let order_u64 = order as u64;
    let not_found = PolynomialError::NoPrimitiveRoot { modulus: q, order };
    if (q - 1) % order_u64 != 0 {
        return Err(not_found);
    }
    let cofactor = (q - 1) / order_u64;
    // order is a power of two, so w has order exactly 2N iff w^N = -1.
    for g in 2..q.min(ROOT_SEARCH_LIMIT) {
        let w = pow_mod(modulus, g, cofactor);
        if pow_mod(modulus, w, order_u64 / 2) == q - 1 {
            return Ok(w);
        }
    }
    Err(not_found)
}
