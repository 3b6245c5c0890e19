// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Modulus chains: the RNS primes and ring degree shared by a family of polynomials.

use crate::errors::PolynomialError;
use fhe_math::zq::Modulus;
use num_bigint::BigUint;
use std::fmt;

/// Largest modulus width supported by the fhe-math Barrett arithmetic.
pub const MAX_MODULUS_BITS: u32 = 62;

/// An ordered sequence of prime moduli `q_1..q_k` together with the ring degree `N`.
///
/// Every polynomial built on a chain lives in `Z_{q_1 ⋯ q_k}[X]/(X^N + 1)`.
/// Each modulus must satisfy `q_i ≡ 1 (mod 2N)` so that the negacyclic NTT exists.
#[derive(Clone)]
pub struct ModulusChain {
    degree: usize,
    values: Vec<u64>,
    moduli: Vec<Modulus>,
}

impl ModulusChain {
    /// Builds a chain, validating the degree and each modulus.
    ///
    /// # Errors
    ///
    /// Returns [`PolynomialError::InvalidChain`] if the degree is not a power of two
    /// (at least 2), the list is empty, contains duplicates, or a modulus is
    /// wider than [`MAX_MODULUS_BITS`] or not `1 mod 2N`.
    pub fn new(degree: usize, moduli: &[u64]) -> Result<Self, PolynomialError> {
        if degree < 2 || !degree.is_power_of_two() {
            return Err(PolynomialError::InvalidChain {
                message: format!("degree {degree} is not a power of two >= 2"),
            });
        }
        if moduli.is_empty() {
            return Err(PolynomialError::InvalidChain {
                message: "at least one modulus is required".to_string(),
            });
        }

        let two_n = 2 * degree as u64;
        let mut checked = Vec::with_capacity(moduli.len());
        for (i, &q) in moduli.iter().enumerate() {
            if moduli[..i].contains(&q) {
                return Err(PolynomialError::InvalidChain {
                    message: format!("modulus {q} appears more than once"),
                });
            }
            if q < 3 || 64 - q.leading_zeros() > MAX_MODULUS_BITS {
                return Err(PolynomialError::InvalidChain {
                    message: format!("modulus {q} must be in [3, 2^{MAX_MODULUS_BITS})"),
                });
            }
            if q % two_n != 1 {
                return Err(PolynomialError::InvalidChain {
                    message: format!("modulus {q} is not 1 mod {two_n}"),
                });
            }
            checked.push(Modulus::new(q)?);
        }

        Ok(Self {
            degree,
            values: moduli.to_vec(),
            moduli: checked,
        })
    }

    /// Ring degree `N`.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of moduli `k`.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Modulus values in chain order.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// fhe-math moduli in chain order.
    pub fn moduli(&self) -> &[Modulus] {
        &self.moduli
    }

    pub fn modulus(&self, i: usize) -> &Modulus {
        &self.moduli[i]
    }

    /// Smallest modulus of the chain.
    pub fn min_modulus(&self) -> u64 {
        self.values.iter().copied().min().unwrap_or_default()
    }

    /// The composite modulus `Q = q_1 ⋯ q_k`.
    pub fn product(&self) -> BigUint {
        self.values.iter().map(|&q| BigUint::from(q)).product()
    }

    /// `Q` as a `u64` when it fits.
    pub fn product_u64(&self) -> Option<u64> {
        self.values
            .iter()
            .try_fold(1u64, |acc, &q| acc.checked_mul(q))
    }

    /// Total number of residues `N * k` held by a polynomial on this chain.
    pub fn size(&self) -> usize {
        self.degree * self.values.len()
    }
}

impl PartialEq for ModulusChain {
    fn eq(&self, other: &Self) -> bool {
        self.degree == other.degree && self.values == other.values
    }
}

impl Eq for ModulusChain {}

impl fmt::Debug for ModulusChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModulusChain")
            .field("degree", &self.degree)
            .field("moduli", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q1: u64 = 0x3ffffe81;
    const Q2: u64 = 0x3ffff781;

    #[test]
    fn test_valid_chain() {
        let chain = ModulusChain::new(16, &[Q1, Q2]).unwrap();
        assert_eq!(chain.degree(), 16);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.values(), &[Q1, Q2]);
        assert_eq!(chain.min_modulus(), Q2);
        assert_eq!(chain.size(), 32);
        assert_eq!(chain.product(), BigUint::from(Q1) * BigUint::from(Q2));
        assert_eq!(chain.product_u64(), Some(Q1 * Q2));
    }

    #[test]
    fn test_rejects_bad_degree() {
        assert!(matches!(
            ModulusChain::new(12, &[Q1]),
            Err(PolynomialError::InvalidChain { .. })
        ));
        assert!(ModulusChain::new(1, &[Q1]).is_err());
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(ModulusChain::new(16, &[Q1, Q1]).is_err());
        assert!(ModulusChain::new(16, &[]).is_err());
    }

    #[test]
    fn test_rejects_moduli_without_negacyclic_roots() {
        // 0x3ffffe81 is 1 mod 128 but not 1 mod 4096.
        assert!(ModulusChain::new(2048, &[Q1]).is_err());
        assert!(ModulusChain::new(16, &[1 << 63]).is_err());
    }

    #[test]
    fn test_equality_ignores_identity() {
        let a = ModulusChain::new(16, &[Q1, Q2]).unwrap();
        let b = ModulusChain::new(16, &[Q1, Q2]).unwrap();
        let c = ModulusChain::new(16, &[Q2, Q1]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
