// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Utility functions for modular arithmetic on residues.

use fhe_math::zq::Modulus;

/// Computes `base^exp mod q` by square-and-multiply.
///
/// `base` must already be reduced modulo `q`.
pub fn pow_mod(m: &Modulus, base: u64, mut exp: u64) -> u64 {
    let mut result = 1 % m.modulus();
    let mut acc = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = m.mul(result, acc);
        }
        acc = m.mul(acc, acc);
        exp >>= 1;
    }
    result
}

/// Reverses the lowest `bits` bits of `x`.
pub fn bit_reverse(x: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    x.reverse_bits() >> (usize::BITS - bits)
}

/// Reduces a signed integer into `[0, q)`.
pub fn reduce_i64(x: i64, q: u64) -> u64 {
    let r = (x as i128).rem_euclid(q as i128);
    r as u64
}

/// Lifts a residue in `[0, q)` to its centered representative in `(-q/2, q/2]`.
pub fn center(x: u64, q: u64) -> i64 {
    if x > q / 2 {
        -((q - x) as i64)
    } else {
        x as i64
    }
}
