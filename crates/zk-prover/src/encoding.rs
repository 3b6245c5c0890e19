// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! BFV ciphertexts as a linear-only encoding of proof-ring elements.
//!
//! In evaluation form, row `i` of a ring element is a vector of `N` values modulo `q_i`.
//! Each row is packed into the SIMD slots of a BFV plaintext whose plaintext modulus is
//! `q_i` and encrypted under a symmetric key, so slot-wise ciphertext additions and
//! ciphertext-plaintext products act on the ring element row by row.

use crate::error::ZkError;
use crate::traits::LinearEncoding;
use fhe::bfv::{BfvParameters, Ciphertext, Encoding, Plaintext, SecretKey};
use fhe_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter, Serialize};
use rand::{CryptoRng, RngCore};
use std::sync::Arc;
use tracing::debug;
use zkhe_fhe_params::ZkhePreset;
use zkhe_polynomial::{Representation, RnsPolynomial};
use zkhe_ring::{RingContext, RingElement};

pub struct BfvEncoding {
    ctx: Arc<RingContext>,
    params: Vec<Arc<BfvParameters>>,
}

/// One symmetric key per proof modulus.
pub struct BfvEncodingKey {
    keys: Vec<SecretKey>,
}

/// One ciphertext per proof modulus.
#[derive(Clone, Debug, PartialEq)]
pub struct BfvEncoded {
    rows: Vec<Ciphertext>,
}

impl BfvEncoded {
    pub fn rows(&self) -> &[Ciphertext] {
        &self.rows
    }
}

impl Serialize for BfvEncoded {
    fn to_bytes(&self) -> Vec<u8> {
        self.rows.iter().flat_map(|ct| ct.to_bytes()).collect()
    }
}

impl BfvEncoding {
    /// # Errors
    ///
    /// Returns [`ZkError::EncodingMismatch`] unless there is one parameter set per proof
    /// modulus, with that modulus as plaintext modulus and at least `N` slots.
    pub fn new(ctx: &Arc<RingContext>, params: Vec<Arc<BfvParameters>>) -> Result<Self, ZkError> {
        let chain = ctx.chain();
        if params.len() != chain.len() {
            return Err(ZkError::EncodingMismatch(format!(
                "{} parameter sets for {} moduli",
                params.len(),
                chain.len()
            )));
        }
        for (p, &q) in params.iter().zip(chain.values()) {
            if p.plaintext() != q {
                return Err(ZkError::EncodingMismatch(format!(
                    "plaintext modulus {} does not match proof modulus {q}",
                    p.plaintext()
                )));
            }
            if p.degree() < chain.degree() {
                return Err(ZkError::EncodingMismatch(format!(
                    "degree {} has fewer than {} slots",
                    p.degree(),
                    chain.degree()
                )));
            }
        }
        Ok(Self {
            ctx: ctx.clone(),
            params,
        })
    }

    pub fn from_preset(preset: ZkhePreset, ctx: &Arc<RingContext>) -> Result<Self, ZkError> {
        Self::new(ctx, preset.encoding_params()?)
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    fn rows_of(&self, value: &RingElement) -> RnsPolynomial {
        let mut v = value.clone();
        v.to_poly_inplace();
        v.to_evaluation_form();
        v.into_polynomial()
    }

    fn slots(&self, row: &[u64], params: &Arc<BfvParameters>) -> Result<Plaintext, ZkError> {
        let mut slots = vec![0u64; params.degree()];
        slots[..row.len()].copy_from_slice(row);
        Ok(Plaintext::try_encode(slots.as_slice(), Encoding::simd(), params)?)
    }
}

impl LinearEncoding for BfvEncoding {
    type Key = BfvEncodingKey;
    type Encoded = BfvEncoded;

    fn generate_key<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<BfvEncodingKey, ZkError> {
        let keys = self
            .params
            .iter()
            .map(|p| SecretKey::random(p, &mut *rng))
            .collect();
        debug!(rows = self.params.len(), "generated encoding keys");
        Ok(BfvEncodingKey { keys })
    }

    fn encode<R: RngCore + CryptoRng>(
        &self,
        key: &BfvEncodingKey,
        value: &RingElement,
        rng: &mut R,
    ) -> Result<BfvEncoded, ZkError> {
        let p = self.rows_of(value);
        let rows = p
            .rows()
            .zip(&self.params)
            .zip(&key.keys)
            .map(|((row, params), sk)| {
                let pt = self.slots(row, params)?;
                Ok(sk.try_encrypt(&pt, &mut *rng)?)
            })
            .collect::<Result<Vec<_>, ZkError>>()?;
        Ok(BfvEncoded { rows })
    }

    fn decode(&self, key: &BfvEncodingKey, encoded: &BfvEncoded) -> Result<RingElement, ZkError> {
        let n = self.ctx.degree();
        let mut data = Vec::with_capacity(self.ctx.chain().size());
        for (ct, sk) in encoded.rows.iter().zip(&key.keys) {
            let pt = sk.try_decrypt(ct)?;
            let slots = Vec::<u64>::try_decode(&pt, Encoding::simd())?;
            data.extend_from_slice(&slots[..n]);
        }
        let p = RnsPolynomial::from_coefficients(self.ctx.chain(), data, Representation::Evaluation)?;
        Ok(RingElement::from_polynomial(&self.ctx, p))
    }

    fn add_assign(&self, a: &mut BfvEncoded, b: &BfvEncoded) {
        for (x, y) in a.rows.iter_mut().zip(&b.rows) {
            *x += y;
        }
    }

    fn scale(&self, a: &BfvEncoded, r: &RingElement) -> Result<BfvEncoded, ZkError> {
        let p = self.rows_of(r);
        let rows = a
            .rows
            .iter()
            .zip(p.rows())
            .zip(&self.params)
            .map(|((ct, row), params)| {
                let pt = self.slots(row, params)?;
                Ok(ct * &pt)
            })
            .collect::<Result<Vec<_>, ZkError>>()?;
        Ok(BfvEncoded { rows })
    }
}
