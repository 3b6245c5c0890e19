// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::algebra::CiphertextAlgebra;
use crate::errors::FheError;
use fhe::bfv::{
    BfvParameters, Ciphertext, Encoding, Plaintext, PublicKey, RelinearizationKey, SecretKey,
};
use fhe_math::rq::Representation;
use fhe_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
use num_bigint::BigUint;
use rand_chacha::ChaCha20Rng;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace};
use zkhe_fhe_params::ZkhePreset;

pub type SharedRng = Arc<Mutex<ChaCha20Rng>>;

pub(crate) fn lock_rng(rng: &SharedRng) -> Result<MutexGuard<'_, ChaCha20Rng>, FheError> {
    rng.lock().map_err(|_| FheError::RngPoisoned)
}

/// Fhe library adaptor.
///
/// Owns a fresh BFV key set for one parameter set. Values are encoded into the constant
/// coefficient (`Encoding::poly()`), encryption uses the public key.
pub struct BfvAlgebra {
    params: Arc<BfvParameters>,
    sk: SecretKey,
    pk: PublicKey,
    rk: RelinearizationKey,
    rng: SharedRng,
}

impl BfvAlgebra {
    pub fn new(params: Arc<BfvParameters>, rng: SharedRng) -> Result<Self, FheError> {
        let (sk, pk, rk) = {
            let mut guard = lock_rng(&rng)?;
            let sk = SecretKey::random(&params, &mut *guard);
            let pk = PublicKey::new(&sk, &mut *guard);
            let rk = RelinearizationKey::new(&sk, &mut *guard)?;
            (sk, pk, rk)
        };
        debug!(
            degree = params.degree(),
            plaintext = params.plaintext(),
            moduli = params.moduli().len(),
            "generated BFV key set"
        );
        Ok(Self {
            params,
            sk,
            pk,
            rk,
            rng,
        })
    }

    pub fn from_preset(preset: ZkhePreset, rng: SharedRng) -> Result<Self, FheError> {
        Self::new(preset.he_params()?, rng)
    }

    pub fn params(&self) -> &Arc<BfvParameters> {
        &self.params
    }

    /// `log2(Q / t)`, the budget of a noiseless ciphertext.
    fn capacity_bits(&self) -> usize {
        let q: BigUint = self.params.moduli().iter().map(|&m| BigUint::from(m)).product();
        let t_bits = (u64::BITS - self.params.plaintext().leading_zeros()) as usize;
        (q.bits() as usize).saturating_sub(t_bits)
    }
}

impl CiphertextAlgebra for BfvAlgebra {
    type Ciphertext = Ciphertext;
    type Plaintext = Plaintext;

    fn encode(&self, values: &[i64]) -> Result<Plaintext, FheError> {
        Ok(Plaintext::try_encode(values, Encoding::poly(), &self.params)?)
    }

    fn decode(&self, plaintext: &Plaintext) -> Result<Vec<i64>, FheError> {
        Ok(Vec::<i64>::try_decode(plaintext, Encoding::poly())?)
    }

    fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, FheError> {
        let mut rng = lock_rng(&self.rng)?;
        Ok(self.pk.try_encrypt(plaintext, &mut *rng)?)
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Plaintext, FheError> {
        Ok(self.sk.try_decrypt(ciphertext)?)
    }

    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError> {
        Ok(a + b)
    }

    fn subtract(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError> {
        Ok(a - b)
    }

    fn multiply(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError> {
        Ok(a * b)
    }

    fn relinearize_inplace(&self, ciphertext: &mut Ciphertext) -> Result<(), FheError> {
        if ciphertext.c.len() > 2 {
            self.rk.relinearizes(ciphertext)?;
            trace!("relinearized ciphertext");
        }
        Ok(())
    }

    fn negate(&self, a: &Ciphertext) -> Result<Ciphertext, FheError> {
        Ok(-a)
    }

    fn noise_budget(&self, ciphertext: &Ciphertext) -> Result<usize, FheError> {
        // SAFETY: variable-time in the noise; only used for diagnostics on our own key.
        let noise = unsafe { self.sk.measure_noise(ciphertext)? };
        Ok(self.capacity_bits().saturating_sub(noise + 1))
    }

    fn ring_embedding(&self, ciphertext: &Ciphertext) -> Vec<u64> {
        let mut stream = Vec::new();
        for component in ciphertext.c.iter() {
            let mut poly = component.clone();
            poly.change_representation(Representation::PowerBasis);
            for row in poly.coefficients().outer_iter() {
                stream.extend(row.iter().copied());
            }
        }
        stream
    }
}
