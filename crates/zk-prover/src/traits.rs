// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::ZkError;
use rand::{CryptoRng, RngCore};
use zkhe_r1cs::R1cs;
use zkhe_ring::RingElement;

/// A preprocessing proof system for rank-1 constraint systems over the proof ring.
pub trait ProofSystem {
    type ProvingKey;
    type VerificationKey;
    type Proof;

    fn generate_keys<R: RngCore + CryptoRng>(
        &self,
        r1cs: &R1cs,
        rng: &mut R,
    ) -> Result<(Self::ProvingKey, Self::VerificationKey), ZkError>;

    fn prove<R: RngCore + CryptoRng>(
        &self,
        pk: &Self::ProvingKey,
        primary: &[RingElement],
        auxiliary: &[RingElement],
        rng: &mut R,
    ) -> Result<Self::Proof, ZkError>;

    /// `Ok(false)` for a proof that does not verify; `Err` only when verification could not
    /// be carried out.
    fn verify(
        &self,
        vk: &Self::VerificationKey,
        primary: &[RingElement],
        proof: &Self::Proof,
    ) -> Result<bool, ZkError>;
}

/// An encoding of ring elements that supports only linear operations.
///
/// Anyone holding encodings can add them and scale them by known ring elements; only the
/// holder of the key can encode and decode.
pub trait LinearEncoding {
    type Key;
    type Encoded: Clone + fhe_traits::Serialize;

    fn generate_key<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Self::Key, ZkError>;

    fn encode<R: RngCore + CryptoRng>(
        &self,
        key: &Self::Key,
        value: &RingElement,
        rng: &mut R,
    ) -> Result<Self::Encoded, ZkError>;

    fn decode(&self, key: &Self::Key, encoded: &Self::Encoded) -> Result<RingElement, ZkError>;

    fn add_assign(&self, a: &mut Self::Encoded, b: &Self::Encoded);

    fn scale(&self, a: &Self::Encoded, r: &RingElement) -> Result<Self::Encoded, ZkError>;

    /// `Σ r_i · E(x_i)`; `None` for an empty iterator.
    fn combine<'a, I>(&self, terms: I) -> Result<Option<Self::Encoded>, ZkError>
    where
        I: IntoIterator<Item = (&'a Self::Encoded, &'a RingElement)>,
        Self::Encoded: 'a,
    {
        let mut acc: Option<Self::Encoded> = None;
        for (e, r) in terms {
            let term = self.scale(e, r)?;
            match acc.as_mut() {
                Some(a) => self.add_assign(a, &term),
                None => acc = Some(term),
            }
        }
        Ok(acc)
    }
}
