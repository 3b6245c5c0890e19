// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::errors::FheError;

/// Homomorphic operations a circuit is evaluated with.
///
/// All operations use the one parameter set the implementation was built for. Ciphertexts
/// are values: every operation returns a fresh ciphertext and never aliases its inputs.
pub trait CiphertextAlgebra {
    type Ciphertext: Clone;
    type Plaintext;

    fn encode(&self, values: &[i64]) -> Result<Self::Plaintext, FheError>;

    fn decode(&self, plaintext: &Self::Plaintext) -> Result<Vec<i64>, FheError>;

    fn encrypt(&self, plaintext: &Self::Plaintext) -> Result<Self::Ciphertext, FheError>;

    fn decrypt(&self, ciphertext: &Self::Ciphertext) -> Result<Self::Plaintext, FheError>;

    fn add(
        &self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, FheError>;

    fn subtract(
        &self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, FheError>;

    /// Product before relinearization; callers relinearize explicitly.
    fn multiply(
        &self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, FheError>;

    fn relinearize_inplace(&self, ciphertext: &mut Self::Ciphertext) -> Result<(), FheError>;

    fn negate(&self, a: &Self::Ciphertext) -> Result<Self::Ciphertext, FheError>;

    /// Remaining noise budget in bits. Diagnostic only.
    fn noise_budget(&self, ciphertext: &Self::Ciphertext) -> Result<usize, FheError>;

    /// Coefficients of every ciphertext component in coefficient form, concatenated
    /// component by component and, within a component, modulus by modulus.
    fn ring_embedding(&self, ciphertext: &Self::Ciphertext) -> Vec<u64>;

    /// `Enc(value)` in the constant coefficient.
    fn encrypt_value(&self, value: i64) -> Result<Self::Ciphertext, FheError> {
        let pt = self.encode(&[value])?;
        self.encrypt(&pt)
    }

    /// Decrypts and returns the constant coefficient.
    fn decrypt_value(&self, ciphertext: &Self::Ciphertext) -> Result<i64, FheError> {
        let pt = self.decrypt(ciphertext)?;
        self.decode(&pt)?
            .first()
            .copied()
            .ok_or(FheError::EmptyPlaintext)
    }
}
