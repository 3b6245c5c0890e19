// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::presets::{EncodingParamSet, PresetError, ProofParamSet};
use fhe::bfv::{BfvParameters, BfvParametersBuilder};
use std::sync::Arc;
use zkhe_polynomial::ModulusChain;

pub fn build_bfv_params(
    degree: usize,
    plaintext_modulus: u64,
    moduli: &[u64],
) -> Result<BfvParameters, PresetError> {
    Ok(BfvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli(moduli)
        .build()?)
}

pub fn build_bfv_params_arc(
    degree: usize,
    plaintext_modulus: u64,
    moduli: &[u64],
) -> Result<Arc<BfvParameters>, PresetError> {
    Ok(BfvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli(moduli)
        .build_arc()?)
}

pub fn build_proof_chain(set: ProofParamSet) -> Result<ModulusChain, PresetError> {
    Ok(ModulusChain::new(set.degree, set.moduli)?)
}

/// Builds one BFV parameter set per proof modulus, with that modulus as plaintext modulus.
///
/// # Errors
///
/// Returns [`PresetError::EncodingTooSmall`] when the encoding ring has fewer SIMD slots
/// than the proof ring has coefficients.
pub fn build_encoding_params(
    encoding: EncodingParamSet,
    proof: ProofParamSet,
) -> Result<Vec<Arc<BfvParameters>>, PresetError> {
    if encoding.degree < proof.degree {
        return Err(PresetError::EncodingTooSmall {
            degree: encoding.degree,
            slots: proof.degree,
        });
    }
    proof
        .moduli
        .iter()
        .map(|&q| build_bfv_params_arc(encoding.degree, q, encoding.moduli))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::insecure_16;

    #[test]
    fn test_build_he_params() {
        let params = build_bfv_params(
            insecure_16::he::DEGREE,
            insecure_16::he::PLAINTEXT_MODULUS,
            insecure_16::he::MODULI,
        )
        .unwrap();
        assert_eq!(params.degree(), insecure_16::he::DEGREE);
        assert_eq!(params.plaintext(), insecure_16::he::PLAINTEXT_MODULUS);
        assert_eq!(params.moduli(), insecure_16::he::MODULI);
    }

    #[test]
    fn test_invalid_degree_is_an_error() {
        assert!(matches!(
            build_bfv_params_arc(100, insecure_16::he::PLAINTEXT_MODULUS, insecure_16::he::MODULI),
            Err(PresetError::Fhe(_))
        ));
    }

    #[test]
    fn test_encoding_must_cover_proof_ring() {
        let encoding = EncodingParamSet {
            degree: 8,
            moduli: insecure_16::encoding::MODULI,
        };
        let proof = ProofParamSet {
            degree: insecure_16::proof::DEGREE,
            moduli: insecure_16::proof::MODULI,
        };
        assert!(matches!(
            build_encoding_params(encoding, proof),
            Err(PresetError::EncodingTooSmall { degree: 8, slots: 16 })
        ));
    }

    #[test]
    fn test_invalid_proof_chain() {
        let set = ProofParamSet {
            degree: 16,
            moduli: &[101],
        };
        assert!(matches!(
            build_proof_chain(set),
            Err(PresetError::Polynomial(_))
        ));
    }
}
