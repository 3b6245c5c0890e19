// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::builder::{build_bfv_params_arc, build_encoding_params, build_proof_chain};
use crate::constants::{insecure_16, standard_2048};
use fhe::bfv::BfvParameters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error as ThisError;
use zkhe_polynomial::ModulusChain;

/// zkhe preset configurations
///
/// A preset ties together the three parameter sets a proof of homomorphic evaluation needs:
///
/// **Proof ring**: the RNS ring `Z_Q[X]/(X^N + 1)` in which constraint-system variables live.
/// Ciphertexts are embedded into it before the constraint system is populated.
///
/// **Scheme parameters**: the BFV parameters under which the circuit inputs are encrypted
/// and the circuit is evaluated.
///
/// **Encoding parameters**: one BFV parameter set per proof modulus `q_i`, with plaintext
/// modulus `q_i`, used as the linear-only encoding of the proof system's reference string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZkhePreset {
    /// Proof degree 16, scheme degree 2048 - DO NOT USE IN PRODUCTION
    #[serde(rename = "INSECURE_TEST_16")]
    InsecureTest16,
    /// Proof degree 2048, scheme degree 8192
    #[default]
    #[serde(rename = "STANDARD_2048")]
    Standard2048,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    Insecure,
    Standard,
}

/// Metadata describing a preset
#[derive(Debug, Clone, Copy)]
pub struct PresetMetadata {
    pub name: &'static str,
    pub security_level: SecurityLevel,
    /// Degree `N` of the proof ring
    pub proof_degree: usize,
    /// Degree of the BFV scheme ring
    pub he_degree: usize,
    /// Degree of the encoding ring (`4N`)
    pub encoding_degree: usize,
}

#[derive(ThisError, Debug)]
pub enum PresetError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Failed to build BFV parameters: {0}")]
    Fhe(#[from] fhe::Error),
    #[error("Invalid proof ring: {0}")]
    Polynomial(#[from] zkhe_polynomial::PolynomialError),
    #[error("Encoding degree {degree} cannot hold {slots} slots")]
    EncodingTooSmall { degree: usize, slots: usize },
}

/// A complete BFV parameter set definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfvParamSet {
    /// Ring degree, a power of two
    pub degree: usize,
    /// Plaintext modulus
    pub plaintext_modulus: u64,
    /// NTT-friendly ciphertext moduli
    pub moduli: &'static [u64],
}

/// The proof ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofParamSet {
    pub degree: usize,
    pub moduli: &'static [u64],
}

/// Ciphertext side of the encoding parameters; plaintext moduli come from the proof ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingParamSet {
    pub degree: usize,
    pub moduli: &'static [u64],
}

impl BfvParamSet {
    pub fn build_arc(self) -> Result<Arc<BfvParameters>, PresetError> {
        build_bfv_params_arc(self.degree, self.plaintext_modulus, self.moduli)
    }
}

impl ZkhePreset {
    pub const ALL: [ZkhePreset; 2] = [ZkhePreset::InsecureTest16, ZkhePreset::Standard2048];

    pub fn from_name(name: &str) -> Result<Self, PresetError> {
        let normalized = name.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "INSECURE_TEST_16" => Ok(Self::InsecureTest16),
            "STANDARD_2048" => Ok(Self::Standard2048),
            _ => Err(PresetError::UnknownPreset(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZkhePreset::InsecureTest16 => "INSECURE_TEST_16",
            ZkhePreset::Standard2048 => "STANDARD_2048",
        }
    }

    pub fn list() -> Vec<&'static str> {
        Self::ALL.iter().map(ZkhePreset::name).collect()
    }

    pub fn metadata(&self) -> PresetMetadata {
        let (security_level, proof, he, encoding) = match self {
            ZkhePreset::InsecureTest16 => (
                SecurityLevel::Insecure,
                insecure_16::proof::DEGREE,
                insecure_16::he::DEGREE,
                insecure_16::encoding::DEGREE,
            ),
            ZkhePreset::Standard2048 => (
                SecurityLevel::Standard,
                standard_2048::proof::DEGREE,
                standard_2048::he::DEGREE,
                standard_2048::encoding::DEGREE,
            ),
        };
        PresetMetadata {
            name: self.name(),
            security_level,
            proof_degree: proof,
            he_degree: he,
            encoding_degree: encoding,
        }
    }

    pub fn proof_param_set(&self) -> ProofParamSet {
        match self {
            ZkhePreset::InsecureTest16 => ProofParamSet {
                degree: insecure_16::proof::DEGREE,
                moduli: insecure_16::proof::MODULI,
            },
            ZkhePreset::Standard2048 => ProofParamSet {
                degree: standard_2048::proof::DEGREE,
                moduli: standard_2048::proof::MODULI,
            },
        }
    }

    pub fn he_param_set(&self) -> BfvParamSet {
        match self {
            ZkhePreset::InsecureTest16 => BfvParamSet {
                degree: insecure_16::he::DEGREE,
                plaintext_modulus: insecure_16::he::PLAINTEXT_MODULUS,
                moduli: insecure_16::he::MODULI,
            },
            ZkhePreset::Standard2048 => BfvParamSet {
                degree: standard_2048::he::DEGREE,
                plaintext_modulus: standard_2048::he::PLAINTEXT_MODULUS,
                moduli: standard_2048::he::MODULI,
            },
        }
    }

    pub fn encoding_param_set(&self) -> EncodingParamSet {
        match self {
            ZkhePreset::InsecureTest16 => EncodingParamSet {
                degree: insecure_16::encoding::DEGREE,
                moduli: insecure_16::encoding::MODULI,
            },
            ZkhePreset::Standard2048 => EncodingParamSet {
                degree: standard_2048::encoding::DEGREE,
                moduli: standard_2048::encoding::MODULI,
            },
        }
    }

    pub fn proof_chain(&self) -> Result<ModulusChain, PresetError> {
        build_proof_chain(self.proof_param_set())
    }

    pub fn he_params(&self) -> Result<Arc<BfvParameters>, PresetError> {
        self.he_param_set().build_arc()
    }

    /// One encoding parameter set per proof modulus, in chain order.
    pub fn encoding_params(&self) -> Result<Vec<Arc<BfvParameters>>, PresetError> {
        build_encoding_params(self.encoding_param_set(), self.proof_param_set())
    }
}

impl FromStr for ZkhePreset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for ZkhePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
