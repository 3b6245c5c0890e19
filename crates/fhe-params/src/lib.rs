// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Preset definitions and builders for zkhe parameters.

pub mod builder;
pub mod constants;
pub mod presets;

pub use builder::{
    build_bfv_params, build_bfv_params_arc, build_encoding_params, build_proof_chain,
};
pub use presets::{
    BfvParamSet, EncodingParamSet, PresetError, PresetMetadata, ProofParamSet, SecurityLevel,
    ZkhePreset,
};
