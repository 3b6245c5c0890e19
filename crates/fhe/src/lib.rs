// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod algebra;
mod bfv;
mod embedding;
mod errors;

pub use algebra::CiphertextAlgebra;
pub use bfv::{BfvAlgebra, SharedRng};
pub use embedding::embed_ciphertext;
pub use errors::FheError;

// Re-export params so dependents can use zkhe_fhe::ZkhePreset without depending on zkhe-fhe-params.
pub use zkhe_fhe_params::{PresetError, ZkhePreset};
