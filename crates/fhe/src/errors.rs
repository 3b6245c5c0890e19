// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FheError {
    #[error("FHE error: {0}")]
    Fhe(#[from] fhe::Error),

    #[error("Parameter error: {0}")]
    Preset(#[from] zkhe_fhe_params::PresetError),

    #[error("Random number generator lock poisoned")]
    RngPoisoned,

    #[error("Decoded plaintext is empty")]
    EmptyPlaintext,
}
