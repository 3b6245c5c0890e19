// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;
use zkhe_polynomial::PolynomialError;

#[derive(Debug, Error)]
pub enum RingError {
    #[error("cannot re-set context once set")]
    ContextAlreadySet,

    #[error("context not set")]
    ContextNotSet,

    /// Some RNS slot of the divisor shares a factor with its modulus
    #[error("ring element is not invertible")]
    NotInvertible,

    #[error("Polynomial error: {0}")]
    Polynomial(#[from] PolynomialError),
}
