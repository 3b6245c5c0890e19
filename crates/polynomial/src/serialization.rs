// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! JSON persistence for [`RnsPolynomial`].
//!
//! ```json
//! { "degree": 4, "ntt": false, "moduli": [17, 41], "coefficients": [[1, 1], [0, 0], [3, 3], [0, 0]] }
//! ```
//!
//! `coefficients` holds one entry per coefficient index; each entry lists the residue of that
//! coefficient modulo every modulus, in chain order.

use crate::chain::ModulusChain;
use crate::errors::PolynomialError;
use crate::rns_polynomial::{Representation, RnsPolynomial};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{Read, Write};
use std::sync::Arc;

#[derive(Serialize)]
struct PolynomialDocument<'a> {
    degree: usize,
    ntt: bool,
    moduli: &'a [u64],
    coefficients: Vec<Vec<u64>>,
}

impl RnsPolynomial {
    fn document(&self) -> PolynomialDocument<'_> {
        let n = self.coeff_count();
        let coefficients = (0..n)
            .map(|j| self.rows().map(|row| row[j]).collect())
            .collect();
        PolynomialDocument {
            degree: n,
            ntt: self.is_ntt(),
            moduli: self.moduli(),
            coefficients,
        }
    }

    /// Encodes the polynomial as a JSON value.
    pub fn to_json(&self) -> Result<Value, PolynomialError> {
        Ok(serde_json::to_value(self.document())?)
    }

    /// Writes the polynomial as pretty-printed JSON.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), PolynomialError> {
        serde_json::to_writer_pretty(writer, &self.document())?;
        Ok(())
    }

    /// Reads a polynomial previously written by [`save`](Self::save).
    pub fn load<R: Read>(reader: R) -> Result<Self, PolynomialError> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json(&value)
    }

    /// Rebuilds a polynomial from its JSON document, validating every field.
    ///
    /// # Errors
    ///
    /// Returns [`PolynomialError::MissingField`] when one of `degree`, `ntt`, `moduli`,
    /// `coefficients` is absent, and [`PolynomialError::InvalidDocument`] for wrong types,
    /// inconsistent lengths or unreduced residues. No partially-built polynomial escapes.
    pub fn from_json(value: &Value) -> Result<Self, PolynomialError> {
        let doc = value
            .as_object()
            .ok_or_else(|| PolynomialError::invalid_document("top level is not an object"))?;

        let degree = field(doc, "degree")?
            .as_u64()
            .ok_or_else(|| PolynomialError::invalid_document("`degree` is not an integer"))?
            as usize;
        let ntt = field(doc, "ntt")?
            .as_bool()
            .ok_or_else(|| PolynomialError::invalid_document("`ntt` is not a boolean"))?;
        let moduli = field(doc, "moduli")?
            .as_array()
            .ok_or_else(|| PolynomialError::invalid_document("`moduli` is not an array"))?
            .iter()
            .map(|v| {
                v.as_u64()
                    .ok_or_else(|| PolynomialError::invalid_document("modulus is not an integer"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let entries = field(doc, "coefficients")?
            .as_array()
            .ok_or_else(|| PolynomialError::invalid_document("`coefficients` is not an array"))?;

        if entries.len() != degree {
            return Err(PolynomialError::invalid_document(format!(
                "expected {degree} coefficient entries, found {}",
                entries.len()
            )));
        }

        let chain = Arc::new(ModulusChain::new(degree, &moduli)?);
        let k = moduli.len();
        let mut data = vec![0u64; degree * k];
        for (j, entry) in entries.iter().enumerate() {
            let residues = entry.as_array().ok_or_else(|| {
                PolynomialError::invalid_document(format!("coefficient {j} is not an array"))
            })?;
            if residues.len() != k {
                return Err(PolynomialError::invalid_document(format!(
                    "coefficient {j} has {} residues, expected {k}",
                    residues.len()
                )));
            }
            for (i, r) in residues.iter().enumerate() {
                data[i * degree + j] = r.as_u64().ok_or_else(|| {
                    PolynomialError::invalid_document(format!(
                        "residue {i} of coefficient {j} is not an integer"
                    ))
                })?;
            }
        }

        let representation = if ntt {
            Representation::Evaluation
        } else {
            Representation::Coefficient
        };
        RnsPolynomial::from_coefficients(&chain, data, representation)
    }
}

fn field<'a>(doc: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, PolynomialError> {
    doc.get(name).ok_or(PolynomialError::MissingField(name))
}
