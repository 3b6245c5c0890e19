// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::create_shared_rng_from_u64;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use zkhe_fhe::{BfvAlgebra, CiphertextAlgebra, ZkhePreset};
use zkhe_ring::RingContext;
use zkhe_zk_prover::{BfvEncoding, BfvRinocchio};

/// `3 + 4 + 5`.
pub const SCENARIO_A: &str = "\
$r2 := 3
$r3 := 4
$r4 := 5
$r5 := $r2 + $r3
$r6 := $r5 + $r4
";

/// `7x^3 + 5y^2 - y - x`, which is `424` at `x = 3`, `y = 7`.
pub const SCENARIO_B: &str = "\
$r2 := 7
$r3 := 5
$r4 := x
$r5 := y
$r6 := $r4 * $r4
$r7 := $r6 * $r4
$r8 := $r7 * $r2
$r9 := $r5 * $r5
$r10 := $r9 * $r3
$r11 := $r8 + $r10
$r12 := $r11 - $r5
$r13 := $r12 - $r4
";

/// Everything a circuit needs under one preset: the scheme, the proof ring and the proof
/// system built over that ring.
pub struct Fixture {
    pub preset: ZkhePreset,
    pub ctx: Arc<RingContext>,
    pub algebra: BfvAlgebra,
    pub system: BfvRinocchio,
}

impl Fixture {
    pub fn new(preset: ZkhePreset, seed: u64) -> Result<Self> {
        let ctx = RingContext::new(preset.proof_chain()?)?;
        let algebra = BfvAlgebra::from_preset(preset, create_shared_rng_from_u64(seed))?;
        let system = BfvRinocchio::new(BfvEncoding::from_preset(preset, &ctx)?);
        Ok(Self {
            preset,
            ctx,
            algebra,
            system,
        })
    }

    /// The smallest preset, for tests.
    pub fn insecure(seed: u64) -> Result<Self> {
        Self::new(ZkhePreset::InsecureTest16, seed)
    }
}

/// Encrypts named inputs.
pub fn encrypt_variables<A: CiphertextAlgebra>(
    algebra: &A,
    values: &[(char, i64)],
) -> Result<HashMap<char, A::Ciphertext>> {
    values
        .iter()
        .map(|&(name, value)| Ok((name, algebra.encrypt_value(value)?)))
        .collect()
}
