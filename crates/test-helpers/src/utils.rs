// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, EnvFilter};
use zkhe_fhe::SharedRng;

pub fn create_shared_rng_from_u64(value: u64) -> SharedRng {
    Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(value)))
}

pub fn create_seed_from_u64(value: u64) -> <ChaCha20Rng as SeedableRng>::Seed {
    ChaCha20Rng::seed_from_u64(value).get_seed()
}

/// Installs an `info` level subscriber writing to the test harness for as long as the
/// guard lives.
pub fn init_test_tracing() -> DefaultGuard {
    let subscriber = fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_seeded_rngs_are_reproducible() {
        let a = create_shared_rng_from_u64(7);
        let b = create_shared_rng_from_u64(7);
        let x = a.lock().map(|mut r| r.next_u64()).unwrap_or_default();
        let y = b.lock().map(|mut r| r.next_u64()).unwrap_or_default();
        assert_eq!(x, y);
        assert_eq!(create_seed_from_u64(1), create_seed_from_u64(1));
        assert_ne!(create_seed_from_u64(1), create_seed_from_u64(2));
    }
}
