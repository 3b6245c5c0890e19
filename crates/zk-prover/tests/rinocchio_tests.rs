// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;
use zkhe_fhe_params::ZkhePreset;
use zkhe_r1cs::{ConstraintSystem, LinearCombination, Variable};
use zkhe_ring::{RingContext, RingElement};
use zkhe_zk_prover::{BfvEncoding, LinearEncoding, ProofSystem, Rinocchio, ZkError};

fn init_tracing() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let subscriber = fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

fn setup() -> Result<(Arc<RingContext>, Rinocchio<BfvEncoding>)> {
    let preset = ZkhePreset::InsecureTest16;
    let ctx = RingContext::new(preset.proof_chain()?)?;
    let encoding = BfvEncoding::from_preset(preset, &ctx)?;
    Ok((ctx, Rinocchio::new(encoding)))
}

/// `out = x * y + x` with `out` public; ring values are random polynomials.
fn product_system(ctx: &Arc<RingContext>, rng: &mut ChaCha20Rng) -> Result<ConstraintSystem> {
    let mut cs = ConstraintSystem::new(ctx);
    let vars = cs.allocate(4);
    let (out, x, y, xy) = (vars[0], vars[1], vars[2], vars[3]);
    cs.set_public_input_count(1)?;

    let xv = RingElement::random_invertible_element(ctx, rng);
    let yv = RingElement::random_invertible_element(ctx, rng);
    let xyv = &xv * &yv;
    let outv = &xyv + &xv;

    cs.add_constraint(x, y, xy)?;
    cs.add_constraint(xy + x, Variable::ONE, out)?;
    cs.assign(x, xv)?;
    cs.assign(y, yv)?;
    cs.assign(xy, xyv)?;
    cs.assign(out, outv)?;
    assert!(cs.is_satisfied());
    Ok(cs)
}

#[test]
fn test_honest_proof_verifies() -> Result<()> {
    let _guard = init_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let (ctx, system) = setup()?;
    let cs = product_system(&ctx, &mut rng)?;

    let (pk, vk) = system.generate_keys(&cs.r1cs(), &mut rng)?;
    let proof = system.prove(&pk, &cs.primary_input(), &cs.auxiliary_input(), &mut rng)?;
    assert!(proof.size_in_bytes() > 0);
    assert!(system.verify(&vk, &cs.primary_input(), &proof)?);
    Ok(())
}

#[test]
fn test_proofs_are_randomized() -> Result<()> {
    let _guard = init_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(43);
    let (ctx, system) = setup()?;
    let cs = product_system(&ctx, &mut rng)?;

    let (pk, vk) = system.generate_keys(&cs.r1cs(), &mut rng)?;
    let first = system.prove(&pk, &cs.primary_input(), &cs.auxiliary_input(), &mut rng)?;
    let second = system.prove(&pk, &cs.primary_input(), &cs.auxiliary_input(), &mut rng)?;
    assert_ne!(first, second);
    assert!(system.verify(&vk, &cs.primary_input(), &first)?);
    assert!(system.verify(&vk, &cs.primary_input(), &second)?);
    Ok(())
}

#[test]
fn test_wrong_public_input_is_rejected() -> Result<()> {
    let _guard = init_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(44);
    let (ctx, system) = setup()?;
    let cs = product_system(&ctx, &mut rng)?;

    let (pk, vk) = system.generate_keys(&cs.r1cs(), &mut rng)?;
    let proof = system.prove(&pk, &cs.primary_input(), &cs.auxiliary_input(), &mut rng)?;
    let mut forged = cs.primary_input();
    forged[0] += &ctx.one();
    assert!(!system.verify(&vk, &forged, &proof)?);
    Ok(())
}

#[test]
fn test_unsatisfying_witness_fails_verification() -> Result<()> {
    let _guard = init_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(45);
    let (ctx, system) = setup()?;
    let cs = product_system(&ctx, &mut rng)?;

    let (pk, vk) = system.generate_keys(&cs.r1cs(), &mut rng)?;
    let mut auxiliary = cs.auxiliary_input();
    auxiliary[2] += &ctx.one();
    let proof = system.prove(&pk, &cs.primary_input(), &auxiliary, &mut rng)?;
    assert!(!system.verify(&vk, &cs.primary_input(), &proof)?);
    Ok(())
}

#[test]
fn test_tampered_proof_is_rejected() -> Result<()> {
    let _guard = init_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(46);
    let (ctx, system) = setup()?;
    let cs = product_system(&ctx, &mut rng)?;

    let (pk, vk) = system.generate_keys(&cs.r1cs(), &mut rng)?;
    let proof = system.prove(&pk, &cs.primary_input(), &cs.auxiliary_input(), &mut rng)?;

    // Replacing a component breaks its knowledge check.
    let mut swapped = proof.clone();
    swapped.v = proof.w.clone();
    assert!(!system.verify(&vk, &cs.primary_input(), &swapped)?);

    // Shifting both halves of h consistently still breaks divisibility.
    let encoding = system.encoding();
    let mut shifted = proof.clone();
    let h_scaled = encoding.scale(&proof.h, &ctx.scalar(2))?;
    let h_alpha_scaled = encoding.scale(&proof.h_alpha, &ctx.scalar(2))?;
    shifted.h = h_scaled;
    shifted.h_alpha = h_alpha_scaled;
    assert!(!system.verify(&vk, &cs.primary_input(), &shifted)?);
    Ok(())
}

#[test]
fn test_key_generation_preconditions() -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(47);
    let (ctx, system) = setup()?;

    let mut cs = ConstraintSystem::new(&ctx);
    cs.allocate(2);
    assert!(matches!(
        system.generate_keys(&cs.r1cs(), &mut rng),
        Err(ZkError::EmptyConstraintSystem)
    ));

    let cs = product_system(&ctx, &mut rng)?;
    let (pk, vk) = system.generate_keys(&cs.r1cs(), &mut rng)?;
    let proof = system.prove(&pk, &cs.primary_input(), &cs.auxiliary_input(), &mut rng)?;
    assert!(matches!(
        system.verify(&vk, &[], &proof),
        Err(ZkError::InputLength { expected: 1, actual: 0 })
    ));
    assert!(matches!(
        system.prove(&pk, &[], &cs.auxiliary_input(), &mut rng),
        Err(ZkError::R1cs(_))
    ));
    Ok(())
}

#[test]
fn test_constant_only_constraint() -> Result<()> {
    let _guard = init_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(48);
    let (ctx, system) = setup()?;

    let mut cs = ConstraintSystem::new(&ctx);
    let x = cs.allocate(1)[0];
    cs.add_constraint(
        LinearCombination::from_term(x, 2),
        Variable::ONE,
        LinearCombination::from_term(Variable::ONE, 10),
    )?;
    cs.assign(x, ctx.scalar(5))?;

    let (pk, vk) = system.generate_keys(&cs.r1cs(), &mut rng)?;
    let proof = system.prove(&pk, &[], &cs.auxiliary_input(), &mut rng)?;
    assert!(system.verify(&vk, &[], &proof)?);
    Ok(())
}
