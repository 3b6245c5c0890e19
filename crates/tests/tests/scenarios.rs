// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zkhe_circuit::{Circuit, CircuitError, CircuitStage, NoisePolicy, Program};
use zkhe_fhe::BfvAlgebra;
use zkhe_test_helpers::{
    encrypt_variables, init_test_tracing, Fixture, SCENARIO_A, SCENARIO_B,
};
use zkhe_zk_prover::{BfvRinocchio, ProofSystem};

type Keys = (
    <BfvRinocchio as ProofSystem>::ProvingKey,
    <BfvRinocchio as ProofSystem>::VerificationKey,
);

/// Builds and executes `source`, returning the circuit with its proof system and keys.
fn executed(
    seed: u64,
    source: &str,
    inputs: &[(char, i64)],
    rng: &mut ChaCha20Rng,
) -> Result<(Circuit<BfvAlgebra>, BfvRinocchio, Keys)> {
    let fx = Fixture::insecure(seed)?;
    let program = Program::parse(source)?;
    let pool = program.encrypt_constants(&fx.algebra)?;
    let variables = encrypt_variables(&fx.algebra, inputs)?;

    let mut circuit = Circuit::new(fx.algebra, &fx.ctx, NoisePolicy::default());
    circuit.create_circuit(program.instructions, pool)?;
    let keys = circuit.generate_keys(&fx.system, rng)?;
    circuit.execute(&variables)?;
    Ok((circuit, fx.system, keys))
}

fn prove_and_verify(
    circuit: &mut Circuit<BfvAlgebra>,
    system: &BfvRinocchio,
    keys: &Keys,
    rng: &mut ChaCha20Rng,
) -> Result<(<BfvRinocchio as ProofSystem>::Proof, bool)> {
    let proof = circuit.prove(system, &keys.0, rng)?;
    let verified = circuit.verify(system, &keys.1, &proof)?;
    Ok((proof, verified))
}

#[test]
fn test_scenario_a_sum_of_constants() -> Result<()> {
    let _guard = init_test_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(100);
    let (mut circuit, system, keys) = executed(1, SCENARIO_A, &[], &mut rng)?;
    assert!(circuit.constraint_system().is_satisfied());

    let (_, verified) = prove_and_verify(&mut circuit, &system, &keys, &mut rng)?;
    assert!(verified);

    let results = circuit.results()?;
    assert_eq!(results.value, 12);
    assert!(results.satisfied);
    Ok(())
}

#[test]
fn test_scenario_b_polynomial_in_two_variables() -> Result<()> {
    let _guard = init_test_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(200);
    let (mut circuit, system, keys) =
        executed(2, SCENARIO_B, &[('x', 3), ('y', 7)], &mut rng)?;
    assert!(circuit.constraint_system().is_satisfied());
    assert_eq!(circuit.constraint_system().num_constraints(), 8);

    let (_, verified) = prove_and_verify(&mut circuit, &system, &keys, &mut rng)?;
    assert!(verified);

    let results = circuit.results()?;
    assert_eq!(results.value, 424);
    assert_eq!(results.output_index, 13);
    Ok(())
}

#[test]
fn test_scenario_c_tampered_witness_is_rejected() -> Result<()> {
    let _guard = init_test_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(300);
    let (mut circuit, system, keys) =
        executed(3, SCENARIO_B, &[('x', 3), ('y', 7)], &mut rng)?;
    let (_, verified) = prove_and_verify(&mut circuit, &system, &keys, &mut rng)?;
    assert!(verified);

    // the output register is the single private witness
    let witness = circuit.variable(13).context("output variable")?;
    let one = circuit.context().one();
    *circuit.constraint_system_mut().value_mut(witness)? += &one;
    assert!(!circuit.constraint_system().is_satisfied());

    let (_, verified) = prove_and_verify(&mut circuit, &system, &keys, &mut rng)?;
    assert!(!verified);
    assert_eq!(circuit.stage(), CircuitStage::Proved);
    assert!(matches!(
        circuit.results(),
        Err(CircuitError::NotReady {
            expected: CircuitStage::Verified,
            actual: CircuitStage::Proved
        })
    ));
    Ok(())
}

#[test]
fn test_scenario_c_tampered_public_input_is_rejected() -> Result<()> {
    let _guard = init_test_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(400);
    let (mut circuit, system, keys) = executed(4, SCENARIO_A, &[], &mut rng)?;
    let proof = circuit.prove(&system, &keys.0, &mut rng)?;

    // register 5 holds 3 + 4 and is public
    let public = circuit.variable(5).context("intermediate variable")?;
    let one = circuit.context().one();
    *circuit.constraint_system_mut().value_mut(public)? += &one;

    assert!(!circuit.verify(&system, &keys.1, &proof)?);
    Ok(())
}
