// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zkhe_circuit::{
    Circuit, CircuitError, CircuitStage, Instruction, MalformedReason, NoisePolicy, Program,
};
use zkhe_fhe::BfvAlgebra;
use zkhe_r1cs::Variable;
use zkhe_test_helpers::{encrypt_variables, init_test_tracing, Fixture, SCENARIO_A};
use zkhe_zk_prover::BfvRinocchio;

fn built(
    fx: Fixture,
    source: &str,
    policy: NoisePolicy,
) -> Result<(Circuit<BfvAlgebra>, BfvRinocchio)> {
    let program = Program::parse(source)?;
    let pool = program.encrypt_constants(&fx.algebra)?;
    let mut circuit = Circuit::new(fx.algebra, &fx.ctx, policy);
    circuit.create_circuit(program.instructions, pool)?;
    Ok((circuit, fx.system))
}

#[test]
fn test_structural_pass_shapes() -> Result<()> {
    let _guard = init_test_tracing();
    let (circuit, _) = built(Fixture::insecure(1)?, SCENARIO_A, NoisePolicy::default())?;

    assert_eq!(circuit.stage(), CircuitStage::StructurallyBuilt);
    // two additions over a pool spanning registers 0..=4
    assert_eq!(circuit.size(), 7);
    let cs = circuit.constraint_system();
    assert_eq!(cs.num_variables(), 7);
    assert_eq!(cs.num_inputs(), 6);
    assert_eq!(cs.num_constraints(), 2);

    // (r2 + r3) * r0 = r5
    let first = &cs.constraints()[0];
    assert_eq!(first.a.coefficient(Variable::new(3)), 1);
    assert_eq!(first.a.coefficient(Variable::new(4)), 1);
    assert_eq!(first.b.coefficient(Variable::new(1)), 1);
    assert_eq!(first.c.coefficient(Variable::new(6)), 1);
    Ok(())
}

#[test]
fn test_pipeline_through_every_stage() -> Result<()> {
    let _guard = init_test_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let (mut circuit, system) = built(Fixture::insecure(2)?, SCENARIO_A, NoisePolicy::default())?;

    circuit.execute(&Default::default())?;
    assert_eq!(circuit.stage(), CircuitStage::Executed);
    assert_eq!(circuit.output_index(), Some(6));
    assert!(circuit.constraint_system().is_satisfied());

    let (pk, vk) = circuit.generate_keys(&system, &mut rng)?;
    let proof = circuit.prove(&system, &pk, &mut rng)?;
    assert_eq!(circuit.stage(), CircuitStage::Proved);
    assert!(circuit.verify(&system, &vk, &proof)?);
    assert_eq!(circuit.stage(), CircuitStage::Verified);

    let results = circuit.results()?;
    assert_eq!(results.output_index, 6);
    assert_eq!(results.value, 12);
    assert!(results.satisfied);
    assert!(results.noise_budget > 0);
    Ok(())
}

#[test]
fn test_operations_out_of_order() -> Result<()> {
    let fx = Fixture::insecure(3)?;
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let mut circuit = Circuit::new(fx.algebra, &fx.ctx, NoisePolicy::default());

    assert!(matches!(
        circuit.execute(&Default::default()),
        Err(CircuitError::NotReady {
            expected: CircuitStage::StructurallyBuilt,
            actual: CircuitStage::Uninitialized
        })
    ));
    assert!(matches!(
        circuit.generate_keys(&fx.system, &mut rng),
        Err(CircuitError::NotReady { .. })
    ));
    assert!(matches!(
        circuit.results(),
        Err(CircuitError::NotReady {
            expected: CircuitStage::Verified,
            ..
        })
    ));

    let program = Program::parse(SCENARIO_A)?;
    let pool = program.encrypt_constants(circuit.algebra())?;
    circuit.create_circuit(program.instructions.clone(), pool.clone())?;
    assert!(matches!(
        circuit.create_circuit(program.instructions, pool),
        Err(CircuitError::NotReady {
            expected: CircuitStage::Uninitialized,
            actual: CircuitStage::StructurallyBuilt
        })
    ));

    let (pk, _) = circuit.generate_keys(&fx.system, &mut rng)?;
    assert!(matches!(
        circuit.prove(&fx.system, &pk, &mut rng),
        Err(CircuitError::NotReady {
            expected: CircuitStage::Executed,
            actual: CircuitStage::StructurallyBuilt
        })
    ));
    Ok(())
}

#[test]
fn test_malformed_circuit_leaves_nothing_behind() -> Result<()> {
    let fx = Fixture::insecure(4)?;
    let program = Program::default();
    let pool = program.encrypt_constants(&fx.algebra)?;
    let mut circuit = Circuit::new(fx.algebra, &fx.ctx, NoisePolicy::default());

    let instructions = vec![
        Instruction::Add { a: 0, b: 1, one: 0, result: 2 },
        Instruction::Multiply { a: 2, b: 2, result: 40 },
    ];
    let err = circuit.create_circuit(instructions, pool).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::MalformedInstruction {
            position: 1,
            reason: MalformedReason::IndexOutOfRange { index: 40, size: 4 }
        }
    ));
    assert_eq!(circuit.stage(), CircuitStage::Uninitialized);
    assert_eq!(circuit.constraint_system().num_constraints(), 0);
    assert!(circuit.instructions().is_empty());
    Ok(())
}

#[test]
fn test_assign_aliases_its_source() -> Result<()> {
    let source = "$r2 := x\n$r3 := r2\n$r4 := $r3 * $r3\n";
    let (mut circuit, _) = built(Fixture::insecure(5)?, source, NoisePolicy::default())?;

    // r3 aliases r2, so the product reads variable 3 (register 2) on both sides
    let product = &circuit.constraint_system().constraints()[0];
    assert_eq!(product.a.coefficient(Variable::new(3)), 1);
    assert_eq!(product.a.coefficient(Variable::new(4)), 0);
    assert_eq!(product.b.coefficient(Variable::new(3)), 1);

    let vars = encrypt_variables(circuit.algebra(), &[('x', 6)])?;
    circuit.execute(&vars)?;
    assert!(circuit.constraint_system().is_satisfied());
    assert_eq!(circuit.ring_value(3), circuit.ring_value(2));
    assert_eq!(circuit.output_index(), Some(4));
    Ok(())
}

#[test]
fn test_execute_rejects_missing_variable() -> Result<()> {
    let source = "$r2 := x\n$r3 := y\n$r4 := $r2 + $r3\n";
    let (mut circuit, _) = built(Fixture::insecure(6)?, source, NoisePolicy::default())?;
    let vars = encrypt_variables(circuit.algebra(), &[('x', 1)])?;

    assert!(matches!(
        circuit.execute(&vars),
        Err(CircuitError::MalformedInstruction {
            position: 1,
            reason: MalformedReason::UnknownVariable('y')
        })
    ));
    assert_eq!(circuit.stage(), CircuitStage::StructurallyBuilt);
    Ok(())
}

#[test]
fn test_noise_policy_trips() -> Result<()> {
    let policy = NoisePolicy {
        relinearize: true,
        min_budget_bits: Some(10_000),
    };
    let source = "$r2 := 3\n$r3 := $r2 * $r2\n";
    let (mut circuit, _) = built(Fixture::insecure(7)?, source, policy)?;

    match circuit.execute(&Default::default()) {
        Err(CircuitError::NoiseBudgetExhausted {
            index, required, ..
        }) => {
            assert_eq!(index, 3);
            assert_eq!(required, 10_000);
        }
        other => panic!("expected an exhausted budget, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_display_lists_instructions() -> Result<()> {
    let (circuit, _) = built(Fixture::insecure(8)?, SCENARIO_A, NoisePolicy::default())?;
    circuit.print_circuit();
    assert_eq!(circuit.to_string(), "$r5 := $r2 + $r3\n$r6 := $r5 + $r4\n");
    Ok(())
}
