// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::timings::{Phase, Timings};
use anyhow::{bail, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};
use zkhe_circuit::{Circuit, CircuitResults, NoisePolicy, Program, Variables};
use zkhe_config::AppConfig;
use zkhe_fhe::{BfvAlgebra, CiphertextAlgebra};
use zkhe_ring::RingContext;
use zkhe_zk_prover::{BfvEncoding, BfvRinocchio};

/// Outcome of one `zkhe` run.
#[derive(Debug)]
pub struct Report {
    pub results: CircuitResults,
    pub constraints: usize,
    pub variables: usize,
    pub proof_bytes: usize,
    pub timings: Timings,
}

/// Reads a program: numeric instructions when the file is `.json`, textual IR otherwise.
pub fn load_program(path: &Path) -> Result<Program> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    let program = if path.extension().is_some_and(|ext| ext == "json") {
        let words: Vec<Vec<i64>> =
            serde_json::from_str(&source).context("Numeric programs are arrays of arrays")?;
        Program::from_numeric(&words)?
    } else {
        Program::parse(&source)?
    };
    Ok(program)
}

fn noise_policy(config: &AppConfig) -> NoisePolicy {
    let noise = config.noise();
    NoisePolicy {
        relinearize: noise.relinearize,
        min_budget_bits: noise.min_budget_bits,
    }
}

/// Parses, builds, executes, proves, verifies and decrypts the program in `file`.
#[instrument(skip_all, fields(file = %file.display()))]
pub fn run(config: &AppConfig, file: &Path, inputs: &[(char, i64)]) -> Result<Report> {
    let mut timings = Timings::new();
    let mut rng = match config.seed() {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };
    let preset = config.preset();
    info!(preset = preset.name(), "starting run");

    let program = timings.time(Phase::Parse, || load_program(file))?;

    let ctx = RingContext::new(preset.proof_chain()?)?;
    let algebra_rng = Arc::new(Mutex::new(ChaCha20Rng::from_seed(rng.gen())));
    let algebra = BfvAlgebra::from_preset(preset, algebra_rng)?;
    let system = BfvRinocchio::new(BfvEncoding::from_preset(preset, &ctx)?);

    let pool = program.encrypt_constants(&algebra)?;
    let mut variables = Variables::new();
    for &(name, value) in inputs {
        variables.insert(name, algebra.encrypt_value(value)?);
    }
    if let Some(missing) = program
        .variables()
        .into_iter()
        .find(|name| !variables.contains_key(name))
    {
        bail!("No value given for variable `{missing}`");
    }

    let mut circuit = Circuit::new(algebra, &ctx, noise_policy(config));
    timings.time(Phase::BuildCircuit, || {
        Ok(circuit.create_circuit(program.instructions, pool)?)
    })?;
    circuit.print_circuit();

    let (pk, vk) = timings.time(Phase::GenerateKeys, || {
        Ok(circuit.generate_keys(&system, &mut rng)?)
    })?;
    timings.time(Phase::Execute, || Ok(circuit.execute(&variables)?))?;
    let proof = timings.time(Phase::Prove, || Ok(circuit.prove(&system, &pk, &mut rng)?))?;
    let verified = timings.time(Phase::Verify, || {
        Ok(circuit.verify(&system, &vk, &proof)?)
    })?;
    if !verified {
        bail!("Proof did not verify");
    }
    let results = timings.time(Phase::Decrypt, || Ok(circuit.results()?))?;

    let cs = circuit.constraint_system();
    Ok(Report {
        results,
        constraints: cs.num_constraints(),
        variables: cs.num_variables(),
        proof_bytes: proof.size_in_bytes(),
        timings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zkhe_fhe::ZkhePreset;

    fn config() -> AppConfig {
        AppConfig {
            preset: ZkhePreset::InsecureTest16,
            seed: Some(5),
            ..AppConfig::default()
        }
    }

    fn program_file(suffix: &str, contents: &str) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
        file.write_all(contents.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn test_runs_textual_program() -> Result<()> {
        let file = program_file(".ir", "$r2 := x\n$r3 := 2\n$r4 := $r2 * $r3\n")?;
        let report = run(&config(), file.path(), &[('x', 21)])?;
        assert_eq!(report.results.value, 42);
        assert!(report.results.satisfied);
        assert_eq!(report.constraints, 1);
        assert!(report.proof_bytes > 0);
        Ok(())
    }

    #[test]
    fn test_runs_numeric_program() -> Result<()> {
        // pool {0: 1, 1: -1, 2: 9}, then r3 = -r2
        let file = program_file(".json", "[[0, 9, 2], [4, 2, 1, 3]]")?;
        let report = run(&config(), file.path(), &[])?;
        assert_eq!(report.results.value, -9);
        assert!(report.results.satisfied);
        Ok(())
    }

    #[test]
    fn test_missing_variable_is_reported() -> Result<()> {
        let file = program_file(".ir", "$r2 := x\n$r3 := $r2 + $r2\n")?;
        let err = run(&config(), file.path(), &[]).unwrap_err();
        assert!(err.to_string().contains("`x`"));
        Ok(())
    }
}
