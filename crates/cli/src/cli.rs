// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::parse_variables;
use crate::helpers::telemetry::setup_simple_tracing;
use crate::pipeline;
use crate::timings::Timings;
use anyhow::Result;
use clap::{command, ArgAction, Parser};
use std::path::PathBuf;
use tracing::{info, Level};
use zkhe_config::{load_config, AppConfig};
use zkhe_fhe::ZkhePreset;

#[derive(Debug, Clone, Default)]
pub struct Inputs(pub Vec<(char, i64)>);

fn parse_inputs(s: &str) -> Result<Inputs, String> {
    parse_variables(s).map(Inputs).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "zkhe")]
#[command(about = "Evaluate a circuit over BFV ciphertexts and prove the evaluation with Rinocchio", long_about = None)]
pub struct Cli {
    /// Circuit program, textual IR or a `.json` array of numeric instructions
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Plaintext values of the program's variables, eg. `-v x=3,y=7`
    #[arg(short = 'v', long = "vars", value_parser = parse_inputs)]
    vars: Option<Inputs>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parameter preset, eg. INSECURE_TEST_16
    #[arg(long)]
    preset: Option<String>,

    /// Seed every rng for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Append phase timings to this CSV file
    #[arg(long)]
    timing_csv: Option<PathBuf>,

    /// Indicate error levels by adding additional `--verbose` arguments
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `--verbose`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose"
    )]
    quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            }
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(name) = &self.preset {
            config.preset = ZkhePreset::from_name(name)?;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(path) = &self.timing_csv {
            config.timing_csv = Some(path.clone());
        }
        Ok(config)
    }

    pub fn execute(self) -> Result<()> {
        let config = self.load_config()?;
        setup_simple_tracing(self.log_level());
        info!("Config loaded from: {:?}", config.config_file);

        let inputs = self.vars.unwrap_or_default();
        let report = pipeline::run(&config, &self.file, &inputs.0)?;

        println!(
            "Result: {} (register {}, {} bits of noise budget left)",
            report.results.value, report.results.output_index, report.results.noise_budget
        );
        println!(
            "R1CS: {} constraints over {} variables, satisfied: {}",
            report.constraints, report.variables, report.results.satisfied
        );
        println!("Proof: {} bytes, verified", report.proof_bytes);
        println!("{}", Timings::header());
        println!("{}", report.timings.row(&self.file.display().to_string()));

        if let Some(path) = config.timing_csv() {
            let program = self.file.display().to_string();
            report.timings.append_csv(path, &program)?;
        }
        Ok(())
    }
}
