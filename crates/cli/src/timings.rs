// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pipeline phases, in CSV column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    BuildCircuit,
    GenerateKeys,
    Execute,
    Prove,
    Verify,
    Decrypt,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Parse,
        Phase::BuildCircuit,
        Phase::GenerateKeys,
        Phase::Execute,
        Phase::Prove,
        Phase::Verify,
        Phase::Decrypt,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Phase::Parse => "OpL2Circuit",
            Phase::BuildCircuit => "Circuit&R1CS",
            Phase::GenerateKeys => "Generate Rino. Keys",
            Phase::Execute => "Circuit Execution",
            Phase::Prove => "Proving",
            Phase::Verify => "Verifying",
            Phase::Decrypt => "Decryption",
        }
    }
}

#[derive(Debug, Default)]
pub struct Timings {
    elapsed: [Duration; 7],
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f`, charging its wall time to `phase`.
    pub fn time<T>(&mut self, phase: Phase, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let out = f();
        let elapsed = start.elapsed();
        self.elapsed[phase as usize] += elapsed;
        debug!(phase = phase.column(), ms = elapsed.as_millis() as u64, "phase finished");
        out
    }

    pub fn get(&self, phase: Phase) -> Duration {
        self.elapsed[phase as usize]
    }

    pub fn header() -> String {
        let columns: Vec<&str> = Phase::ALL.iter().map(Phase::column).collect();
        format!("Program,{}", columns.join(","))
    }

    /// One CSV row, milliseconds per phase.
    pub fn row(&self, program: &str) -> String {
        let values: Vec<String> = Phase::ALL
            .iter()
            .map(|p| self.get(*p).as_millis().to_string())
            .collect();
        format!("{program},{}", values.join(","))
    }

    /// Appends a row to `path`, writing the header first when the file is new or empty.
    pub fn append_csv(&self, path: &Path, program: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Could not open {}", path.display()))?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", Self::header())?;
        }
        writeln!(file, "{}", self.row(program))?;
        info!(path = %path.display(), "appended timings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_time_accumulates_and_propagates() {
        let mut timings = Timings::new();
        let value = timings.time(Phase::Prove, || Ok(5)).unwrap();
        assert_eq!(value, 5);
        let failed: Result<()> = timings.time(Phase::Verify, || anyhow::bail!("nope"));
        assert!(failed.is_err());
    }

    #[test]
    fn test_append_csv_writes_header_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Running_times.csv");
        let timings = Timings::new();
        timings.append_csv(&path, "a.ir")?;
        timings.append_csv(&path, "b.ir")?;

        let contents = fs::read_to_string(&path)?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Program,OpL2Circuit,Circuit&R1CS,Generate Rino. Keys,Circuit Execution,Proving,Verifying,Decryption"
        );
        assert_eq!(lines[1], "a.ir,0,0,0,0,0,0,0");
        assert!(lines[2].starts_with("b.ir,"));
        Ok(())
    }
}
