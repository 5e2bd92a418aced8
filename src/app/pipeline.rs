//! Shared "simulate pipeline" logic.
//!
//! Keeping this in one place keeps the handlers focused on presentation:
//! validate -> run sessions (parallel when `runs > 1`) -> summarize

use chrono::{DateTime, Local};
use log::info;
use serde::Serialize;

use crate::domain::SimulationConfig;
use crate::error::AppError;
use crate::simulate::{BatchSummary, SimulationRun, run_batch, summarize};

/// All computed outputs of a single `qcsf simulate` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulateOutput {
    pub generated: DateTime<Local>,
    pub config: SimulationConfig,
    pub runs: Vec<SimulationRun>,
    /// Present when more than one session was run.
    pub summary: Option<BatchSummary>,
}

/// Execute all configured sessions and collect their outputs.
pub fn run_simulate(config: &SimulationConfig) -> Result<SimulateOutput, AppError> {
    let generated = Local::now();
    let runs = run_batch(config)?;
    let summary = if runs.len() > 1 { summarize(&runs) } else { None };
    info!("Finished {} simulated session(s)", runs.len());

    Ok(SimulateOutput {
        generated,
        config: config.clone(),
        runs,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_run_has_no_summary() {
        let config = SimulationConfig {
            trials: 3,
            ..SimulationConfig::default()
        };
        let out = run_simulate(&config).unwrap();
        assert_eq!(out.runs.len(), 1);
        assert!(out.summary.is_none());
    }

    #[test]
    fn output_serializes_to_json() {
        let config = SimulationConfig {
            trials: 2,
            runs: 2,
            ..SimulationConfig::default()
        };
        let out = run_simulate(&config).unwrap();
        let json: serde_json::Value = serde_json::to_value(&out).unwrap();
        assert_eq!(json["runs"].as_array().unwrap().len(), 2);
        assert_eq!(json["summary"]["runs"], 2);
        assert_eq!(json["config"]["response_mode"], "probabilistic");
    }
}
