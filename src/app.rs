//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs simulated sessions
//! - prints reports/plots, gain maps or JSON

use clap::Parser;
use log::debug;

use crate::cli::{Command, GainArgs, GridArgs, SimulateArgs};
use crate::error::AppError;
use crate::grid::{ParameterSpace, StimulusSpace};
use crate::plot::{PlotRange, render_csf_plot, render_gain_map};

pub mod pipeline;

/// Entry point for the `qcsf` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    // `qcsf` and `qcsf -n 100` behave like `qcsf simulate ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    debug!("Parsed command: {:?}", cli.command);

    match cli.command {
        Command::Simulate(args) => handle_simulate(args),
        Command::Grid(args) => handle_grid(args),
        Command::Gain(args) => handle_gain(args),
    }
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let out = pipeline::run_simulate(&config)?;

    if args.json {
        let json = serde_json::to_string_pretty(&out)
            .map_err(|e| AppError::new(1, format!("Failed to serialize results: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", crate::report::format_run_header(&config, out.generated));

    for run in &out.runs {
        if out.runs.len() > 1 {
            println!("--- run seed={} ---", run.seed);
        }
        if args.history {
            println!("{}", crate::report::format_history(&run.history));
        }
        println!("{}", crate::report::format_run_results(run));

        if args.show_plot() {
            let plot = render_csf_plot(
                run.estimated_indices,
                Some(run.true_indices),
                &run.history,
                PlotRange::default(),
                args.width,
                args.height,
            );
            println!("{plot}");
        }
    }

    if let Some(summary) = &out.summary {
        println!("{}", crate::report::format_batch_summary(summary));
    }

    Ok(())
}

fn handle_grid(args: GridArgs) -> Result<(), AppError> {
    let config = args.estimator.to_config();
    config.validate()?;
    let stimuli = StimulusSpace::from_config(&config)?;
    let params = ParameterSpace::from_config(&config);
    println!("{}", crate::report::format_grid(&stimuli, &params));
    Ok(())
}

fn handle_gain(args: GainArgs) -> Result<(), AppError> {
    let config = args.to_config();
    let map = crate::simulate::run_gain_map(&config)?;

    println!("Gain map after {} trial(s)", map.trials);
    println!("Estimate: {}", crate::report::format_estimate(&map.estimate));
    println!(
        "{}",
        render_gain_map(&map.gains, &map.contrasts, &map.frequencies)
    );
    Ok(())
}

/// Rewrite argv so `qcsf` defaults to `qcsf simulate`.
///
/// Rules:
/// - `qcsf`                        -> `qcsf simulate`
/// - `qcsf -n 100 ...`             -> `qcsf simulate -n 100 ...`
/// - `qcsf --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("simulate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "simulate" | "grid" | "gain");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "simulate flags".
    if arg1.starts_with('-') {
        argv.insert(1, "simulate".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_simulate() {
        assert_eq!(rewrite_args(argv(&["qcsf"])), argv(&["qcsf", "simulate"]));
    }

    #[test]
    fn leading_flags_are_simulate_flags() {
        assert_eq!(
            rewrite_args(argv(&["qcsf", "-n", "100"])),
            argv(&["qcsf", "simulate", "-n", "100"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [
            &["qcsf", "grid"][..],
            &["qcsf", "gain", "-n", "0"][..],
            &["qcsf", "simulate", "--json"][..],
            &["qcsf", "--help"][..],
            &["qcsf", "-V"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }
}
