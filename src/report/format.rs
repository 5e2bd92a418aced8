//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimator code stays free of presentation concerns
//! - output changes are localized

use chrono::{DateTime, Local};

use crate::domain::{CsfEstimate, SimulationConfig, TrialRecord};
use crate::grid::{ParameterDimension, ParameterSpace, StimulusSpace};
use crate::simulate::{BatchSummary, SimulationRun};

/// Header block for a simulated session.
pub fn format_run_header(config: &SimulationConfig, generated: DateTime<Local>) -> String {
    let e = &config.estimator;
    let mut out = String::new();
    out.push_str("=== qcsf - QuickCSF simulation ===\n");
    out.push_str(&format!("Generated: {}\n", generated.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!(
        "Contrast: [{}, {}] x {} | Frequency: [{}, {}] cpd x {}\n",
        e.min_contrast,
        e.max_contrast,
        e.contrast_resolution,
        e.min_frequency,
        e.max_frequency,
        e.frequency_resolution
    ));
    out.push_str(&format!(
        "Parameters: {:?} | samples={} top_fraction={}\n",
        e.parameter_resolutions(),
        e.sample_count,
        e.top_fraction
    ));
    out.push_str(&format!(
        "Trials: {} | runs={} | seed={} | responses={:?}\n",
        config.trials, config.runs, config.seed, config.response_mode
    ));
    out
}

/// One line per trial, in presentation order.
pub fn format_history(history: &[TrialRecord]) -> String {
    let mut out = String::new();
    out.push_str("******* History *******\n");
    for (i, record) in history.iter().enumerate() {
        out.push_str(&format!(
            "{:>4} f={:<8.4} c={:<9.6} r={}\n",
            i + 1,
            record.stimulus.frequency,
            record.stimulus.contrast,
            if record.correct { "correct" } else { "incorrect" },
        ));
    }
    out.push_str("***********************\n");
    out
}

/// Estimate vs truth table, in physical units and grid indices.
pub fn format_run_results(run: &SimulationRun) -> String {
    let mut out = String::new();
    out.push_str("******* Results *******\n");
    out.push_str(&format!(
        "{:<18} {:>12} {:>12} {:>10} {:>10}\n",
        "parameter", "estimate", "actual", "est_idx", "true_idx"
    ));
    let estimate = run.estimate.to_array();
    let truth = run.truth.to_array();
    for dim in ParameterDimension::ALL {
        let d = dim.position();
        out.push_str(&format!(
            "{:<18} {:>12.4} {:>12.4} {:>10.2} {:>10.2}\n",
            dim.display_name(),
            estimate[d],
            truth[d],
            run.estimated_indices[d],
            run.true_indices[d],
        ));
    }
    out.push_str("***********************\n");
    out
}

/// Compact single-line estimate.
pub fn format_estimate(estimate: &CsfEstimate) -> String {
    format!(
        "peak_sensitivity={:.2} peak_frequency={:.4} bandwidth={:.4} delta={:.4}",
        estimate.peak_sensitivity,
        estimate.peak_frequency,
        estimate.bandwidth,
        estimate.delta
    )
}

/// Spread of estimates across repeated runs.
pub fn format_batch_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Across {} runs (grid indices):\n", summary.runs));
    out.push_str(&format!(
        "{:<18} {:>10} {:>10} {:>10}\n",
        "parameter", "mean", "std", "mae"
    ));
    for dim in ParameterDimension::ALL {
        let d = dim.position();
        out.push_str(&format!(
            "{:<18} {:>10.3} {:>10.3} {:>10.3}\n",
            dim.display_name(),
            summary.mean_indices[d],
            summary.std_indices[d],
            summary.mean_abs_error[d],
        ));
    }
    out
}

/// Stimulus axes and parameter axes of a configuration.
pub fn format_grid(stimuli: &StimulusSpace, params: &ParameterSpace) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Stimulus space: {} combinations\n",
        stimuli.count()
    ));
    out.push_str(&format!("  contrast    {}\n", fmt_vec(stimuli.contrasts(), 6)));
    out.push_str(&format!("  frequency   {}\n", fmt_vec(stimuli.frequencies(), 4)));

    out.push_str(&format!(
        "Parameter space: {} combinations\n",
        params.count()
    ));
    for dim in ParameterDimension::ALL {
        let (lo, hi) = params.log_range(dim);
        out.push_str(&format!(
            "  {:<18} n={:<3} log10=[{lo:.2}, {hi:.2}] linear=[{:.4}, {:.4}]\n",
            dim.display_name(),
            params.size(dim),
            10f64.powf(lo),
            10f64.powf(hi),
        ));
    }
    out
}

fn fmt_vec(v: &[f64], precision: usize) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.precision$}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::domain::{EstimatorConfig, Stimulus};

    #[test]
    fn history_lists_every_trial() {
        let history = vec![
            TrialRecord {
                stimulus: Stimulus {
                    contrast: 0.5,
                    frequency: 1.0,
                },
                correct: true,
            },
            TrialRecord {
                stimulus: Stimulus {
                    contrast: 0.01,
                    frequency: 8.0,
                },
                correct: false,
            },
        ];
        let txt = format_history(&history);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "   1 f=1.0000   c=0.500000  r=correct");
        assert!(lines[2].ends_with("r=incorrect"));
    }

    #[test]
    fn header_includes_timestamp_and_grid() {
        let at = Local.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let txt = format_run_header(&SimulationConfig::default(), at);
        assert!(txt.contains("Generated: 2025-03-01 12:30:00"));
        assert!(txt.contains("x 24"));
        assert!(txt.contains("[28, 21, 21, 21]"));
    }

    #[test]
    fn grid_summary_lists_all_dimensions() {
        let config = EstimatorConfig::default();
        let txt = format_grid(
            &StimulusSpace::from_config(&config).unwrap(),
            &ParameterSpace::from_config(&config),
        );
        assert!(txt.starts_with("Stimulus space: 480 combinations"));
        assert!(txt.contains("Parameter space: 259308 combinations"));
        for dim in ParameterDimension::ALL {
            assert!(txt.contains(dim.display_name()));
        }
    }

    #[test]
    fn estimate_line_uses_fixed_precision() {
        let e = CsfEstimate::from_array([125.89254, 2.5118864, 3.98107, 54.2]);
        assert_eq!(
            format_estimate(&e),
            "peak_sensitivity=125.89 peak_frequency=2.5119 bandwidth=3.9811 delta=54.2000"
        );
    }
}
