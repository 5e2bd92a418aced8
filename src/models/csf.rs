//! Truncated log-parabola CSF and the psychometric function built on it.
//!
//! The estimator relies on two primitive operations:
//! - predict log10 sensitivity at a frequency given CSF parameters
//! - turn predicted vs demanded sensitivity into `P(correct)`
//!
//! The curve, in log10 units with `x = log10(f)`:
//!
//! ```text
//! S(x)   = max(0, ps - 4 log10(2) * ((x - pf) / (log10(2) + bw))^2)
//! S(x)   = max(S(x), ps - delta)      for x < pf
//! ```
//!
//! so below the peak the curve flattens into a plateau `delta` below the peak.

use nalgebra::DMatrix;

use crate::domain::CsfParameters;
use crate::grid::{StimulusSpace, map_parameters};

/// Guess/lapse amplitude of the 2AFC psychometric function (`d`).
pub const LAPSE: f64 = 0.5;
/// Slope of the logistic in log10 sensitivity units (`sigma`).
pub const SLOPE: f64 = 0.25;

/// Predicted log10 sensitivity at `log_frequency` (log10 cycles/degree).
pub fn log_sensitivity(params: &CsfParameters, log_frequency: f64) -> f64 {
    let half_width = std::f64::consts::LOG10_2 + params.log_bandwidth;
    let z = (log_frequency - params.peak_frequency) / half_width;
    let truncation = 4.0 * std::f64::consts::LOG10_2 * z * z;

    let parabola = (params.peak_sensitivity - truncation).max(0.0);
    if log_frequency < params.peak_frequency {
        parabola.max(params.peak_sensitivity - params.delta)
    } else {
        parabola
    }
}

/// `csf` for a single set of (possibly fractional) parameter indices at a linear frequency.
pub fn csf(indices: [f64; 4], frequency: f64) -> f64 {
    log_sensitivity(&map_parameters(indices), frequency.log10())
}

/// Broadcast `csf` over an `N × 4` matrix of parameter indices and `M` linear frequencies.
///
/// Entry `(n, m)` is the log10 sensitivity of parameter row `n` at `frequencies[m]`.
pub fn csf_matrix(indices: &DMatrix<f64>, frequencies: &[f64]) -> DMatrix<f64> {
    debug_assert_eq!(indices.ncols(), 4);
    let params: Vec<CsfParameters> = (0..indices.nrows())
        .map(|r| {
            map_parameters([
                indices[(r, 0)],
                indices[(r, 1)],
                indices[(r, 2)],
                indices[(r, 3)],
            ])
        })
        .collect();
    let log_frequencies: Vec<f64> = frequencies.iter().map(|f| f.log10()).collect();
    DMatrix::from_fn(params.len(), frequencies.len(), |r, c| {
        log_sensitivity(&params[r], log_frequencies[c])
    })
}

/// Sample a curve (linear sensitivity) for plotting.
pub fn csf_curve(indices: [f64; 4], frequencies: &[f64]) -> Vec<f64> {
    let params = map_parameters(indices);
    frequencies
        .iter()
        .map(|f| 10f64.powf(log_sensitivity(&params, f.log10())))
        .collect()
}

/// Logistic psychometric function with a guessing floor.
///
/// `P(correct) = 1 - lapse / (1 + exp((predicted - demanded) / slope))`, kept strictly
/// inside `(1 - lapse, 1)` so Bayesian updates never multiply by exactly 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsychometricModel {
    pub lapse: f64,
    pub slope: f64,
}

impl Default for PsychometricModel {
    fn default() -> Self {
        Self {
            lapse: LAPSE,
            slope: SLOPE,
        }
    }
}

impl PsychometricModel {
    /// `P(correct)` for predicted vs demanded log10 sensitivity.
    pub fn probability(&self, predicted: f64, demanded: f64) -> f64 {
        let p = 1.0 - self.lapse / (1.0 + ((predicted - demanded) / self.slope).exp());
        // Far from threshold the expression rounds onto the open bounds.
        let floor = (1.0 - self.lapse) + f64::EPSILON;
        let ceil = 1.0 - f64::EPSILON;
        p.clamp(floor, ceil)
    }

    /// `P(correct)` of one parameter set for one stimulus of the grid.
    pub fn probability_correct(
        &self,
        params: &CsfParameters,
        stimuli: &StimulusSpace,
        stimulus_index: usize,
    ) -> f64 {
        let (demanded, log_frequency) = stimuli.log_values(stimulus_index);
        self.probability(log_sensitivity(params, log_frequency), demanded)
    }

    /// `P(correct)` for every (parameter row, stimulus) pair: an `N × S` matrix.
    ///
    /// `indices` holds parameter indices row-wise (`N × 4`).
    pub fn probability_matrix(
        &self,
        indices: &DMatrix<f64>,
        stimuli: &StimulusSpace,
        stimulus_indices: &[usize],
    ) -> DMatrix<f64> {
        let frequencies: Vec<f64> = stimulus_indices
            .iter()
            .map(|&s| stimuli.stimulus(s).frequency)
            .collect();
        let predicted = csf_matrix(indices, &frequencies);
        let demanded: Vec<f64> = stimulus_indices
            .iter()
            .map(|&s| stimuli.log_values(s).0)
            .collect();
        DMatrix::from_fn(predicted.nrows(), predicted.ncols(), |r, c| {
            self.probability(predicted[(r, c)], demanded[c])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EstimatorConfig;
    use crate::grid::ParameterSpace;

    #[test]
    fn csf_at_peak_frequency_is_exactly_peak_sensitivity() {
        for indices in [[18.0, 11.0, 12.0, 11.0], [0.0, 0.0, 0.0, 0.0], [27.0, 20.0, 20.0, 20.0]] {
            let params = map_parameters(indices);
            let f = 10f64.powf(params.peak_frequency);
            assert_eq!(csf(indices, f), params.peak_sensitivity);
        }
    }

    #[test]
    fn low_frequencies_flatten_onto_the_truncation_plateau() {
        let indices = [18.0, 11.0, 12.0, 11.0];
        let params = map_parameters(indices);
        let plateau = params.peak_sensitivity - params.delta;
        // Far below the peak the parabola has fallen below the plateau.
        let low = csf(indices, 0.01);
        assert!((low - plateau).abs() < 1e-12, "expected plateau {plateau}, got {low}");
        // The mirrored frequency above the peak keeps falling.
        let high = csf(indices, 10f64.powf(2.0 * params.peak_frequency - 0.01f64.log10()));
        assert!(high < plateau);
    }

    #[test]
    fn log_sensitivity_is_never_negative() {
        let params = map_parameters([0.0, 0.0, 0.0, 20.0]);
        for f in [0.01, 0.1, 1.0, 10.0, 100.0] {
            assert!(log_sensitivity(&params, f64::log10(f)) >= 0.0);
        }
    }

    #[test]
    fn csf_matrix_broadcasts_rows_and_columns() {
        let indices = DMatrix::from_row_slice(2, 4, &[18.0, 11.0, 12.0, 11.0, 5.0, 3.0, 4.0, 2.0]);
        let freqs = [0.5, 2.0, 8.0];
        let m = csf_matrix(&indices, &freqs);
        assert_eq!((m.nrows(), m.ncols()), (2, 3));
        assert_eq!(m[(1, 2)], csf([5.0, 3.0, 4.0, 2.0], 8.0));
        assert_eq!(m[(0, 0)], csf([18.0, 11.0, 12.0, 11.0], 0.5));
    }

    #[test]
    fn probability_is_half_way_at_threshold() {
        let model = PsychometricModel::default();
        assert!((model.probability(1.0, 1.0) - 0.75).abs() < 1e-15);
        assert!(model.probability(2.0, 1.0) > 0.75);
        assert!(model.probability(0.0, 1.0) < 0.75);
    }

    #[test]
    fn probability_stays_strictly_inside_bounds() {
        let model = PsychometricModel::default();
        for gap in [-1e6, -400.0, -40.0, 0.0, 40.0, 400.0, 1e6] {
            let p = model.probability(gap, 0.0);
            assert!(p > 0.5 && p < 1.0, "gap={gap} p={p}");
        }

        let config = EstimatorConfig::default();
        let stimuli = StimulusSpace::from_config(&config).unwrap();
        let params = ParameterSpace::from_config(&config);
        for k in (0..params.count()).step_by(97) {
            let p = params.parameters(k);
            for s in 0..stimuli.count() {
                let pc = model.probability_correct(&p, &stimuli, s);
                assert!(pc > 0.5 && pc < 1.0);
            }
        }
    }

    #[test]
    fn probability_matrix_matches_scalar_path() {
        let model = PsychometricModel::default();
        let stimuli = StimulusSpace::from_config(&EstimatorConfig::default()).unwrap();
        let indices = DMatrix::from_row_slice(1, 4, &[18.0, 11.0, 12.0, 11.0]);
        let stims = [0, 17, 250, stimuli.count() - 1];
        let m = model.probability_matrix(&indices, &stimuli, &stims);
        let params = map_parameters([18.0, 11.0, 12.0, 11.0]);
        for (c, &s) in stims.iter().enumerate() {
            let expected = model.probability_correct(&params, &stimuli, s);
            assert!((m[(0, c)] - expected).abs() < 1e-12);
        }
    }
}
