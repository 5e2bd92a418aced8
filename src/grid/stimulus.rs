//! Stimulus grid construction.
//!
//! Both stimulus axes are log-spaced. The contrast axis is built as log-uniform
//! *sensitivities* (`1/contrast`) and then inverted, so equal steps along the
//! grid are equal steps in log sensitivity, which is the axis the CSF model
//! lives on.

use log::debug;

use crate::domain::{EstimatorConfig, Stimulus};
use crate::error::EstimatorError;
use crate::math::{MixedRadix, inflate_into};

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, EstimatorError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(EstimatorError::InvalidRange {
            axis: "log space",
            min,
            max,
            reason: "must be finite, >0, and max>min",
        });
    }
    if steps < 2 {
        return Err(EstimatorError::InvalidResolution {
            axis: "log space",
            got: steps,
            min: 2,
        });
    }

    let lg_min = min.log10();
    let lg_max = max.log10();
    let step = (lg_max - lg_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(10f64.powf(lg_min + step * i as f64));
    }
    // Pin the endpoints so they are exact rather than `10^log10(x)`.
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

/// Contrast values in increasing order, equally spaced in log sensitivity.
pub fn contrast_space(min: f64, max: f64, count: usize) -> Result<Vec<f64>, EstimatorError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min && max <= 1.0) {
        return Err(EstimatorError::InvalidRange {
            axis: "contrast",
            min,
            max,
            reason: "must satisfy 0 < min < max <= 1",
        });
    }
    // Sensitivities from 1/max up to 1/min; reversing after inversion keeps contrast ascending.
    let sensitivities = log_space(1.0 / max, 1.0 / min, count)?;
    Ok(sensitivities.iter().rev().map(|s| 1.0 / s).collect())
}

/// Spatial frequencies (cycles/degree) in increasing order.
pub fn frequency_space(min: f64, max: f64, count: usize) -> Result<Vec<f64>, EstimatorError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) {
        return Err(EstimatorError::InvalidRange {
            axis: "frequency",
            min,
            max,
            reason: "must satisfy 0 < min < max",
        });
    }
    log_space(min, max, count)
}

/// The 2-D stimulus grid: contrast is digit 0, frequency is digit 1.
#[derive(Debug, Clone)]
pub struct StimulusSpace {
    contrasts: Vec<f64>,
    frequencies: Vec<f64>,
    /// `log10(1/contrast)` per contrast step, the sensitivity a stimulus demands.
    log_sensitivities: Vec<f64>,
    log_frequencies: Vec<f64>,
    radix: MixedRadix,
}

impl StimulusSpace {
    pub fn from_config(config: &EstimatorConfig) -> Result<Self, EstimatorError> {
        let contrasts = contrast_space(
            config.min_contrast,
            config.max_contrast,
            config.contrast_resolution,
        )?;
        let frequencies = frequency_space(
            config.min_frequency,
            config.max_frequency,
            config.frequency_resolution,
        )?;
        Self::new(contrasts, frequencies)
    }

    /// Build from explicit axis values; both axes must be positive and strictly increasing.
    pub fn new(contrasts: Vec<f64>, frequencies: Vec<f64>) -> Result<Self, EstimatorError> {
        check_axis("contrast", &contrasts)?;
        check_axis("frequency", &frequencies)?;

        debug!("Stimulus space: contrasts={contrasts:?}, frequencies={frequencies:?}");

        let log_sensitivities = contrasts.iter().map(|c| (1.0 / c).log10()).collect();
        let log_frequencies = frequencies.iter().map(|f| f.log10()).collect();
        let radix = MixedRadix::new(&[contrasts.len(), frequencies.len()]);
        Ok(Self {
            contrasts,
            frequencies,
            log_sensitivities,
            log_frequencies,
            radix,
        })
    }

    pub fn contrasts(&self) -> &[f64] {
        &self.contrasts
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn radix(&self) -> &MixedRadix {
        &self.radix
    }

    /// Number of stimulus combinations (`Nc * Nf`).
    pub fn count(&self) -> usize {
        self.radix.count()
    }

    /// `(contrast_index, frequency_index)` of a flat stimulus index.
    pub fn indices(&self, index: usize) -> (usize, usize) {
        let mut digits = [0usize; 2];
        inflate_into(index, self.radix.dims(), &mut digits);
        (digits[0], digits[1])
    }

    pub fn index_of(&self, contrast_index: usize, frequency_index: usize) -> usize {
        self.radix.flatten(&[contrast_index, frequency_index])
    }

    pub fn stimulus(&self, index: usize) -> Stimulus {
        let (ci, fi) = self.indices(index);
        Stimulus {
            contrast: self.contrasts[ci],
            frequency: self.frequencies[fi],
        }
    }

    /// `(log10 sensitivity demanded, log10 frequency)` of a flat stimulus index.
    pub fn log_values(&self, index: usize) -> (f64, f64) {
        let (ci, fi) = self.indices(index);
        (self.log_sensitivities[ci], self.log_frequencies[fi])
    }

    /// Nearest grid stimulus (in log units on both axes) to arbitrary values.
    pub fn nearest_index(&self, contrast: f64, frequency: f64) -> Result<usize, EstimatorError> {
        if !(contrast.is_finite() && contrast > 0.0 && frequency.is_finite() && frequency > 0.0) {
            return Err(EstimatorError::InvalidRange {
                axis: "stimulus lookup",
                min: contrast,
                max: frequency,
                reason: "contrast and frequency must be finite and >0",
            });
        }
        let ci = nearest_log(&self.contrasts, contrast);
        let fi = nearest_log(&self.frequencies, frequency);
        Ok(self.index_of(ci, fi))
    }
}

fn check_axis(axis: &'static str, values: &[f64]) -> Result<(), EstimatorError> {
    if values.len() < 2 {
        return Err(EstimatorError::InvalidResolution {
            axis,
            got: values.len(),
            min: 2,
        });
    }
    let increasing = values.windows(2).all(|w| w[1] > w[0]);
    let positive = values.iter().all(|v| v.is_finite() && *v > 0.0);
    if !(increasing && positive) {
        return Err(EstimatorError::InvalidRange {
            axis,
            min: values[0],
            max: values[values.len() - 1],
            reason: "values must be finite, >0 and strictly increasing",
        });
    }
    Ok(())
}

fn nearest_log(values: &[f64], target: f64) -> usize {
    let lt = target.log10();
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, v) in values.iter().enumerate() {
        let dist = (v.log10() - lt).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}
