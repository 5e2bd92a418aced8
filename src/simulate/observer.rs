//! Simulated observers with known CSF parameters.

use log::debug;
use rand::Rng;

use crate::domain::{CsfParameters, ResponseMode, Stimulus};
use crate::grid::map_parameters;
use crate::models::{PsychometricModel, log_sensitivity};

#[derive(Debug, Clone)]
pub struct SimulatedObserver {
    truth: [f64; 4],
    params: CsfParameters,
    mode: ResponseMode,
    model: PsychometricModel,
}

impl SimulatedObserver {
    /// `truth` are parameter-grid indices (may be fractional).
    pub fn new(truth: [f64; 4], mode: ResponseMode) -> Self {
        Self {
            truth,
            params: map_parameters(truth),
            mode,
            model: PsychometricModel::default(),
        }
    }

    pub fn truth(&self) -> [f64; 4] {
        self.truth
    }

    /// Log10 sensitivity of this observer at a linear frequency.
    pub fn log_sensitivity(&self, frequency: f64) -> f64 {
        log_sensitivity(&self.params, frequency.log10())
    }

    /// `P(correct)` this observer has for a stimulus.
    pub fn probability_correct(&self, stimulus: &Stimulus) -> f64 {
        self.model.probability(
            self.log_sensitivity(stimulus.frequency),
            stimulus.sensitivity().log10(),
        )
    }

    pub fn respond<R: Rng + ?Sized>(&self, stimulus: &Stimulus, rng: &mut R) -> bool {
        let correct = match self.mode {
            ResponseMode::Perfect => {
                10f64.powf(self.log_sensitivity(stimulus.frequency)) > stimulus.sensitivity()
            }
            ResponseMode::Probabilistic => rng.r#gen::<f64>() < self.probability_correct(stimulus),
        };
        debug!(
            "Simulated {:?} response to c={:.5}, f={:.3}: {correct}",
            self.mode, stimulus.contrast, stimulus.frequency
        );
        correct
    }
}
