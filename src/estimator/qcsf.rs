//! The quick CSF estimator.
//!
//! A trial controller drives it in a loop:
//!
//! ```text
//! next() -> present stimulus -> observe response -> mark_response() -> ... -> results()
//! ```
//!
//! The estimator owns the posterior exclusively; it only changes inside
//! `mark_response`/`mark_response_at`. Calling `next()` twice without a response
//! silently replaces the pending stimulus.

use log::{info, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::{CsfEstimate, EstimatorConfig, ResultUnits, Stimulus, TrialRecord};
use crate::error::EstimatorError;
use crate::estimator::posterior::Posterior;
use crate::estimator::selection::StimulusSelector;
use crate::grid::{ParameterDimension, ParameterSpace, StimulusSpace, exponentiate, map_parameters};
use crate::models::PsychometricModel;

#[derive(Debug, Clone)]
pub struct QuickCsfEstimator {
    config: EstimatorConfig,
    stimuli: StimulusSpace,
    params: ParameterSpace,
    model: PsychometricModel,
    selector: StimulusSelector,
    posterior: Posterior,
    rng: StdRng,
    pending: Option<usize>,
    history: Vec<TrialRecord>,
}

impl QuickCsfEstimator {
    /// Build an estimator whose stimulus draws are seeded from OS entropy.
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimatorError> {
        Self::build(config, StdRng::from_entropy())
    }

    /// Build an estimator with a reproducible stimulus sequence.
    pub fn with_seed(config: EstimatorConfig, seed: u64) -> Result<Self, EstimatorError> {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: EstimatorConfig, rng: StdRng) -> Result<Self, EstimatorError> {
        config.validate()?;
        let stimuli = StimulusSpace::from_config(&config)?;
        let params = ParameterSpace::from_config(&config);
        let selector = StimulusSelector::from_config(&config)?;

        info!(
            "Initializing QuickCSF estimator: {} stimuli ({}x{}), {} parameter combinations {:?}",
            stimuli.count(),
            config.contrast_resolution,
            config.frequency_resolution,
            params.count(),
            params.sizes(),
        );

        Ok(Self {
            posterior: Posterior::uniform(params.count()),
            config,
            stimuli,
            params,
            model: PsychometricModel::default(),
            selector,
            rng,
            pending: None,
            history: Vec::new(),
        })
    }

    /// Choose the next stimulus and remember it as pending.
    pub fn next(&mut self) -> Result<Stimulus, EstimatorError> {
        let index = self.selector.select(
            &self.posterior,
            &self.params,
            &self.stimuli,
            &self.model,
            &mut self.rng,
        )?;
        self.pending = Some(index);
        Ok(self.stimuli.stimulus(index))
    }

    /// Flat index of the stimulus returned by the last unanswered `next()`.
    pub fn pending_stimulus(&self) -> Option<usize> {
        self.pending
    }

    /// Record the observer's answer to the pending stimulus.
    pub fn mark_response(&mut self, correct: bool) -> Result<(), EstimatorError> {
        let Some(index) = self.pending else {
            return Err(EstimatorError::NoPendingStimulus);
        };
        self.commit(index, correct)?;
        self.pending = None;
        Ok(())
    }

    /// Record an answer for an explicit stimulus index (not necessarily from `next()`).
    ///
    /// Leaves any pending stimulus untouched.
    pub fn mark_response_at(
        &mut self,
        stimulus_index: usize,
        correct: bool,
    ) -> Result<(), EstimatorError> {
        if stimulus_index >= self.stimuli.count() {
            return Err(EstimatorError::StimulusIndexOutOfRange {
                index: stimulus_index,
                count: self.stimuli.count(),
            });
        }
        self.commit(stimulus_index, correct)
    }

    /// Fold a recorded history into the posterior, snapping each stimulus to the grid.
    pub fn replay(&mut self, records: &[TrialRecord]) -> Result<(), EstimatorError> {
        for record in records {
            let index = self
                .stimuli
                .nearest_index(record.stimulus.contrast, record.stimulus.frequency)?;
            self.commit(index, record.correct)?;
        }
        Ok(())
    }

    fn commit(&mut self, index: usize, correct: bool) -> Result<(), EstimatorError> {
        let stimulus = self.stimuli.stimulus(index);
        info!(
            "Marking response {index}[c={},f={}] = {correct}",
            stimulus.contrast, stimulus.frequency
        );

        self.posterior
            .update(correct, index, &self.params, &self.stimuli, &self.model)?;
        self.history.push(TrialRecord { stimulus, correct });

        trace!(
            "Posterior entropy after {} trials: {:.4}",
            self.history.len(),
            self.posterior.entropy()
        );
        Ok(())
    }

    /// Expected information gain of every stimulus under the current posterior.
    ///
    /// Draws a fresh set of posterior samples, so it advances the stimulus RNG.
    pub fn expected_gains(&mut self) -> Result<Vec<f64>, EstimatorError> {
        let sampled = self
            .posterior
            .sample(self.selector.sample_count(), &mut self.rng)?;
        Ok(self
            .selector
            .expected_gain(&sampled, &self.params, &self.stimuli, &self.model))
    }

    /// Posterior-mean estimate of the four parameters.
    pub fn results(&self, units: ResultUnits) -> CsfEstimate {
        let means = self.mean_indices();
        match units {
            ResultUnits::Indices => CsfEstimate::from_array(means),
            ResultUnits::Physical => exponentiate(&map_parameters(means)),
        }
    }

    /// Posterior-mean grid index per dimension.
    pub fn mean_indices(&self) -> [f64; 4] {
        self.posterior.mean_indices(&self.params)
    }

    pub fn marginal(&self, dim: ParameterDimension) -> Vec<f64> {
        self.posterior.marginal(&self.params, dim)
    }

    pub fn posterior(&self) -> &Posterior {
        &self.posterior
    }

    pub fn history(&self) -> &[TrialRecord] {
        &self.history
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn stimulus_space(&self) -> &StimulusSpace {
        &self.stimuli
    }

    pub fn parameter_space(&self) -> &ParameterSpace {
        &self.params
    }

    pub fn model(&self) -> &PsychometricModel {
        &self.model
    }
}
