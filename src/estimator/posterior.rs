//! Posterior probability mass over the flattened parameter grid.
//!
//! The posterior is a dense vector indexed by flat parameter index. It starts
//! uniform, and each response multiplies it by the likelihood of that response
//! under every parameter combination before renormalising.
//!
//! Numerical notes:
//! - `P(correct)` is bounded inside `(0.5, 1)`, so no combination can be driven to
//!   exactly zero and the normalising sum cannot underflow in practice. The check
//!   is kept and reported as [`EstimatorError::DegeneratePosterior`].
//! - Updates are computed into a fresh buffer and only committed once the
//!   normalisation succeeded.

use rand::Rng;
use rand_distr::{Distribution, WeightedAliasIndex};
use rayon::prelude::*;

use crate::error::EstimatorError;
use crate::grid::{ParameterDimension, ParameterSpace, StimulusSpace};
use crate::math;
use crate::models::{PsychometricModel, log_sensitivity};

#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    mass: Vec<f64>,
}

impl Posterior {
    /// Uniform distribution over `count` combinations.
    pub fn uniform(count: usize) -> Self {
        let count = count.max(1);
        Self {
            mass: vec![1.0 / count as f64; count],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.mass
    }

    pub fn len(&self) -> usize {
        self.mass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Shannon entropy in nats.
    pub fn entropy(&self) -> f64 {
        math::entropy(&self.mass)
    }

    /// Fold one observed response to `stimulus_index` into the posterior.
    pub fn update(
        &mut self,
        correct: bool,
        stimulus_index: usize,
        params: &ParameterSpace,
        stimuli: &StimulusSpace,
        model: &PsychometricModel,
    ) -> Result<(), EstimatorError> {
        let (demanded, log_frequency) = stimuli.log_values(stimulus_index);

        let mut next: Vec<f64> = self
            .mass
            .par_iter()
            .enumerate()
            .map(|(k, &m)| {
                let predicted = log_sensitivity(&params.parameters(k), log_frequency);
                let p = model.probability(predicted, demanded);
                if correct { m * p } else { m * (1.0 - p) }
            })
            .collect();

        // Sequential sum keeps the result independent of the thread count.
        let sum: f64 = next.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(EstimatorError::DegeneratePosterior { sum });
        }
        next.par_iter_mut().for_each(|m| *m /= sum);

        self.mass = next;
        Ok(())
    }

    /// Marginal distribution of one parameter dimension.
    pub fn marginal(&self, params: &ParameterSpace, dim: ParameterDimension) -> Vec<f64> {
        let dims = params.radix().dims();
        let position = dim.position();
        let stride: usize = dims[..position].iter().product();
        let size = dims[position];

        let mut out = vec![0.0; size];
        for (k, &m) in self.mass.iter().enumerate() {
            out[(k / stride) % size] += m;
        }
        out
    }

    /// Posterior-mean index of every parameter dimension.
    pub fn mean_indices(&self, params: &ParameterSpace) -> [f64; 4] {
        ParameterDimension::ALL.map(|dim| {
            self.marginal(params, dim)
                .iter()
                .enumerate()
                .map(|(i, m)| i as f64 * m)
                .sum()
        })
    }

    /// Draw `n` flat parameter indices with replacement, weighted by the posterior.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, EstimatorError> {
        let dist = WeightedAliasIndex::new(self.mass.clone())
            .map_err(|_| EstimatorError::DegeneratePosterior { sum: self.sum() })?;
        Ok((0..n).map(|_| dist.sample(rng)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::domain::EstimatorConfig;

    fn small_grid() -> (ParameterSpace, StimulusSpace) {
        let config = EstimatorConfig {
            contrast_resolution: 8,
            frequency_resolution: 6,
            peak_sensitivity_resolution: 12,
            peak_frequency_resolution: 9,
            bandwidth_resolution: 5,
            delta_resolution: 4,
            ..EstimatorConfig::default()
        };
        config.validate().unwrap();
        (
            ParameterSpace::from_config(&config),
            StimulusSpace::from_config(&config).unwrap(),
        )
    }

    #[test]
    fn uniform_prior_sums_to_one() {
        let post = Posterior::uniform(1000);
        assert!((post.sum() - 1.0).abs() < 1e-12);
        assert!((post.entropy() - 1000f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn update_keeps_a_valid_distribution() {
        let (params, stimuli) = small_grid();
        let model = PsychometricModel::default();
        let mut post = Posterior::uniform(params.count());
        let prior = post.clone();

        for (i, s) in [0, 5, 17, 47, 23, 30].into_iter().enumerate() {
            post.update(i % 2 == 0, s, &params, &stimuli, &model).unwrap();
            assert!((post.sum() - 1.0).abs() < 1e-9);
            assert!(post.as_slice().iter().all(|&m| m > 0.0));
        }
        assert_ne!(post, prior);
        assert!(post.entropy() < prior.entropy());
    }

    #[test]
    fn correct_response_at_low_contrast_favours_high_sensitivity() {
        let (params, stimuli) = small_grid();
        let model = PsychometricModel::default();
        let mut post = Posterior::uniform(params.count());

        // Demands log sensitivity ~0.86 at ~0.56 cpd, inside what this grid can explain.
        let s = stimuli.index_of(5, 1);
        let (demanded, _) = stimuli.log_values(s);
        assert!(demanded > 0.3 && demanded < 1.4, "demanded={demanded}");
        for _ in 0..5 {
            post.update(true, s, &params, &stimuli, &model).unwrap();
        }
        let prior_mean = (params.size(ParameterDimension::PeakSensitivity) - 1) as f64 / 2.0;
        let mean = post.mean_indices(&params)[0];
        assert!(mean > prior_mean, "mean={mean} prior_mean={prior_mean}");
    }

    #[test]
    fn marginals_sum_to_one_and_match_uniform_prior() {
        let (params, stimuli) = small_grid();
        let model = PsychometricModel::default();
        let mut post = Posterior::uniform(params.count());

        for dim in ParameterDimension::ALL {
            let marginal = post.marginal(&params, dim);
            assert_eq!(marginal.len(), params.size(dim));
            let expected = 1.0 / params.size(dim) as f64;
            assert!(marginal.iter().all(|m| (m - expected).abs() < 1e-12));
        }

        post.update(false, 12, &params, &stimuli, &model).unwrap();
        for dim in ParameterDimension::ALL {
            let total: f64 = post.marginal(&params, dim).iter().sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn uniform_mean_is_grid_centre() {
        let (params, _) = small_grid();
        let post = Posterior::uniform(params.count());
        let means = post.mean_indices(&params);
        for dim in ParameterDimension::ALL {
            let centre = (params.size(dim) - 1) as f64 / 2.0;
            assert!((means[dim.position()] - centre).abs() < 1e-9);
        }
    }

    #[test]
    fn sampling_follows_the_mass() {
        let mut post = Posterior::uniform(4);
        post.mass = vec![0.0, 0.0, 1.0, 0.0];
        let mut rng = StdRng::seed_from_u64(7);
        let draws = post.sample(50, &mut rng).unwrap();
        assert_eq!(draws.len(), 50);
        assert!(draws.iter().all(|&k| k == 2));
    }

    #[test]
    fn degenerate_mass_is_reported() {
        let (params, stimuli) = small_grid();
        let model = PsychometricModel::default();
        let mut post = Posterior::uniform(params.count());
        post.mass.iter_mut().for_each(|m| *m = 0.0);
        let before = post.clone();

        let err = post.update(true, 0, &params, &stimuli, &model).unwrap_err();
        assert!(matches!(err, EstimatorError::DegeneratePosterior { .. }));
        assert_eq!(post, before);

        let mut rng = StdRng::seed_from_u64(1);
        assert!(post.sample(3, &mut rng).is_err());
    }
}
