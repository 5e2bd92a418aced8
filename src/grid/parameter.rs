//! Parameter grid of the truncated log-parabola CSF.
//!
//! Each of the four dimensions is a plain integer range `[0, N)`. An index maps to
//! model units through a fixed affine transform (log10 units), and delta is
//! additionally exponentiated:
//!
//! | dimension          | model value for index `i`   |
//! | ------------------ | --------------------------- |
//! | peak sensitivity   | `0.3 + 0.1 i`               |
//! | peak frequency     | `-0.7 + 0.1 i`              |
//! | bandwidth          | `0.05 i`                    |
//! | delta              | `10^(-1.7 + 0.1 i)`         |
//!
//! The mapping accepts fractional indices so posterior means can be mapped too.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::domain::{CsfEstimate, CsfParameters, EstimatorConfig};
use crate::math::MixedRadix;

/// The four CSF parameters, in flat-index digit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDimension {
    PeakSensitivity,
    PeakFrequency,
    Bandwidth,
    Delta,
}

impl ParameterDimension {
    pub const ALL: [ParameterDimension; 4] = [
        ParameterDimension::PeakSensitivity,
        ParameterDimension::PeakFrequency,
        ParameterDimension::Bandwidth,
        ParameterDimension::Delta,
    ];

    /// Digit position in a flat parameter index.
    pub fn position(self) -> usize {
        match self {
            ParameterDimension::PeakSensitivity => 0,
            ParameterDimension::PeakFrequency => 1,
            ParameterDimension::Bandwidth => 2,
            ParameterDimension::Delta => 3,
        }
    }

    /// Log10 value at index 0.
    pub fn offset(self) -> f64 {
        match self {
            ParameterDimension::PeakSensitivity => 0.3,
            ParameterDimension::PeakFrequency => -0.7,
            ParameterDimension::Bandwidth => 0.0,
            ParameterDimension::Delta => -1.7,
        }
    }

    /// Log10 increment per index.
    pub fn step(self) -> f64 {
        match self {
            ParameterDimension::Bandwidth => 0.05,
            _ => 0.1,
        }
    }

    /// Affine (log10) value of an index.
    pub fn log_value(self, index: f64) -> f64 {
        self.offset() + self.step() * index
    }

    /// Value as used by the CSF model: log units, except delta which is exponentiated.
    pub fn model_value(self, index: f64) -> f64 {
        match self {
            ParameterDimension::Delta => 10f64.powf(self.log_value(index)),
            _ => self.log_value(index),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ParameterDimension::PeakSensitivity => "peak sensitivity",
            ParameterDimension::PeakFrequency => "peak frequency",
            ParameterDimension::Bandwidth => "bandwidth",
            ParameterDimension::Delta => "delta",
        }
    }
}

/// Map (possibly fractional) parameter indices to model units.
pub fn map_parameters(indices: [f64; 4]) -> CsfParameters {
    CsfParameters {
        peak_sensitivity: ParameterDimension::PeakSensitivity.model_value(indices[0]),
        peak_frequency: ParameterDimension::PeakFrequency.model_value(indices[1]),
        log_bandwidth: ParameterDimension::Bandwidth.model_value(indices[2]),
        delta: ParameterDimension::Delta.model_value(indices[3]),
    }
}

/// Convert model-unit parameters to physical, linear-scale values.
///
/// Delta comes back in sensitivity units: the gap between peak sensitivity and
/// the low-frequency plateau, `10^ps - 10^(ps - delta)`.
pub fn exponentiate(params: &CsfParameters) -> CsfEstimate {
    let peak_sensitivity = 10f64.powf(params.peak_sensitivity);
    let plateau = 10f64.powf(params.peak_sensitivity - params.delta);
    CsfEstimate {
        peak_sensitivity,
        peak_frequency: 10f64.powf(params.peak_frequency),
        bandwidth: 10f64.powf(params.log_bandwidth),
        delta: peak_sensitivity - plateau,
    }
}

/// The flattened 4-D parameter grid with per-dimension lookup tables.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    radix: MixedRadix,
    /// Model value per index, one table per dimension.
    tables: [Vec<f64>; 4],
}

impl ParameterSpace {
    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new([
            config.peak_sensitivity_resolution,
            config.peak_frequency_resolution,
            config.bandwidth_resolution,
            config.delta_resolution,
        ])
    }

    pub fn new(sizes: [usize; 4]) -> Self {
        let tables = ParameterDimension::ALL.map(|dim| {
            (0..sizes[dim.position()])
                .map(|i| dim.model_value(i as f64))
                .collect::<Vec<f64>>()
        });
        debug!("Parameter space: sizes={sizes:?}");
        Self {
            radix: MixedRadix::new(&sizes),
            tables,
        }
    }

    pub fn radix(&self) -> &MixedRadix {
        &self.radix
    }

    /// Number of parameter combinations.
    pub fn count(&self) -> usize {
        self.radix.count()
    }

    pub fn size(&self, dim: ParameterDimension) -> usize {
        self.radix.dims()[dim.position()]
    }

    pub fn sizes(&self) -> [usize; 4] {
        let d = self.radix.dims();
        [d[0], d[1], d[2], d[3]]
    }

    /// Per-dimension indices of a flat parameter index.
    pub fn indices(&self, index: usize) -> [usize; 4] {
        let mut out = [0usize; 4];
        crate::math::inflate_into(index, self.radix.dims(), &mut out);
        out
    }

    /// Model-unit parameters of a grid point, read from the lookup tables.
    pub fn parameters(&self, index: usize) -> CsfParameters {
        let [s, f, b, d] = self.indices(index);
        CsfParameters {
            peak_sensitivity: self.tables[0][s],
            peak_frequency: self.tables[1][f],
            log_bandwidth: self.tables[2][b],
            delta: self.tables[3][d],
        }
    }

    /// `(min, max)` log10 range covered by a dimension.
    pub fn log_range(&self, dim: ParameterDimension) -> (f64, f64) {
        let n = self.size(dim).max(1);
        (dim.log_value(0.0), dim.log_value((n - 1) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_maps_match_reference_constants() {
        let p = map_parameters([0.0, 0.0, 0.0, 0.0]);
        assert!((p.peak_sensitivity - 0.3).abs() < 1e-15);
        assert!((p.peak_frequency + 0.7).abs() < 1e-15);
        assert_eq!(p.log_bandwidth, 0.0);
        assert!((p.delta - 10f64.powf(-1.7)).abs() < 1e-15);

        let p = map_parameters([10.0, 11.0, 12.0, 11.0]);
        assert!((p.peak_sensitivity - 1.3).abs() < 1e-12);
        assert!((p.peak_frequency - 0.4).abs() < 1e-12);
        assert!((p.log_bandwidth - 0.6).abs() < 1e-12);
        assert!((p.delta - 10f64.powf(-0.6)).abs() < 1e-12);
    }

    #[test]
    fn table_lookup_matches_direct_mapping() {
        let space = ParameterSpace::new([5, 4, 3, 2]);
        assert_eq!(space.count(), 120);
        for k in [0, 7, 59, 119] {
            let [s, f, b, d] = space.indices(k);
            let direct = map_parameters([s as f64, f as f64, b as f64, d as f64]);
            assert_eq!(space.parameters(k), direct);
        }
    }

    #[test]
    fn exponentiate_returns_linear_units() {
        let params = CsfParameters {
            peak_sensitivity: 2.0,
            peak_frequency: 0.0,
            log_bandwidth: 0.0,
            delta: 1.0,
        };
        let e = exponentiate(&params);
        assert!((e.peak_sensitivity - 100.0).abs() < 1e-9);
        assert!((e.peak_frequency - 1.0).abs() < 1e-12);
        assert!((e.bandwidth - 1.0).abs() < 1e-12);
        assert!((e.delta - 90.0).abs() < 1e-9);
    }

    #[test]
    fn log_range_spans_resolution() {
        let space = ParameterSpace::new([28, 21, 21, 21]);
        let (lo, hi) = space.log_range(ParameterDimension::PeakSensitivity);
        assert!((lo - 0.3).abs() < 1e-12);
        assert!((hi - 3.0).abs() < 1e-12);
        let (lo, hi) = space.log_range(ParameterDimension::PeakFrequency);
        assert!((lo + 0.7).abs() < 1e-12);
        assert!((hi - 1.3).abs() < 1e-12);
    }
}
