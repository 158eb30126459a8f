use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// A station value at projected (metric) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Estimates a surface at target points from scattered samples.
///
/// Kriging solvers plug in here; the crate only ships inverse distance weighting.
pub trait SpatialInterpolator {
    fn name(&self) -> &str;

    fn interpolate(&self, samples: &[SamplePoint], targets: &[(f64, f64)]) -> Result<Vec<f64>>;
}

/// Inverse distance weighting with weights `1 / d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseDistance;

impl InverseDistance {
    fn estimate(samples: &[SamplePoint], x: f64, y: f64) -> f64 {
        if let [only] = samples {
            return only.value;
        }
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for sample in samples {
            let distance = (sample.x - x).hypot(sample.y - y);
            if distance == 0.0 {
                return sample.value;
            }
            let weight = 1.0 / distance;
            weighted += sample.value * weight;
            total_weight += weight;
        }
        weighted / total_weight
    }
}

impl SpatialInterpolator for InverseDistance {
    fn name(&self) -> &str {
        "idw"
    }

    fn interpolate(&self, samples: &[SamplePoint], targets: &[(f64, f64)]) -> Result<Vec<f64>> {
        if samples.is_empty() {
            return Err(ProcessingError::MissingData(
                "no station values to interpolate".to_string(),
            ));
        }
        Ok(targets
            .iter()
            .map(|&(x, y)| Self::estimate(samples, x, y))
            .collect())
    }
}

/// Variogram model of an external kriging solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KrigingModel {
    Linear,
    Power,
    #[default]
    Gaussian,
    Spherical,
    Exponential,
    HoleEffect,
}

impl KrigingModel {
    pub fn name(&self) -> &'static str {
        match self {
            KrigingModel::Linear => "linear",
            KrigingModel::Power => "power",
            KrigingModel::Gaussian => "gaussian",
            KrigingModel::Spherical => "spherical",
            KrigingModel::Exponential => "exponential",
            KrigingModel::HoleEffect => "hole-effect",
        }
    }
}

impl FromStr for KrigingModel {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(KrigingModel::Linear),
            "power" => Ok(KrigingModel::Power),
            "gaussian" => Ok(KrigingModel::Gaussian),
            "spherical" => Ok(KrigingModel::Spherical),
            "exponential" => Ok(KrigingModel::Exponential),
            "hole-effect" | "hole_effect" => Ok(KrigingModel::HoleEffect),
            _ => Err(ProcessingError::InvalidKrigingModel(s.to_string())),
        }
    }
}

impl std::fmt::Display for KrigingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<SamplePoint> {
        vec![
            SamplePoint {
                x: 0.0,
                y: 0.0,
                value: 10.0,
            },
            SamplePoint {
                x: 100.0,
                y: 0.0,
                value: 20.0,
            },
        ]
    }

    #[test]
    fn test_idw_weights() -> Result<()> {
        let estimates = InverseDistance.interpolate(&samples(), &[(50.0, 0.0), (25.0, 0.0)])?;
        assert!((estimates[0] - 15.0).abs() < 1e-9);
        // Weights 1/25 and 1/75: (10 * 3 + 20) / 4.
        assert!((estimates[1] - 12.5).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_idw_exact_at_station() -> Result<()> {
        let estimates = InverseDistance.interpolate(&samples(), &[(100.0, 0.0)])?;
        assert_eq!(estimates, vec![20.0]);
        assert!(InverseDistance.interpolate(&[], &[(0.0, 0.0)]).is_err());
        Ok(())
    }

    #[test]
    fn test_idw_single_sample_is_constant() -> Result<()> {
        let single = [SamplePoint {
            x: 12_345.6,
            y: -7_890.1,
            value: 50.0,
        }];
        let targets: Vec<(f64, f64)> = (0..25)
            .map(|i| ((i % 5) as f64 * 33_333.3, (i / 5) as f64 * 27_777.7))
            .collect();
        let estimates = InverseDistance.interpolate(&single, &targets)?;
        assert!(estimates.iter().all(|v| *v == 50.0));
        Ok(())
    }

    #[test]
    fn test_kriging_model_names() {
        assert_eq!("Gaussian".parse::<KrigingModel>().unwrap(), KrigingModel::Gaussian);
        assert_eq!("hole-effect".parse::<KrigingModel>().unwrap(), KrigingModel::HoleEffect);
        assert!(matches!(
            "cubic".parse::<KrigingModel>(),
            Err(ProcessingError::InvalidKrigingModel(_))
        ));
        assert_eq!(KrigingModel::default().to_string(), "gaussian");
    }
}
