//! Tunable physical and numerical parameters.

use serde::{Deserialize, Serialize};

/// Atmospheric conditions for the refraction model.
///
/// Defaults describe a high, dry observatory site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atmosphere {
    /// Air pressure (kPa)
    pub pressure_kpa: f64,
    /// Air temperature (K)
    pub temperature_k: f64,
    /// Partial pressure of water vapour (kPa)
    pub h2o_pressure_kpa: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Atmosphere {
            pressure_kpa: 69.328,
            temperature_k: 293.15,
            h2o_pressure_kpa: 1.067,
        }
    }
}

/// Power-law chromatic seeing: PSF size scales as `(wave / base_wavelength)^alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeeingModel {
    pub alpha: f64,
    /// Reference wavelength (nm)
    pub base_wavelength_nm: f64,
}

impl Default for SeeingModel {
    fn default() -> Self {
        SeeingModel {
            alpha: -0.2,
            base_wavelength_nm: 500.0,
        }
    }
}

/// Controls for adaptive quadrature over purely analytic integrands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureConfig {
    pub rel_tol: f64,
    pub abs_tol: f64,
    pub max_depth: u32,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        QuadratureConfig {
            rel_tol: 1e-10,
            abs_tol: 0.0,
            max_depth: 48,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let atm = Atmosphere {
            temperature_k: 280.0,
            ..Default::default()
        };
        let bytes = postcard::to_allocvec(&atm).unwrap();
        let back: Atmosphere = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(back, atm);
        assert_eq!(back.pressure_kpa, 69.328);
    }
}
