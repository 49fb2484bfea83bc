//! Differential chromatic refraction.
//!
//! Refractive index of air from the Edlén (1953) dispersion relation for dry
//! air at 15 °C and 760 mmHg, corrected to the ambient pressure and
//! temperature and for water vapour following Filippenko (1982, PASP 94, 715).

use crate::angle::Angle;
use crate::config::Atmosphere;

const KPA_TO_MMHG: f64 = 7.50061683;

/// `n - 1` for air at wavelength `wave_nm`.
pub fn air_refractive_index_minus_one(wave_nm: f64, atmosphere: &Atmosphere) -> f64 {
    // inverse wavenumber squared, micron^-2
    let sigma_squared = 1.0 / (wave_nm * 1e-3).powi(2);
    let mut n_minus_one = (64.328
        + 29498.1 / (146.0 - sigma_squared)
        + 255.4 / (41.0 - sigma_squared))
        * 1e-6;

    let p = atmosphere.pressure_kpa * KPA_TO_MMHG;
    let t = atmosphere.temperature_k - 273.15;
    let w = atmosphere.h2o_pressure_kpa * KPA_TO_MMHG;

    n_minus_one *= p * (1.0 + (1.049 - 0.0157 * t) * 1e-6 * p) / (720.883 * (1.0 + 0.003661 * t));
    n_minus_one -= (0.0624 - 0.000680 * sigma_squared) / (1.0 + 0.003661 * t) * w * 1e-6;
    n_minus_one
}

/// Refraction toward the zenith (radians) for a source at `zenith_angle`.
///
/// Plane-parallel approximation `R = (n² - 1) / (2 n²) · tan z`.
pub fn refraction(wave_nm: f64, zenith_angle: Angle, atmosphere: &Atmosphere) -> f64 {
    let nm1 = air_refractive_index_minus_one(wave_nm, atmosphere);
    // (n^2 - 1) / (2 n^2) without forming n^2 - 1 by cancellation
    let r0 = nm1 * (nm1 + 2.0) / 2.0 / (nm1 * nm1 + 2.0 * nm1 + 1.0);
    r0 * zenith_angle.tan()
}
