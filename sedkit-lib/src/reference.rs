//! Standard reference spectra for magnitude zeropoints.
//!
//! Both are built on first use and shared for the life of the process.

use std::sync::{Arc, OnceLock};

use log::debug;

use crate::constants::{
    AB_FLUX_DENSITY, BOLTZMANN_K, PLANCK_HC, VEGA_BLUE_LIMIT, VEGA_RED_LIMIT,
    VEGA_REFERENCE_FLAMBDA, VEGA_REFERENCE_WAVELENGTH, VEGA_TEMPERATURE,
};
use crate::error::Result;
use crate::sed::{FluxType, Sed};
use crate::table::LookupTable;

static AB: OnceLock<Arc<Sed>> = OnceLock::new();
static VEGA: OnceLock<Arc<Sed>> = OnceLock::new();

/// Tabulation step of the Vega reference (nm).
const VEGA_STEP: f64 = 1.0;

/// Flat f_nu spectrum at 3631 Jy; an AB magnitude of zero in every band.
pub fn ab_sed() -> Result<Arc<Sed>> {
    if let Some(sed) = AB.get() {
        return Ok(sed.clone());
    }
    let sed = Arc::new(Sed::constant(AB_FLUX_DENSITY, FluxType::Fnu)?);
    Ok(AB.get_or_init(|| sed).clone())
}

/// Vega stand-in: a blackbody at the Vega effective temperature scaled to
/// the observed monochromatic flux at 555.6 nm, tabulated in f_lambda.
pub fn vega_sed() -> Result<Arc<Sed>> {
    if let Some(sed) = VEGA.get() {
        return Ok(sed.clone());
    }
    let norm = VEGA_REFERENCE_FLAMBDA / planck_shape(VEGA_REFERENCE_WAVELENGTH, VEGA_TEMPERATURE);
    let n = ((VEGA_RED_LIMIT - VEGA_BLUE_LIMIT) / VEGA_STEP).round() as usize;
    let x: Vec<f64> = (0..=n)
        .map(|i| VEGA_BLUE_LIMIT + i as f64 * VEGA_STEP)
        .collect();
    let f: Vec<f64> = x
        .iter()
        .map(|&w| norm * planck_shape(w, VEGA_TEMPERATURE))
        .collect();
    debug!("tabulated Vega reference with {} knots", x.len());
    let sed = Arc::new(Sed::from_table(LookupTable::new(x, f)?, FluxType::Flambda)?);
    Ok(VEGA.get_or_init(|| sed).clone())
}

/// Planck B_lambda up to a constant factor, wavelength in nm.
fn planck_shape(wave_nm: f64, temperature: f64) -> f64 {
    let x = PLANCK_HC / (wave_nm * BOLTZMANN_K * temperature);
    1.0 / (wave_nm.powi(5) * x.exp_m1())
}
