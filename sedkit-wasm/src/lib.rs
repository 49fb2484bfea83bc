//! WASM bindings for sedkit.
//!
//! Spectra and throughputs cross the boundary as parallel wavelength (nm)
//! and value arrays.
//!
//! Build with:
//! ```sh
//! wasm-pack build -p sedkit-wasm
//! ```

use js_sys::{Array, Float64Array};
use wasm_bindgen::prelude::*;

use sedkit::constants::ARCSEC_PER_RADIAN;
use sedkit::{Angle, Bandpass, FluxType, LookupTable, Sed, Zeropoint};

fn to_js(e: sedkit::SedError) -> JsError {
    JsError::new(&e.to_string())
}

fn build_sed(waves: &[f64], flux: &[f64], flux_type: &str, redshift: f64) -> Result<Sed, JsError> {
    let flux_type: FluxType = flux_type.parse().map_err(to_js)?;
    let table = LookupTable::new(waves.to_vec(), flux.to_vec()).map_err(to_js)?;
    Sed::from_table(table, flux_type)
        .and_then(|sed| sed.at_redshift(redshift))
        .map_err(to_js)
}

fn build_bandpass(waves: &[f64], throughput: &[f64], zeropoint: &str) -> Result<Bandpass, JsError> {
    let zeropoint = Zeropoint::parse(zeropoint).map_err(to_js)?;
    let table = LookupTable::new(waves.to_vec(), throughput.to_vec()).map_err(to_js)?;
    Bandpass::from_table(table, Some(zeropoint)).map_err(to_js)
}

// ── Photometry ──

/// Magnitude of a tabulated SED through a tabulated bandpass.
///
/// `flux_type` is one of "fphotons", "flambda", "fnu"; `zeropoint` is "AB",
/// "Vega" or a photon flux.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn sed_magnitude(
    waves: &[f64],
    flux: &[f64],
    flux_type: &str,
    redshift: f64,
    band_waves: &[f64],
    throughput: &[f64],
    zeropoint: &str,
) -> Result<f64, JsError> {
    let sed = build_sed(waves, flux, flux_type, redshift)?;
    let bandpass = build_bandpass(band_waves, throughput, zeropoint)?;
    sed.calculate_magnitude(&bandpass).map_err(to_js)
}

/// DCR moments as `[rbar_x, rbar_y, v_xx, v_xy, v_yy]`, all in arcsec
/// (arcsec² for the covariance). Angles are in degrees.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn dcr_moment_shifts(
    waves: &[f64],
    flux: &[f64],
    flux_type: &str,
    band_waves: &[f64],
    throughput: &[f64],
    zenith_deg: f64,
    parallactic_deg: f64,
) -> Result<Vec<f64>, JsError> {
    let sed = build_sed(waves, flux, flux_type, 0.0)?;
    let bandpass = build_bandpass(band_waves, throughput, "AB")?;
    let shifts = sed
        .calculate_dcr_moment_shifts(
            &bandpass,
            Angle::from_degrees(zenith_deg),
            Angle::from_degrees(parallactic_deg),
        )
        .map_err(to_js)?;
    let arcsec = ARCSEC_PER_RADIAN;
    Ok(vec![
        shifts.rbar[0] * arcsec,
        shifts.rbar[1] * arcsec,
        shifts.v[0][0] * arcsec * arcsec,
        shifts.v[0][1] * arcsec * arcsec,
        shifts.v[1][1] * arcsec * arcsec,
    ])
}

/// Photon-weighted seeing second-moment ratio.
#[wasm_bindgen]
pub fn seeing_moment_shift(
    waves: &[f64],
    flux: &[f64],
    flux_type: &str,
    band_waves: &[f64],
    throughput: &[f64],
) -> Result<f64, JsError> {
    let sed = build_sed(waves, flux, flux_type, 0.0)?;
    let bandpass = build_bandpass(band_waves, throughput, "AB")?;
    sed.calculate_seeing_moment_shifts(&bandpass).map_err(to_js)
}

// ── Tables ──

/// Thinned knots as a two-element array `[x, f]` of `Float64Array`s.
#[wasm_bindgen]
pub fn thin_table(x: &[f64], f: &[f64], rel_err: f64) -> Result<Array, JsError> {
    let (tx, tf) = sedkit::thin_tabulated_values(x, f, rel_err).map_err(to_js)?;
    Ok(Array::of2(
        &Float64Array::from(&tx[..]),
        &Float64Array::from(&tf[..]),
    ))
}

/// Whether `expr` is a valid spectrum expression in `wave`.
#[wasm_bindgen]
pub fn validate_expression(expr: &str) -> bool {
    sedkit::validate_expression(expr)
}
