//! Spectral energy distributions.
//!
//! An [`Sed`] stores its rest-frame spectrum in the flux convention it was
//! constructed with and always evaluates to photon density
//! (photons/s/cm²/nm) in the observed frame. Arithmetic builds lazy
//! combinator trees (see [`crate::spectral`]) and scalar factors are kept in
//! `scale`, so nothing is re-tabulated.

use std::fmt;
use std::ops::{Add, Div, DivAssign, Mul, MulAssign, Sub};
use std::str::FromStr;
use std::sync::Arc;

use log::debug;

use crate::constants::{ANGSTROMS_PER_NM, PLANCK_H, PLANCK_HC};
use crate::error::{Result, SedError};
use crate::expr::Expression;
use crate::interp::merge_knots;
use crate::spectral::{Op, Spectral, SpectralFn, SpectrumSpec};
use crate::table::{LookupTable, WaveUnit};
use crate::thin::thin_tabulated_values;

/// Flux density convention of the stored spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FluxType {
    /// photons/s/cm²/nm
    Photons,
    /// erg/s/cm²/nm
    #[default]
    Flambda,
    /// erg/s/cm²/Hz
    Fnu,
}

impl FluxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photons => "fphotons",
            Self::Flambda => "flambda",
            Self::Fnu => "fnu",
        }
    }

    /// Convert a density `value` at rest wavelength `wave` (nm) to photon density.
    pub fn to_photons(&self, value: f64, wave: f64) -> f64 {
        match self {
            Self::Photons => value,
            Self::Flambda => value * wave / PLANCK_HC,
            Self::Fnu => value / (wave * PLANCK_H),
        }
    }

    /// Factor converting a density tabulated against `unit` to one per nm.
    ///
    /// Per-wavelength densities pick up the unit ratio; f_nu does not.
    pub fn density_factor(&self, unit: WaveUnit) -> f64 {
        match (self, unit) {
            (Self::Fnu, _) | (_, WaveUnit::Nanometers) => 1.0,
            (_, WaveUnit::Angstroms) => ANGSTROMS_PER_NM,
        }
    }
}

impl FromStr for FluxType {
    type Err = SedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fphotons" => Ok(Self::Photons),
            "flambda" => Ok(Self::Flambda),
            "fnu" => Ok(Self::Fnu),
            _ => Err(SedError::construction(format!("unknown flux type: {s}"))),
        }
    }
}

impl fmt::Display for FluxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spectral energy distribution.
///
/// Immutable: every transform returns a new value.
#[derive(Debug, Clone)]
pub struct Sed {
    spec: Spectral,
    flux_type: FluxType,
    redshift: f64,
    scale: f64,
    rest_blue: f64,
    rest_red: f64,
    rest_wave_list: Vec<f64>,
    blue_limit: f64,
    red_limit: f64,
    wave_list: Vec<f64>,
}

impl Sed {
    pub fn from_spec(spec: SpectrumSpec, wave_unit: WaveUnit, flux_type: FluxType) -> Result<Self> {
        match spec {
            SpectrumSpec::Table(table) => Self::from_table_in(table, wave_unit, flux_type),
            SpectrumSpec::Expression(source) => {
                Self::from_expression_in(&source, wave_unit, flux_type)
            }
            SpectrumSpec::Callable(f) => Ok(Self::analytic(
                Spectral::Callable(f),
                wave_unit,
                flux_type,
            )),
        }
    }

    /// Tabulated SED with wavelengths in nanometers.
    pub fn from_table(table: LookupTable, flux_type: FluxType) -> Result<Self> {
        Self::from_table_in(table, WaveUnit::Nanometers, flux_type)
    }

    pub fn from_table_in(table: LookupTable, wave_unit: WaveUnit, flux_type: FluxType) -> Result<Self> {
        let table = table.converted(wave_unit, flux_type.density_factor(wave_unit))?;
        if table.x_min() < 0.0 {
            return Err(SedError::construction(format!(
                "negative wavelength {} in SED table",
                table.x_min()
            )));
        }
        let (blue, red) = (table.x_min(), table.x_max());
        let knots = table.x().to_vec();
        Ok(Self::assemble(
            Spectral::Table(Arc::new(table)),
            flux_type,
            0.0,
            1.0,
            blue,
            red,
            knots,
        ))
    }

    /// Analytic SED in the variable `wave` (nm), defined on `[0, inf]`.
    pub fn from_expression(source: &str, flux_type: FluxType) -> Result<Self> {
        Self::from_expression_in(source, WaveUnit::Nanometers, flux_type)
    }

    pub fn from_expression_in(source: &str, wave_unit: WaveUnit, flux_type: FluxType) -> Result<Self> {
        let expr = Expression::parse(source)?;
        Ok(Self::analytic(
            Spectral::Expr(Arc::new(expr)),
            wave_unit,
            flux_type,
        ))
    }

    /// Analytic SED from a function of wavelength (nm).
    pub fn from_fn<F>(f: F, flux_type: FluxType) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::analytic(
            Spectral::Callable(SpectralFn::new(f)),
            WaveUnit::Nanometers,
            flux_type,
        )
    }

    /// Flat SED with density `value` in the given convention.
    pub fn constant(value: f64, flux_type: FluxType) -> Result<Self> {
        if !value.is_finite() {
            return Err(SedError::construction(format!(
                "constant SED value must be finite, got {value}"
            )));
        }
        Ok(Self::analytic(
            Spectral::Constant(value),
            WaveUnit::Nanometers,
            flux_type,
        ))
    }

    fn analytic(spectral: Spectral, wave_unit: WaveUnit, flux_type: FluxType) -> Self {
        let spectral = match wave_unit {
            WaveUnit::Nanometers => spectral,
            WaveUnit::Angstroms => spectral
                .stretched(ANGSTROMS_PER_NM)
                .scaled(flux_type.density_factor(wave_unit)),
        };
        Self::assemble(spectral, flux_type, 0.0, 1.0, 0.0, f64::INFINITY, Vec::new())
    }

    fn assemble(
        spec: Spectral,
        flux_type: FluxType,
        redshift: f64,
        scale: f64,
        rest_blue: f64,
        rest_red: f64,
        rest_wave_list: Vec<f64>,
    ) -> Self {
        let zf = 1.0 + redshift;
        let (blue_limit, red_limit) = observed_limits(rest_blue, rest_red, zf);
        let mut wave_list: Vec<f64> = Vec::with_capacity(rest_wave_list.len());
        for &w in &rest_wave_list {
            let obs = (w * zf).clamp(blue_limit, red_limit);
            if wave_list.last() != Some(&obs) {
                wave_list.push(obs);
            }
        }
        Sed {
            spec,
            flux_type,
            redshift,
            scale,
            rest_blue,
            rest_red,
            rest_wave_list,
            blue_limit,
            red_limit,
            wave_list,
        }
    }

    // new spectrum over the same domain and redshift
    fn with_spec(&self, spec: Spectral, flux_type: FluxType, scale: f64) -> Self {
        Sed {
            spec,
            flux_type,
            scale,
            ..self.clone()
        }
    }

    /// Photon density at observed wavelength `wave` (nm).
    pub fn evaluate(&self, wave: f64) -> Result<f64> {
        if !(wave >= self.blue_limit && wave <= self.red_limit) {
            return Err(SedError::Domain {
                x: wave,
                min: self.blue_limit,
                max: self.red_limit,
            });
        }
        let rest = (wave / (1.0 + self.redshift)).clamp(self.rest_blue, self.rest_red);
        self.rest_photons(rest)
    }

    pub fn evaluate_many(&self, waves: &[f64]) -> Result<Vec<f64>> {
        waves.iter().map(|&w| self.evaluate(w)).collect()
    }

    /// Photon density at rest-frame wavelength `wave`, scale included.
    pub(crate) fn rest_photons(&self, wave: f64) -> Result<f64> {
        let value = self.spec.eval(wave)?;
        Ok(self.flux_type.to_photons(value, wave) * self.scale)
    }

    /// The same rest-frame spectrum observed at redshift `z`.
    ///
    /// `z` is absolute, so applying the same redshift twice is a no-op.
    pub fn at_redshift(&self, z: f64) -> Result<Sed> {
        if !(z.is_finite() && z > -1.0) {
            return Err(SedError::construction(format!(
                "redshift must be greater than -1, got {z}"
            )));
        }
        Ok(Self::assemble(
            self.spec.clone(),
            self.flux_type,
            z,
            self.scale,
            self.rest_blue,
            self.rest_red,
            self.rest_wave_list.clone(),
        ))
    }

    /// Drop knots while keeping the integral within `rel_err`.
    ///
    /// The result is tabulated in photon density on the surviving knots.
    /// Analytic SEDs are returned unchanged.
    pub fn thin(&self, rel_err: f64) -> Result<Sed> {
        if self.rest_wave_list.len() < 3 {
            if !(rel_err > 0.0 && rel_err < 1.0) {
                return Err(SedError::construction(format!(
                    "rel_err must be in (0, 1), got {rel_err}"
                )));
            }
            return Ok(self.clone());
        }
        let photons = self
            .rest_wave_list
            .iter()
            .map(|&w| self.rest_photons(w))
            .collect::<Result<Vec<f64>>>()?;
        let (x, f) = thin_tabulated_values(&self.rest_wave_list, &photons, rel_err)?;
        debug!("thinned SED from {} to {} knots", photons.len(), x.len());
        let table = LookupTable::new(x, f)?;
        let (blue, red) = (table.x_min(), table.x_max());
        let knots = table.x().to_vec();
        Ok(Self::assemble(
            Spectral::Table(Arc::new(table)),
            FluxType::Photons,
            self.redshift,
            1.0,
            blue,
            red,
            knots,
        ))
    }

    /// Restrict the observed-frame domain to `[blue, red]`.
    pub fn truncate(&self, blue: f64, red: f64) -> Result<Sed> {
        let zf = 1.0 + self.redshift;
        let rest_blue = (blue / zf).max(self.rest_blue);
        let rest_red = (red / zf).min(self.rest_red);
        if !(rest_blue < rest_red) {
            return Err(SedError::construction(format!(
                "truncation [{blue}, {red}] leaves an empty domain"
            )));
        }
        let inside: Vec<f64> = self
            .rest_wave_list
            .iter()
            .copied()
            .filter(|w| (rest_blue..=rest_red).contains(w))
            .collect();
        let knots = if self.rest_wave_list.is_empty() {
            inside
        } else {
            merge_knots(&[rest_blue, rest_red], &inside)
        };
        Ok(Self::assemble(
            self.spec.clone(),
            self.flux_type,
            self.redshift,
            self.scale,
            rest_blue,
            rest_red,
            knots,
        ))
    }

    /// Rescale so the photon density at `wavelength` equals `target`.
    pub fn with_flux_density(&self, target: f64, wavelength: f64) -> Result<Sed> {
        let current = self.evaluate(wavelength)?;
        if current == 0.0 || !current.is_finite() {
            return Err(SedError::NonPositiveFlux(current));
        }
        Ok(self * (target / current))
    }

    pub fn flux_type(&self) -> FluxType {
        self.flux_type
    }

    pub fn redshift(&self) -> f64 {
        self.redshift
    }

    pub fn blue_limit(&self) -> f64 {
        self.blue_limit
    }

    pub fn red_limit(&self) -> f64 {
        self.red_limit
    }

    /// Observed-frame knots, empty for analytic SEDs.
    pub fn wave_list(&self) -> &[f64] {
        &self.wave_list
    }

    pub fn is_analytic(&self) -> bool {
        self.wave_list.is_empty()
    }

    fn scaled_by(&self, k: f64) -> Sed {
        let mut out = self.clone();
        out.scale *= k;
        out
    }

    fn combine(op: Op, a: &Sed, b: &Sed) -> Result<Sed> {
        if a.redshift != b.redshift {
            return Err(SedError::incompatible(format!(
                "cannot combine SEDs at redshifts {} and {}",
                a.redshift, b.redshift
            )));
        }
        let rest_blue = a.rest_blue.max(b.rest_blue);
        let rest_red = a.rest_red.min(b.rest_red);
        if !(rest_blue < rest_red) {
            return Err(SedError::incompatible(format!(
                "SED domains [{}, {}] and [{}, {}] do not overlap",
                a.blue_limit, a.red_limit, b.blue_limit, b.red_limit
            )));
        }
        let knots: Vec<f64> = merge_knots(&a.rest_wave_list, &b.rest_wave_list)
            .into_iter()
            .filter(|w| (rest_blue..=rest_red).contains(w))
            .collect();
        let spec = Spectral::combine(
            op,
            Spectral::Rest(Arc::new(a.clone())),
            Spectral::Rest(Arc::new(b.clone())),
        );
        Ok(Self::assemble(
            spec,
            FluxType::Photons,
            a.redshift,
            1.0,
            rest_blue,
            rest_red,
            knots,
        ))
    }

    // f observed-frame, evaluated at rest * (1 + z)
    fn observed_fn(&self, f: &SpectralFn) -> Spectral {
        Spectral::Callable(f.clone()).stretched(1.0 + self.redshift)
    }

    fn rest_node(&self) -> Spectral {
        Spectral::Rest(Arc::new(self.clone()))
    }
}

/// Observed limits for a rest-frame domain, nudged so that dividing by
/// `zf` never lands outside `[rest_blue, rest_red]`.
fn observed_limits(rest_blue: f64, rest_red: f64, zf: f64) -> (f64, f64) {
    let mut blue = rest_blue * zf;
    while blue / zf < rest_blue {
        blue = next_up(blue);
    }
    let mut red = rest_red * zf;
    while red / zf > rest_red {
        red = next_down(red);
    }
    (blue, red)
}

fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    f64::from_bits(if x > 0.0 { bits + 1 } else { bits - 1 })
}

fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

impl Add for &Sed {
    type Output = Result<Sed>;

    fn add(self, rhs: &Sed) -> Result<Sed> {
        Sed::combine(Op::Add, self, rhs)
    }
}

impl Add for Sed {
    type Output = Result<Sed>;

    fn add(self, rhs: Sed) -> Result<Sed> {
        &self + &rhs
    }
}

impl Sub for &Sed {
    type Output = Result<Sed>;

    fn sub(self, rhs: &Sed) -> Result<Sed> {
        Sed::combine(Op::Sub, self, rhs)
    }
}

impl Sub for Sed {
    type Output = Result<Sed>;

    fn sub(self, rhs: Sed) -> Result<Sed> {
        &self - &rhs
    }
}

impl Mul<f64> for &Sed {
    type Output = Sed;

    fn mul(self, k: f64) -> Sed {
        self.scaled_by(k)
    }
}

impl Mul<f64> for Sed {
    type Output = Sed;

    fn mul(self, k: f64) -> Sed {
        self.scaled_by(k)
    }
}

impl Mul<&Sed> for f64 {
    type Output = Sed;

    fn mul(self, sed: &Sed) -> Sed {
        sed.scaled_by(self)
    }
}

impl Mul<Sed> for f64 {
    type Output = Sed;

    fn mul(self, sed: Sed) -> Sed {
        sed.scaled_by(self)
    }
}

impl Div<f64> for &Sed {
    type Output = Sed;

    fn div(self, k: f64) -> Sed {
        self.scaled_by(1.0 / k)
    }
}

impl Div<f64> for Sed {
    type Output = Sed;

    fn div(self, k: f64) -> Sed {
        self.scaled_by(1.0 / k)
    }
}

/// `k / sed(w)`, in photon density.
impl Div<&Sed> for f64 {
    type Output = Sed;

    fn div(self, sed: &Sed) -> Sed {
        let spec = Spectral::combine(Op::Div, Spectral::Constant(self), sed.rest_node());
        sed.with_spec(spec, FluxType::Photons, 1.0)
    }
}

impl Div<Sed> for f64 {
    type Output = Sed;

    fn div(self, sed: Sed) -> Sed {
        self / &sed
    }
}

impl MulAssign<f64> for Sed {
    fn mul_assign(&mut self, k: f64) {
        *self = &*self * k;
    }
}

impl DivAssign<f64> for Sed {
    fn div_assign(&mut self, k: f64) {
        *self = &*self / k;
    }
}

impl Mul<&SpectralFn> for &Sed {
    type Output = Sed;

    fn mul(self, f: &SpectralFn) -> Sed {
        let spec = Spectral::combine(Op::Mul, self.spec.clone(), self.observed_fn(f));
        self.with_spec(spec, self.flux_type, self.scale)
    }
}

impl Mul<&Sed> for &SpectralFn {
    type Output = Sed;

    fn mul(self, sed: &Sed) -> Sed {
        sed * self
    }
}

impl Div<&SpectralFn> for &Sed {
    type Output = Sed;

    fn div(self, f: &SpectralFn) -> Sed {
        let spec = Spectral::combine(Op::Div, self.spec.clone(), self.observed_fn(f));
        self.with_spec(spec, self.flux_type, self.scale)
    }
}

/// `f(w) / sed(w)`, in photon density.
impl Div<&Sed> for &SpectralFn {
    type Output = Sed;

    fn div(self, sed: &Sed) -> Sed {
        let spec = Spectral::combine(Op::Div, sed.observed_fn(self), sed.rest_node());
        sed.with_spec(spec, FluxType::Photons, 1.0)
    }
}
