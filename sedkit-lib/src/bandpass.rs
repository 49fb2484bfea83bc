//! Instrument throughput functions.

use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use log::debug;

use crate::config::QuadratureConfig;
use crate::error::{Result, SedError};
use crate::expr::Expression;
use crate::integ::{adaptive_simpson, integrate_on_nodes};
use crate::interp::merge_knots;
use crate::reference;
use crate::sed::Sed;
use crate::spectral::{Op, Spectral, SpectralFn, SpectrumSpec};
use crate::table::{LookupTable, WaveUnit};
use crate::thin::thin_tabulated_values;

/// Reference defining magnitude zero for a bandpass.
#[derive(Debug, Clone, Default)]
pub enum Zeropoint {
    /// Flat in frequency at 3631 Jy.
    #[default]
    Ab,
    Vega,
    /// Photon flux (photons/s/cm²) that has magnitude zero.
    Flux(f64),
    /// Reference spectrum whose flux through the bandpass has magnitude zero.
    Sed(Box<Sed>),
}

impl Zeropoint {
    /// Parse `"AB"`, `"Vega"` (any case) or a positive flux.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "ab" => return Ok(Self::Ab),
            "vega" => return Ok(Self::Vega),
            _ => {}
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Ok(Self::Flux(v)),
            _ => Err(SedError::construction(format!("unknown zeropoint: {s}"))),
        }
    }

    fn name(&self) -> String {
        match self {
            Self::Ab => "AB".to_string(),
            Self::Vega => "Vega".to_string(),
            Self::Flux(v) => format!("{v}"),
            Self::Sed(_) => "SED".to_string(),
        }
    }
}

impl FromStr for Zeropoint {
    type Err = SedError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Sed> for Zeropoint {
    fn from(sed: Sed) -> Self {
        Zeropoint::Sed(Box::new(sed))
    }
}

impl fmt::Display for Zeropoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Dimensionless throughput over a finite wavelength range (nm).
#[derive(Debug, Clone)]
pub struct Bandpass {
    func: Spectral,
    blue_limit: f64,
    red_limit: f64,
    wave_list: Vec<f64>,
    zeropoint: Zeropoint,
    zeropoint_flux: OnceLock<f64>,
}

impl Bandpass {
    /// Build from any spectrum input. Tables default to their own range;
    /// expressions and callables need `limits`.
    pub fn from_spec(
        spec: SpectrumSpec,
        wave_unit: WaveUnit,
        limits: Option<(f64, f64)>,
        zeropoint: Option<Zeropoint>,
    ) -> Result<Self> {
        match spec {
            SpectrumSpec::Table(table) => {
                let bp = Self::from_table_in(table, wave_unit, zeropoint)?;
                match limits {
                    Some((blue, red)) => bp.truncate(wave_unit.to_nm(blue), wave_unit.to_nm(red)),
                    None => Ok(bp),
                }
            }
            SpectrumSpec::Expression(source) => {
                let (blue, red) = require_limits(limits)?;
                let expr = Expression::parse(&source)?;
                Self::analytic(
                    Spectral::Expr(Arc::new(expr)),
                    wave_unit,
                    blue,
                    red,
                    zeropoint,
                )
            }
            SpectrumSpec::Callable(f) => {
                let (blue, red) = require_limits(limits)?;
                Self::analytic(Spectral::Callable(f), wave_unit, blue, red, zeropoint)
            }
        }
    }

    pub fn from_table(table: LookupTable, zeropoint: Option<Zeropoint>) -> Result<Self> {
        Self::from_table_in(table, WaveUnit::Nanometers, zeropoint)
    }

    pub fn from_table_in(
        table: LookupTable,
        wave_unit: WaveUnit,
        zeropoint: Option<Zeropoint>,
    ) -> Result<Self> {
        let table = table.converted(wave_unit, 1.0)?;
        if table.x_min() < 0.0 {
            return Err(SedError::construction(format!(
                "negative wavelength {} in bandpass table",
                table.x_min()
            )));
        }
        Ok(Self::assemble(
            Spectral::Table(Arc::new(table.clone())),
            table.x_min(),
            table.x_max(),
            table.x().to_vec(),
            zeropoint.unwrap_or_default(),
        ))
    }

    /// Throughput `source` in the variable `wave` (nm) on `[blue, red]`.
    pub fn from_expression(
        source: &str,
        blue: f64,
        red: f64,
        zeropoint: Option<Zeropoint>,
    ) -> Result<Self> {
        let expr = Expression::parse(source)?;
        Self::analytic(
            Spectral::Expr(Arc::new(expr)),
            WaveUnit::Nanometers,
            blue,
            red,
            zeropoint,
        )
    }

    pub fn from_fn<F>(f: F, blue: f64, red: f64, zeropoint: Option<Zeropoint>) -> Result<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::analytic(
            Spectral::Callable(SpectralFn::new(f)),
            WaveUnit::Nanometers,
            blue,
            red,
            zeropoint,
        )
    }

    fn analytic(
        func: Spectral,
        wave_unit: WaveUnit,
        blue: f64,
        red: f64,
        zeropoint: Option<Zeropoint>,
    ) -> Result<Self> {
        let (blue, red) = (wave_unit.to_nm(blue), wave_unit.to_nm(red));
        if !(blue.is_finite() && red.is_finite() && blue >= 0.0 && blue < red) {
            return Err(SedError::construction(format!(
                "bandpass limits must satisfy 0 <= blue < red < inf, got [{blue}, {red}]"
            )));
        }
        let func = match wave_unit {
            WaveUnit::Nanometers => func,
            WaveUnit::Angstroms => func.stretched(crate::constants::ANGSTROMS_PER_NM),
        };
        Ok(Self::assemble(
            func,
            blue,
            red,
            Vec::new(),
            zeropoint.unwrap_or_default(),
        ))
    }

    fn assemble(
        func: Spectral,
        blue_limit: f64,
        red_limit: f64,
        wave_list: Vec<f64>,
        zeropoint: Zeropoint,
    ) -> Self {
        Bandpass {
            func,
            blue_limit,
            red_limit,
            wave_list,
            zeropoint,
            zeropoint_flux: OnceLock::new(),
        }
    }

    /// Throughput at `wave` (nm).
    pub fn evaluate(&self, wave: f64) -> Result<f64> {
        if !(wave >= self.blue_limit && wave <= self.red_limit) {
            return Err(SedError::Domain {
                x: wave,
                min: self.blue_limit,
                max: self.red_limit,
            });
        }
        self.func.eval(wave)
    }

    pub fn evaluate_many(&self, waves: &[f64]) -> Result<Vec<f64>> {
        waves.iter().map(|&w| self.evaluate(w)).collect()
    }

    pub fn blue_limit(&self) -> f64 {
        self.blue_limit
    }

    pub fn red_limit(&self) -> f64 {
        self.red_limit
    }

    pub fn wave_list(&self) -> &[f64] {
        &self.wave_list
    }

    pub fn zeropoint(&self) -> &Zeropoint {
        &self.zeropoint
    }

    /// Same throughput with a different zeropoint.
    pub fn with_zeropoint(&self, zeropoint: Zeropoint) -> Bandpass {
        Self::assemble(
            self.func.clone(),
            self.blue_limit,
            self.red_limit,
            self.wave_list.clone(),
            zeropoint,
        )
    }

    /// Restrict to `[blue, red]`, keeping the zeropoint.
    pub fn truncate(&self, blue: f64, red: f64) -> Result<Bandpass> {
        let blue = blue.max(self.blue_limit);
        let red = red.min(self.red_limit);
        if !(blue < red) {
            return Err(SedError::construction(format!(
                "truncation [{blue}, {red}] leaves an empty bandpass"
            )));
        }
        let wave_list = if self.wave_list.is_empty() {
            Vec::new()
        } else {
            let inside: Vec<f64> = self
                .wave_list
                .iter()
                .copied()
                .filter(|w| (blue..=red).contains(w))
                .collect();
            merge_knots(&[blue, red], &inside)
        };
        Ok(Self::assemble(
            self.func.clone(),
            blue,
            red,
            wave_list,
            self.zeropoint.clone(),
        ))
    }

    /// Drop knots while keeping the throughput integral within `rel_err`.
    pub fn thin(&self, rel_err: f64) -> Result<Bandpass> {
        if self.wave_list.len() < 3 {
            if !(rel_err > 0.0 && rel_err < 1.0) {
                return Err(SedError::construction(format!(
                    "rel_err must be in (0, 1), got {rel_err}"
                )));
            }
            return Ok(self.clone());
        }
        let values = self.evaluate_many(&self.wave_list)?;
        let (x, f) = thin_tabulated_values(&self.wave_list, &values, rel_err)?;
        let table = LookupTable::new(x, f)?;
        Ok(Self::assemble(
            Spectral::Table(Arc::new(table.clone())),
            table.x_min(),
            table.x_max(),
            table.x().to_vec(),
            self.zeropoint.clone(),
        ))
    }

    /// Throughput-weighted mean wavelength (nm).
    pub fn effective_wavelength(&self) -> Result<f64> {
        let config = QuadratureConfig::default();
        let (num, den) = if self.wave_list.is_empty() {
            (
                adaptive_simpson(|w| Ok(w * self.func.eval(w)?), self.blue_limit, self.red_limit, &config)?,
                adaptive_simpson(|w| self.func.eval(w), self.blue_limit, self.red_limit, &config)?,
            )
        } else {
            (
                integrate_on_nodes(&self.wave_list, |w| Ok(w * self.evaluate(w)?))?,
                integrate_on_nodes(&self.wave_list, |w| self.evaluate(w))?,
            )
        };
        if den == 0.0 {
            return Err(SedError::NonIntegrable(
                "bandpass has zero total throughput".to_string(),
            ));
        }
        Ok(num / den)
    }

    /// Photon flux with magnitude zero, resolved once and cached.
    pub fn zeropoint_flux(&self) -> Result<f64> {
        if let Some(&flux) = self.zeropoint_flux.get() {
            return Ok(flux);
        }
        let flux = match &self.zeropoint {
            Zeropoint::Flux(v) => *v,
            Zeropoint::Ab => reference::ab_sed()?.calculate_flux(Some(self))?,
            Zeropoint::Vega => reference::vega_sed()?.calculate_flux(Some(self))?,
            Zeropoint::Sed(sed) => sed.calculate_flux(Some(self))?,
        };
        if !(flux > 0.0 && flux.is_finite()) {
            return Err(SedError::NonPositiveFlux(flux));
        }
        debug!("resolved {} zeropoint flux {flux}", self.zeropoint);
        Ok(*self.zeropoint_flux.get_or_init(|| flux))
    }

    fn scaled_by(&self, k: f64) -> Bandpass {
        Self::assemble(
            self.func.clone().scaled(k),
            self.blue_limit,
            self.red_limit,
            self.wave_list.clone(),
            Zeropoint::default(),
        )
    }

    fn with_fn(&self, op: Op, f: &SpectralFn) -> Bandpass {
        Self::assemble(
            Spectral::combine(op, self.func.clone(), Spectral::Callable(f.clone())),
            self.blue_limit,
            self.red_limit,
            self.wave_list.clone(),
            Zeropoint::default(),
        )
    }
}

fn require_limits(limits: Option<(f64, f64)>) -> Result<(f64, f64)> {
    limits.ok_or_else(|| {
        SedError::construction("analytic bandpass needs blue and red limits".to_string())
    })
}

/// Product throughput on the overlap of both ranges.
impl Mul for &Bandpass {
    type Output = Result<Bandpass>;

    fn mul(self, rhs: &Bandpass) -> Result<Bandpass> {
        let blue = self.blue_limit.max(rhs.blue_limit);
        let red = self.red_limit.min(rhs.red_limit);
        if !(blue < red) {
            return Err(SedError::incompatible(format!(
                "bandpasses [{}, {}] and [{}, {}] do not overlap",
                self.blue_limit, self.red_limit, rhs.blue_limit, rhs.red_limit
            )));
        }
        let wave_list: Vec<f64> = merge_knots(&self.wave_list, &rhs.wave_list)
            .into_iter()
            .filter(|w| (blue..=red).contains(w))
            .collect();
        Ok(Bandpass::assemble(
            Spectral::combine(Op::Mul, self.func.clone(), rhs.func.clone()),
            blue,
            red,
            wave_list,
            Zeropoint::default(),
        ))
    }
}

impl Mul for Bandpass {
    type Output = Result<Bandpass>;

    fn mul(self, rhs: Bandpass) -> Result<Bandpass> {
        &self * &rhs
    }
}

impl Mul<f64> for &Bandpass {
    type Output = Bandpass;

    fn mul(self, k: f64) -> Bandpass {
        self.scaled_by(k)
    }
}

impl Mul<&Bandpass> for f64 {
    type Output = Bandpass;

    fn mul(self, bp: &Bandpass) -> Bandpass {
        bp.scaled_by(self)
    }
}

impl Div<f64> for &Bandpass {
    type Output = Bandpass;

    fn div(self, k: f64) -> Bandpass {
        self.scaled_by(1.0 / k)
    }
}

impl Mul<&SpectralFn> for &Bandpass {
    type Output = Bandpass;

    fn mul(self, f: &SpectralFn) -> Bandpass {
        self.with_fn(Op::Mul, f)
    }
}

impl Mul<&Bandpass> for &SpectralFn {
    type Output = Bandpass;

    fn mul(self, bp: &Bandpass) -> Bandpass {
        bp.with_fn(Op::Mul, self)
    }
}

impl Div<&SpectralFn> for &Bandpass {
    type Output = Bandpass;

    fn div(self, f: &SpectralFn) -> Bandpass {
        self.with_fn(Op::Div, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Bandpass {
        let t = LookupTable::new(vec![400.0, 500.0, 600.0], vec![0.0, 1.0, 0.0]).unwrap();
        Bandpass::from_table(t, None).unwrap()
    }

    #[test]
    fn test_zeropoint_parse() {
        assert!(matches!(Zeropoint::parse("AB").unwrap(), Zeropoint::Ab));
        assert!(matches!(Zeropoint::parse("ab").unwrap(), Zeropoint::Ab));
        assert!(matches!(Zeropoint::parse("VEGA").unwrap(), Zeropoint::Vega));
        assert!(matches!(Zeropoint::parse("1e5").unwrap(), Zeropoint::Flux(v) if v == 1e5));
        assert!(Zeropoint::parse("jansky").is_err());
        assert!(Zeropoint::parse("-3").is_err());
        assert!(matches!(triangle().zeropoint(), Zeropoint::Ab));
    }

    #[test]
    fn test_evaluate_and_domain() {
        let bp = triangle();
        assert_eq!(bp.evaluate(500.0).unwrap(), 1.0);
        assert_relative_eq!(bp.evaluate(450.0).unwrap(), 0.5, epsilon = 1e-15);
        assert!(matches!(bp.evaluate(399.0), Err(SedError::Domain { .. })));
        assert_relative_eq!(bp.effective_wavelength().unwrap(), 500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_product() {
        let a = triangle();
        let b = Bandpass::from_expression("wave / 1000", 450.0, 700.0, Some(Zeropoint::Vega)).unwrap();
        let c = (&a * &b).unwrap();
        assert_eq!(c.blue_limit(), 450.0);
        assert_eq!(c.red_limit(), 600.0);
        assert_eq!(c.wave_list(), &[500.0, 600.0]);
        assert!(matches!(c.zeropoint(), Zeropoint::Ab));
        assert_relative_eq!(c.evaluate(475.0).unwrap(), 0.75 * 0.475, max_relative = 1e-14);

        let far = Bandpass::from_fn(|_| 1.0, 800.0, 900.0, None).unwrap();
        assert!(matches!(&a * &far, Err(SedError::IncompatibleOperand(_))));
    }

    #[test]
    fn test_analytic_needs_limits() {
        assert!(Bandpass::from_spec("wave".into(), WaveUnit::Nanometers, None, None).is_err());
        assert!(Bandpass::from_expression("1", 500.0, 400.0, None).is_err());
        assert!(Bandpass::from_expression("open('x')", 400.0, 500.0, None).is_err());
        let bp = Bandpass::from_spec(
            "1".into(),
            WaveUnit::Angstroms,
            Some((4000.0, 5000.0)),
            None,
        )
        .unwrap();
        assert_eq!(bp.blue_limit(), 400.0);
        assert_eq!(bp.red_limit(), 500.0);
    }

    #[test]
    fn test_truncate_and_thin() {
        let x: Vec<f64> = (0..=300).map(|i| 400.0 + i as f64).collect();
        let f: Vec<f64> = x.iter().map(|w| (-(w - 550.0_f64).powi(2) / 2000.0).exp()).collect();
        let bp = Bandpass::from_table(LookupTable::new(x, f).unwrap(), Some(Zeropoint::Vega)).unwrap();
        let t = bp.truncate(450.5, 650.0).unwrap();
        assert_eq!(t.blue_limit(), 450.5);
        assert_eq!(t.wave_list()[0], 450.5);
        assert_eq!(t.wave_list()[1], 451.0);
        assert!(matches!(t.zeropoint(), Zeropoint::Vega));

        let thin = bp.thin(1e-4).unwrap();
        assert!(thin.wave_list().len() < bp.wave_list().len());
        assert_eq!(thin.blue_limit(), 400.0);
        assert_eq!(thin.red_limit(), 700.0);
    }

    #[test]
    fn test_constant_zeropoint_is_flux() {
        let bp = triangle().with_zeropoint(Zeropoint::Flux(42.0));
        assert_eq!(bp.zeropoint_flux().unwrap(), 42.0);
        let scaled = &bp * 2.0;
        assert!(matches!(scaled.zeropoint(), Zeropoint::Ab));
        assert_relative_eq!(scaled.evaluate(450.0).unwrap(), 1.0, epsilon = 1e-15);
    }
}
