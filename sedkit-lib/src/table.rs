//! Tabulated 1-D functions (`LookupTable`).

use std::fmt;
use std::str::FromStr;

use sedkit_data::TableRecord;

use crate::constants::ANGSTROMS_PER_NM;
use crate::error::{Result, SedError};
use crate::interp::{interp_one, merge_knots, trapz, upper_bracket};
use crate::spline;

/// Interpolation scheme between knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolant {
    #[default]
    Linear,
    Spline,
    Floor,
    Ceil,
    Nearest,
}

impl Interpolant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Spline => "spline",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Nearest => "nearest",
        }
    }
}

impl FromStr for Interpolant {
    type Err = SedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "spline" => Ok(Self::Spline),
            "floor" => Ok(Self::Floor),
            "ceil" => Ok(Self::Ceil),
            "nearest" => Ok(Self::Nearest),
            _ => Err(SedError::construction(format!("unknown interpolant: {s}"))),
        }
    }
}

impl fmt::Display for Interpolant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wavelength unit of tabulated or analytic input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveUnit {
    #[default]
    Nanometers,
    Angstroms,
}

impl WaveUnit {
    /// Convert a wavelength in this unit to nanometers.
    pub fn to_nm(&self, wave: f64) -> f64 {
        match self {
            Self::Nanometers => wave,
            Self::Angstroms => wave / ANGSTROMS_PER_NM,
        }
    }

    /// Convert a wavelength in nanometers to this unit.
    pub fn from_nm(&self, wave_nm: f64) -> f64 {
        match self {
            Self::Nanometers => wave_nm,
            Self::Angstroms => wave_nm * ANGSTROMS_PER_NM,
        }
    }
}

impl FromStr for WaveUnit {
    type Err = SedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nm" | "nanometer" | "nanometers" => Ok(Self::Nanometers),
            "a" | "ang" | "angstrom" | "angstroms" => Ok(Self::Angstroms),
            _ => Err(SedError::construction(format!("unknown wavelength unit: {s}"))),
        }
    }
}

/// Immutable piecewise-interpolated function over an ordered knot set.
///
/// Evaluation outside `[x_min, x_max]` fails with [`SedError::Domain`].
/// With `x_log` and/or `f_log` the interpolation runs in log space, which
/// requires strictly positive abscissae and/or values.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    x: Vec<f64>,
    f: Vec<f64>,
    interpolant: Interpolant,
    x_log: bool,
    f_log: bool,
    // knots in the interpolation space (log-transformed where requested)
    xs: Vec<f64>,
    fs: Vec<f64>,
    y2: Vec<f64>,
}

impl LookupTable {
    /// Linear table with no log transforms.
    pub fn new(x: Vec<f64>, f: Vec<f64>) -> Result<Self> {
        Self::with_options(x, f, Interpolant::Linear, false, false)
    }

    pub fn with_interpolant(x: Vec<f64>, f: Vec<f64>, interpolant: Interpolant) -> Result<Self> {
        Self::with_options(x, f, interpolant, false, false)
    }

    pub fn with_options(
        x: Vec<f64>,
        f: Vec<f64>,
        interpolant: Interpolant,
        x_log: bool,
        f_log: bool,
    ) -> Result<Self> {
        if x.len() != f.len() {
            return Err(SedError::construction(format!(
                "table length mismatch: {} x values, {} f values",
                x.len(),
                f.len()
            )));
        }
        if x.len() < 2 {
            return Err(SedError::construction(
                "table needs at least two knots".to_string(),
            ));
        }
        if x.iter().chain(f.iter()).any(|v| !v.is_finite()) {
            return Err(SedError::construction(
                "table contains non-finite values".to_string(),
            ));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SedError::construction(
                "table x values must be strictly increasing".to_string(),
            ));
        }
        if x_log && x[0] <= 0.0 {
            return Err(SedError::construction(
                "x_log requires positive x values".to_string(),
            ));
        }
        if f_log && f.iter().any(|&v| v <= 0.0) {
            return Err(SedError::construction(
                "f_log requires positive f values".to_string(),
            ));
        }

        let xs: Vec<f64> = if x_log {
            x.iter().map(|v| v.ln()).collect()
        } else {
            x.clone()
        };
        let fs: Vec<f64> = if f_log {
            f.iter().map(|v| v.ln()).collect()
        } else {
            f.clone()
        };
        let y2 = if interpolant == Interpolant::Spline {
            spline::second_derivatives(&xs, &fs)
        } else {
            Vec::new()
        };

        Ok(Self {
            x,
            f,
            interpolant,
            x_log,
            f_log,
            xs,
            fs,
            y2,
        })
    }

    /// Parse a two-column whitespace-separated table.
    ///
    /// Lines starting with `#` and blank lines are skipped. Wavelengths are
    /// converted from `unit` to nanometers.
    pub fn parse_two_column(text: &str, unit: WaveUnit, interpolant: Interpolant) -> Result<Self> {
        let mut x = Vec::new();
        let mut f = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split_whitespace();
            let (Some(a), Some(b)) = (cols.next(), cols.next()) else {
                return Err(SedError::construction(format!(
                    "line {}: expected two columns",
                    lineno + 1
                )));
            };
            let parse = |s: &str| {
                s.parse::<f64>().map_err(|_| {
                    SedError::construction(format!("line {}: invalid number '{s}'", lineno + 1))
                })
            };
            x.push(unit.to_nm(parse(a)?));
            f.push(parse(b)?);
        }
        Self::with_interpolant(x, f, interpolant)
    }

    pub fn from_record(record: &TableRecord) -> Result<Self> {
        let interpolant = record.interpolant.parse()?;
        Self::with_options(
            record.x.clone(),
            record.f.clone(),
            interpolant,
            record.x_log,
            record.f_log,
        )
    }

    pub fn to_record(&self) -> TableRecord {
        TableRecord {
            x: self.x.clone(),
            f: self.f.clone(),
            interpolant: self.interpolant.as_str().to_string(),
            x_log: self.x_log,
            f_log: self.f_log,
        }
    }

    /// Copy with abscissae converted from `unit` to nanometers and values
    /// multiplied by `f_scale`; interpolant and log flags are kept.
    pub fn converted(&self, unit: WaveUnit, f_scale: f64) -> Result<Self> {
        if unit == WaveUnit::Nanometers && f_scale == 1.0 {
            return Ok(self.clone());
        }
        Self::with_options(
            self.x.iter().map(|&v| unit.to_nm(v)).collect(),
            self.f.iter().map(|&v| v * f_scale).collect(),
            self.interpolant,
            self.x_log,
            self.f_log,
        )
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn f(&self) -> &[f64] {
        &self.f
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn interpolant(&self) -> Interpolant {
        self.interpolant
    }

    /// Interpolated value at `x`.
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        if !(x >= self.x_min() && x <= self.x_max()) {
            return Err(SedError::Domain {
                x,
                min: self.x_min(),
                max: self.x_max(),
            });
        }

        // knots are returned untouched, independent of the log transforms
        let hi = upper_bracket(x, &self.x);
        if self.x[hi] == x {
            return Ok(self.f[hi]);
        }
        if self.x[hi - 1] == x {
            return Ok(self.f[hi - 1]);
        }

        let xx = if self.x_log { x.ln() } else { x };
        let value = match self.interpolant {
            Interpolant::Linear => interp_one(xx, &self.xs, &self.fs),
            Interpolant::Spline => spline::eval(&self.xs, &self.fs, &self.y2, xx),
            Interpolant::Floor => self.fs[hi - 1],
            Interpolant::Ceil => self.fs[hi],
            Interpolant::Nearest => {
                if x - self.x[hi - 1] < self.x[hi] - x {
                    self.fs[hi - 1]
                } else {
                    self.fs[hi]
                }
            }
        };

        Ok(if self.f_log { value.exp() } else { value })
    }

    pub fn evaluate_many(&self, x: &[f64]) -> Result<Vec<f64>> {
        x.iter().map(|&xi| self.evaluate(xi)).collect()
    }

    /// Sorted union of this table's knots with `other`'s.
    pub fn merge_knots(&self, other: &LookupTable) -> Vec<f64> {
        merge_knots(&self.x, &other.x)
    }

    /// Trapezoidal integral over the knots.
    ///
    /// Exact for linear tables without log transforms.
    pub fn integrate(&self) -> f64 {
        trapz(&self.x, &self.f)
    }
}
