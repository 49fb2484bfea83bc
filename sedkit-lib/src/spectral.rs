//! Representation shared by [`Sed`] and [`Bandpass`](crate::Bandpass).
//!
//! A spectral function is a tree: leaves are tables, parsed expressions,
//! user callables and constants; interior nodes combine two operands with an
//! arithmetic operator and are evaluated lazily at call time, so no
//! composition is ever re-tabulated.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::expr::Expression;
use crate::sed::Sed;
use crate::table::LookupTable;

/// A user-supplied function of wavelength (nm).
#[derive(Clone)]
pub struct SpectralFn(Arc<dyn Fn(f64) -> f64 + Send + Sync>);

impl SpectralFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        SpectralFn(Arc::new(f))
    }

    pub fn call(&self, wave: f64) -> f64 {
        (self.0)(wave)
    }
}

impl fmt::Debug for SpectralFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpectralFn(..)")
    }
}

/// Constructor input for spectra and throughputs, resolved once at
/// construction.
#[derive(Debug, Clone)]
pub enum SpectrumSpec {
    Table(LookupTable),
    /// Closed-form expression in the variable `wave`, validated on construction.
    Expression(String),
    Callable(SpectralFn),
}

impl From<LookupTable> for SpectrumSpec {
    fn from(table: LookupTable) -> Self {
        SpectrumSpec::Table(table)
    }
}

impl From<&str> for SpectrumSpec {
    fn from(expr: &str) -> Self {
        SpectrumSpec::Expression(expr.to_string())
    }
}

impl From<SpectralFn> for SpectrumSpec {
    fn from(f: SpectralFn) -> Self {
        SpectrumSpec::Callable(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => a / b,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Spectral {
    Table(Arc<LookupTable>),
    Expr(Arc<Expression>),
    Callable(SpectralFn),
    Constant(f64),
    /// Rest-frame photon density of another SED, including its scale.
    Rest(Arc<Sed>),
    /// `inner(wave * factor)`
    Stretched { inner: Arc<Spectral>, factor: f64 },
    Combined {
        op: Op,
        lhs: Arc<Spectral>,
        rhs: Arc<Spectral>,
    },
}

impl Spectral {
    pub(crate) fn eval(&self, wave: f64) -> Result<f64> {
        match self {
            Spectral::Table(table) => table.evaluate(wave),
            Spectral::Expr(expr) => Ok(expr.eval(wave)),
            Spectral::Callable(f) => Ok(f.call(wave)),
            Spectral::Constant(v) => Ok(*v),
            Spectral::Rest(sed) => sed.rest_photons(wave),
            Spectral::Stretched { inner, factor } => inner.eval(wave * factor),
            Spectral::Combined { op, lhs, rhs } => Ok(op.apply(lhs.eval(wave)?, rhs.eval(wave)?)),
        }
    }

    pub(crate) fn combine(op: Op, lhs: Spectral, rhs: Spectral) -> Spectral {
        Spectral::Combined {
            op,
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
        }
    }

    /// `self(wave * factor)`; the identity when `factor == 1`.
    pub(crate) fn stretched(self, factor: f64) -> Spectral {
        if factor == 1.0 {
            return self;
        }
        Spectral::Stretched {
            inner: Arc::new(self),
            factor,
        }
    }

    pub(crate) fn scaled(self, k: f64) -> Spectral {
        if k == 1.0 {
            return self;
        }
        Spectral::combine(Op::Mul, self, Spectral::Constant(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_is_lazy_and_exact() {
        let a = LookupTable::new(vec![1.0, 2.0, 3.0], vec![1.0, 4.0, 9.0]).unwrap();
        let f = SpectralFn::new(|w| w * w);
        let node = Spectral::combine(
            Op::Sub,
            Spectral::Table(Arc::new(a.clone())),
            Spectral::Callable(f.clone()),
        );
        for w in [1.0, 1.5, 2.25, 3.0] {
            let expected = a.evaluate(w).unwrap() - f.call(w);
            assert_eq!(node.eval(w).unwrap(), expected);
        }
        assert!(node.eval(3.5).is_err());
    }

    #[test]
    fn test_stretched_and_scaled() {
        let node = Spectral::Callable(SpectralFn::new(|w| w + 1.0))
            .stretched(2.0)
            .scaled(3.0);
        assert_eq!(node.eval(4.0).unwrap(), 27.0);
        assert!(matches!(
            Spectral::Constant(1.0).stretched(1.0),
            Spectral::Constant(_)
        ));
    }
}
