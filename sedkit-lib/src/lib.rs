//! Spectral energy distributions, bandpasses and synthetic photometry.
//!
//! [`Sed`] and [`Bandpass`] wrap tabulated, closed-form or user-supplied
//! functions of wavelength (nm). Arithmetic on them builds lazy combinator
//! trees, so compositions evaluate exactly at every wavelength. Photometric
//! integrals (flux, magnitude, DCR and seeing moments) run on the union of
//! the operands' knots, or adaptively when both are analytic.

pub mod angle;
pub mod bandpass;
pub mod config;
pub mod constants;
pub mod dcr;
pub mod error;
pub mod expr;
pub mod filters;
pub mod integ;
pub mod interp;
pub mod library;
pub mod photometry;
pub mod reference;
pub mod sed;
pub mod spectral;
pub mod spline;
pub mod table;
pub mod thin;

pub use angle::Angle;
pub use bandpass::{Bandpass, Zeropoint};
pub use config::{Atmosphere, QuadratureConfig, SeeingModel};
pub use error::{Result, SedError};
pub use expr::{Expression, validate_expression};
pub use library::Library;
pub use photometry::DcrMomentShifts;
pub use sed::{FluxType, Sed};
pub use spectral::{SpectralFn, SpectrumSpec};
pub use table::{Interpolant, LookupTable, WaveUnit};
pub use thin::thin_tabulated_values;
pub use sedkit_data;
