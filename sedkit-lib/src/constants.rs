/// Planck's constant (erg·s)
pub const PLANCK_H: f64 = 6.62607015e-27;

/// Speed of light (nm/s)
pub const SPEED_OF_LIGHT_NM: f64 = 2.99792458e17;

/// Planck's constant times speed of light (erg·nm)
pub const PLANCK_HC: f64 = PLANCK_H * SPEED_OF_LIGHT_NM;

/// Boltzmann constant (erg/K)
pub const BOLTZMANN_K: f64 = 1.380649e-16;

/// AB magnitude zero-point flux density (erg s⁻¹ cm⁻² Hz⁻¹), i.e. 3631 Jy
pub const AB_FLUX_DENSITY: f64 = 3631e-23;

/// Effective temperature of the Vega reference blackbody (K)
pub const VEGA_TEMPERATURE: f64 = 9550.0;

/// Wavelength at which the Vega reference is normalised (nm)
pub const VEGA_REFERENCE_WAVELENGTH: f64 = 555.6;

/// Vega monochromatic flux at the reference wavelength (erg s⁻¹ cm⁻² nm⁻¹)
pub const VEGA_REFERENCE_FLAMBDA: f64 = 3.44e-8;

/// Wavelength range covered by the Vega reference (nm)
pub const VEGA_BLUE_LIMIT: f64 = 90.0;
pub const VEGA_RED_LIMIT: f64 = 3000.0;

/// Angstroms per nanometer
pub const ANGSTROMS_PER_NM: f64 = 10.0;

/// Arcseconds per radian
pub const ARCSEC_PER_RADIAN: f64 = 180.0 / std::f64::consts::PI * 3600.0;
