//! Johnson UBV broadband throughputs.
//!
//! Transmission curves on a 10 nm grid, normalised to unit peak. All three
//! default to an AB zeropoint; use [`Bandpass::with_zeropoint`] for Vega
//! magnitudes.

use crate::bandpass::Bandpass;
use crate::error::Result;
use crate::table::LookupTable;

/// (wavelength_nm, transmission)
const U_DATA: [(f64, f64); 21] = [
    (250.0, 0.0),
    (260.0, 0.0),
    (270.0, 0.0),
    (280.0, 0.0),
    (290.0, 0.05),
    (300.0, 0.2),
    (310.0, 0.4),
    (320.0, 0.6),
    (330.0, 0.8),
    (340.0, 0.95),
    (350.0, 1.0),
    (360.0, 0.95),
    (370.0, 0.8),
    (380.0, 0.6),
    (390.0, 0.4),
    (400.0, 0.2),
    (410.0, 0.1),
    (420.0, 0.05),
    (430.0, 0.0),
    (440.0, 0.0),
    (450.0, 0.0),
];

const B_DATA: [(f64, f64); 23] = [
    (350.0, 0.0),
    (360.0, 0.05),
    (370.0, 0.1),
    (380.0, 0.2),
    (390.0, 0.35),
    (400.0, 0.55),
    (410.0, 0.7),
    (420.0, 0.85),
    (430.0, 0.95),
    (440.0, 1.0),
    (450.0, 1.0),
    (460.0, 0.95),
    (470.0, 0.85),
    (480.0, 0.7),
    (490.0, 0.55),
    (500.0, 0.4),
    (510.0, 0.3),
    (520.0, 0.2),
    (530.0, 0.1),
    (540.0, 0.05),
    (550.0, 0.0),
    (560.0, 0.0),
    (570.0, 0.0),
];

const V_DATA: [(f64, f64); 27] = [
    (450.0, 0.0),
    (460.0, 0.0),
    (470.0, 0.05),
    (480.0, 0.15),
    (490.0, 0.3),
    (500.0, 0.5),
    (510.0, 0.7),
    (520.0, 0.85),
    (530.0, 0.95),
    (540.0, 1.0),
    (550.0, 1.0),
    (560.0, 0.95),
    (570.0, 0.85),
    (580.0, 0.7),
    (590.0, 0.6),
    (600.0, 0.45),
    (610.0, 0.35),
    (620.0, 0.25),
    (630.0, 0.15),
    (640.0, 0.1),
    (650.0, 0.05),
    (660.0, 0.03),
    (670.0, 0.01),
    (680.0, 0.0),
    (690.0, 0.0),
    (700.0, 0.0),
    (710.0, 0.0),
];

fn from_data(data: &[(f64, f64)]) -> Result<Bandpass> {
    let (x, f): (Vec<f64>, Vec<f64>) = data.iter().copied().unzip();
    Bandpass::from_table(LookupTable::new(x, f)?, None)
}

pub fn johnson_u() -> Result<Bandpass> {
    from_data(&U_DATA)
}

pub fn johnson_b() -> Result<Bandpass> {
    from_data(&B_DATA)
}

pub fn johnson_v() -> Result<Bandpass> {
    from_data(&V_DATA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_wavelengths_ordered() {
        let u = johnson_u().unwrap().effective_wavelength().unwrap();
        let b = johnson_b().unwrap().effective_wavelength().unwrap();
        let v = johnson_v().unwrap().effective_wavelength().unwrap();
        assert!(u > 340.0 && u < 360.0, "U: {u}");
        assert!(b > 430.0 && b < 460.0, "B: {b}");
        assert!(v > 545.0 && v < 575.0, "V: {v}");
    }

    #[test]
    fn test_peak_transmission() {
        assert_eq!(johnson_v().unwrap().evaluate(550.0).unwrap(), 1.0);
        assert_eq!(johnson_b().unwrap().blue_limit(), 350.0);
        assert_eq!(johnson_u().unwrap().red_limit(), 450.0);
    }
}
