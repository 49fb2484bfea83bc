#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// A packed library of spectra and throughputs, deserialized from a
/// postcard + zstd blob written by `sedkit-generate`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SpectralLibrary {
    pub version: Vec<VersionRecord>,
    pub seds: Vec<SedRecord>,
    pub bandpasses: Vec<BandpassRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub tag: String,
    pub date: String,
    pub notes: String,
}

/// Knots of a tabulated function. Wavelengths are always stored in nanometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub x: Vec<f64>,
    pub f: Vec<f64>,
    /// One of "linear", "spline", "floor", "ceil", "nearest".
    pub interpolant: String,
    pub x_log: bool,
    pub f_log: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SedRecord {
    pub name: String,
    pub table: TableRecord,
    /// One of "fphotons", "flambda", "fnu".
    pub flux_type: String,
    pub redshift: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandpassRecord {
    pub name: String,
    pub table: TableRecord,
    /// "AB", "Vega", or a decimal zeropoint flux.
    pub zeropoint: String,
}
