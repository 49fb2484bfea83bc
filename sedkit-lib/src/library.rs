//! Packed libraries of named spectra and throughputs.
//!
//! A library is a postcard-encoded [`SpectralLibrary`] compressed with zstd,
//! as written by `sedkit-generate`.

use std::collections::HashMap;
use std::io::Read;

use log::debug;
use sedkit_data::{SpectralLibrary, VersionRecord};

use crate::bandpass::{Bandpass, Zeropoint};
use crate::error::{Result, SedError};
use crate::sed::{FluxType, Sed};
use crate::table::LookupTable;

pub struct Library {
    data: SpectralLibrary,
    sed_index: HashMap<String, usize>,
    bandpass_index: HashMap<String, usize>,
}

impl Library {
    /// Decode a zstd-compressed library blob.
    pub fn from_compressed(compressed: &[u8]) -> Result<Self> {
        let mut decoder = ruzstd::decoding::StreamingDecoder::new(compressed)
            .map_err(|e| SedError::Data(format!("failed to create zstd decoder: {e:?}")))?;
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| SedError::Data(format!("failed to decompress library: {e}")))?;
        Self::from_bytes(&decompressed)
    }

    /// Decode an uncompressed postcard payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let data: SpectralLibrary = postcard::from_bytes(bytes)
            .map_err(|e| SedError::Data(format!("failed to deserialize library: {e}")))?;
        Ok(Self::from_data(data))
    }

    pub fn from_data(data: SpectralLibrary) -> Self {
        let sed_index = data
            .seds
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.to_lowercase(), i))
            .collect();
        let bandpass_index = data
            .bandpasses
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.to_lowercase(), i))
            .collect();
        debug!(
            "loaded library with {} SEDs and {} bandpasses",
            data.seds.len(),
            data.bandpasses.len()
        );
        Library {
            data,
            sed_index,
            bandpass_index,
        }
    }

    /// Access the raw records.
    pub fn raw(&self) -> &SpectralLibrary {
        &self.data
    }

    pub fn version(&self) -> Option<&VersionRecord> {
        self.data.version.last()
    }

    /// Build the named SED (case-insensitive), at its stored redshift.
    pub fn sed(&self, name: &str) -> Result<Sed> {
        let idx = self
            .sed_index
            .get(&name.to_lowercase())
            .ok_or_else(|| SedError::Data(format!("no SED named '{name}'")))?;
        let record = &self.data.seds[*idx];
        let flux_type: FluxType = record.flux_type.parse()?;
        let sed = Sed::from_table(LookupTable::from_record(&record.table)?, flux_type)?;
        if record.redshift != 0.0 {
            sed.at_redshift(record.redshift)
        } else {
            Ok(sed)
        }
    }

    /// Build the named bandpass (case-insensitive).
    pub fn bandpass(&self, name: &str) -> Result<Bandpass> {
        let idx = self
            .bandpass_index
            .get(&name.to_lowercase())
            .ok_or_else(|| SedError::Data(format!("no bandpass named '{name}'")))?;
        let record = &self.data.bandpasses[*idx];
        let zeropoint = Zeropoint::parse(&record.zeropoint)?;
        Bandpass::from_table(LookupTable::from_record(&record.table)?, Some(zeropoint))
    }

    pub fn sed_names(&self) -> Vec<&str> {
        self.data.seds.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn bandpass_names(&self) -> Vec<&str> {
        self.data.bandpasses.iter().map(|r| r.name.as_str()).collect()
    }
}
