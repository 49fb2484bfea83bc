use std::path::{Path, PathBuf};

use sedkit::{Bandpass, FluxType, Interpolant, LookupTable, Sed, WaveUnit, Zeropoint};
use sedkit_data::{BandpassRecord, SedRecord, VersionRecord};

/// `# key: value` header lines of a table file.
#[derive(Debug, Default)]
pub struct Header {
    pub flux_type: Option<String>,
    pub wave_unit: Option<String>,
    pub zeropoint: Option<String>,
    pub redshift: Option<String>,
}

pub fn parse_header(content: &str) -> Header {
    let mut header = Header::default();
    for line in content.lines() {
        let Some(comment) = line.trim().strip_prefix('#') else {
            continue;
        };
        let Some((key, value)) = comment.split_once(':') else {
            continue;
        };
        let value = Some(value.trim().to_string());
        match key.trim().to_lowercase().as_str() {
            "flux_type" => header.flux_type = value,
            "wave_unit" | "wave_type" => header.wave_unit = value,
            "zeropoint" => header.zeropoint = value,
            "redshift" => header.redshift = value,
            _ => {}
        }
    }
    header
}

pub fn parse_version(path: &Path) -> Vec<VersionRecord> {
    let Ok(content) = std::fs::read_to_string(path) else {
        log::warn!("no version file at {:?}", path);
        return Vec::new();
    };
    let mut records = Vec::new();
    for line in content.lines() {
        if line.starts_with('#') || line.trim().len() < 3 {
            continue;
        }
        let parts: Vec<&str> = line.splitn(3, "//").collect();
        if parts.len() == 3 {
            records.push(VersionRecord {
                tag: parts[0].trim().to_string(),
                date: parts[1].trim().to_string(),
                notes: parts[2].trim().to_string(),
            });
        }
    }
    records
}

/// Table files in `dir`, sorted by name.
pub fn table_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        log::warn!("directory {:?} not found, skipping", dir);
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("sed" | "dat" | "txt")
            )
        })
        .collect();
    files.sort();
    files
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .expect("table file name is not valid UTF-8")
        .to_string()
}

fn read_table(path: &Path, content: &str, interpolant: Interpolant) -> LookupTable {
    LookupTable::parse_two_column(content, WaveUnit::Nanometers, interpolant)
        .unwrap_or_else(|e| panic!("{:?}: {e}", path))
}

fn wave_unit(header: &Header, path: &Path) -> WaveUnit {
    header
        .wave_unit
        .as_deref()
        .map(|u| u.parse().unwrap_or_else(|e| panic!("{:?}: {e}", path)))
        .unwrap_or_default()
}

pub fn parse_sed(path: &Path, interpolant: Interpolant) -> SedRecord {
    let content = std::fs::read_to_string(path).expect("failed to read SED file");
    let header = parse_header(&content);
    let flux_type: FluxType = header
        .flux_type
        .as_deref()
        .map(|f| f.parse().unwrap_or_else(|e| panic!("{:?}: {e}", path)))
        .unwrap_or_default();
    let unit = wave_unit(&header, path);
    let redshift: f64 = header
        .redshift
        .as_deref()
        .map(|z| z.parse().expect("invalid redshift"))
        .unwrap_or(0.0);

    let raw = read_table(path, &content, interpolant);
    let table = raw
        .converted(unit, flux_type.density_factor(unit))
        .unwrap_or_else(|e| panic!("{:?}: {e}", path));

    // reject anything the library would refuse to load
    Sed::from_table(table.clone(), flux_type)
        .and_then(|sed| sed.at_redshift(redshift))
        .unwrap_or_else(|e| panic!("{:?}: {e}", path));

    SedRecord {
        name: stem(path),
        table: table.to_record(),
        flux_type: flux_type.as_str().to_string(),
        redshift,
    }
}

pub fn parse_bandpass(path: &Path, interpolant: Interpolant) -> BandpassRecord {
    let content = std::fs::read_to_string(path).expect("failed to read bandpass file");
    let header = parse_header(&content);
    let unit = wave_unit(&header, path);
    let zeropoint = header.zeropoint.unwrap_or_else(|| "AB".to_string());
    let zp = Zeropoint::parse(&zeropoint).unwrap_or_else(|e| panic!("{:?}: {e}", path));

    let table = read_table(path, &content, interpolant)
        .converted(unit, 1.0)
        .unwrap_or_else(|e| panic!("{:?}: {e}", path));
    Bandpass::from_table(table.clone(), Some(zp)).unwrap_or_else(|e| panic!("{:?}: {e}", path));

    BandpassRecord {
        name: stem(path),
        table: table.to_record(),
        zeropoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let text = "# flux_type: fnu\n# wave_unit: A\n#zeropoint : Vega\n# comment\n4000 1.0\n";
        let h = parse_header(text);
        assert_eq!(h.flux_type.as_deref(), Some("fnu"));
        assert_eq!(h.wave_unit.as_deref(), Some("A"));
        assert_eq!(h.zeropoint.as_deref(), Some("Vega"));
        assert!(h.redshift.is_none());
    }
}
