use approx::assert_relative_eq;
use sedkit::sedkit_data::{BandpassRecord, SedRecord, SpectralLibrary, TableRecord, VersionRecord};
use sedkit::{FluxType, Library, LookupTable, SedError, Zeropoint};

fn record(x: Vec<f64>, f: Vec<f64>) -> TableRecord {
    LookupTable::new(x, f).unwrap().to_record()
}

fn fixture() -> SpectralLibrary {
    SpectralLibrary {
        version: vec![VersionRecord {
            tag: "test-1".to_string(),
            date: "2026-01-01".to_string(),
            notes: "fixture".to_string(),
        }],
        seds: vec![
            SedRecord {
                name: "Flat".to_string(),
                table: record(vec![300.0, 700.0, 1100.0], vec![1e-12, 1e-12, 1e-12]),
                flux_type: "flambda".to_string(),
                redshift: 0.0,
            },
            SedRecord {
                name: "Shifted".to_string(),
                table: record(vec![300.0, 1100.0], vec![5.0, 5.0]),
                flux_type: "fphotons".to_string(),
                redshift: 0.5,
            },
        ],
        bandpasses: vec![
            BandpassRecord {
                name: "box".to_string(),
                table: record(vec![500.0, 600.0], vec![1.0, 1.0]),
                zeropoint: "AB".to_string(),
            },
            BandpassRecord {
                name: "box_vega".to_string(),
                table: record(vec![500.0, 600.0], vec![1.0, 1.0]),
                zeropoint: "vega".to_string(),
            },
        ],
    }
}

fn compressed(lib: &SpectralLibrary) -> Vec<u8> {
    let bytes = postcard::to_allocvec(lib).unwrap();
    zstd::encode_all(&bytes[..], 19).unwrap()
}

#[test]
fn test_load_compressed_library() {
    let lib = Library::from_compressed(&compressed(&fixture())).unwrap();
    assert_eq!(lib.sed_names(), vec!["Flat", "Shifted"]);
    assert_eq!(lib.bandpass_names(), vec!["box", "box_vega"]);
    assert_eq!(lib.version().unwrap().tag, "test-1");

    let flat = lib.sed("flat").unwrap();
    assert_eq!(flat.flux_type(), FluxType::Flambda);
    assert_eq!(flat.blue_limit(), 300.0);

    let shifted = lib.sed("SHIFTED").unwrap();
    assert_eq!(shifted.redshift(), 0.5);
    assert_relative_eq!(shifted.blue_limit(), 450.0, max_relative = 1e-15);
    assert_eq!(shifted.evaluate(1000.0).unwrap(), 5.0);

    let bp = lib.bandpass("Box").unwrap();
    assert!(matches!(bp.zeropoint(), Zeropoint::Ab));
    assert!(matches!(lib.bandpass("box_vega").unwrap().zeropoint(), Zeropoint::Vega));
    assert_relative_eq!(
        shifted.calculate_flux(Some(&bp)).unwrap(),
        500.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_uncompressed_payload() {
    let bytes = postcard::to_allocvec(&fixture()).unwrap();
    let lib = Library::from_bytes(&bytes).unwrap();
    assert_eq!(lib.raw().seds.len(), 2);
}

#[test]
fn test_missing_entries() {
    let lib = Library::from_compressed(&compressed(&fixture())).unwrap();
    assert!(matches!(lib.sed("nope"), Err(SedError::Data(_))));
    assert!(matches!(lib.bandpass("nope"), Err(SedError::Data(_))));
}

#[test]
fn test_corrupt_data() {
    assert!(matches!(
        Library::from_compressed(b"definitely not zstd"),
        Err(SedError::Data(_))
    ));
    let mut bad = fixture();
    bad.seds[0].flux_type = "photons".to_string();
    let lib = Library::from_compressed(&compressed(&bad)).unwrap();
    assert!(matches!(lib.sed("Flat"), Err(SedError::Construction(_))));
}
