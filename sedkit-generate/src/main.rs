mod parsers;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use sedkit::Interpolant;
use sedkit_data::SpectralLibrary;

/// Pack two-column SED and bandpass tables into a compressed library.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory containing `seds/`, `bandpasses/` and an optional `Version.dat`
    #[arg(short, long, default_value = "data_sources")]
    input: PathBuf,

    /// Output path of the postcard + zstd blob
    #[arg(short, long, default_value = "sedkit-lib/data/library.bin.zst")]
    output: PathBuf,

    /// Interpolant stored with every table
    #[arg(long, default_value = "linear")]
    interpolant: Interpolant,

    /// zstd compression level
    #[arg(long, default_value_t = 19)]
    level: i32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.input.exists() {
        eprintln!("Error: input directory not found at {:?}", args.input);
        std::process::exit(1);
    }

    info!("Parsing tables from {:?}...", args.input);

    let version = parsers::parse_version(&args.input.join("Version.dat"));
    info!("  Version: {} entries", version.len());

    let seds: Vec<_> = parsers::table_files(&args.input.join("seds"))
        .iter()
        .map(|p| parsers::parse_sed(p, args.interpolant))
        .collect();
    info!("  SEDs: {}", seds.len());

    let bandpasses: Vec<_> = parsers::table_files(&args.input.join("bandpasses"))
        .iter()
        .map(|p| parsers::parse_bandpass(p, args.interpolant))
        .collect();
    info!("  Bandpasses: {}", bandpasses.len());

    let library = SpectralLibrary {
        version,
        seds,
        bandpasses,
    };

    info!("Serializing with postcard...");
    let serialized = postcard::to_allocvec(&library).expect("postcard serialization failed");
    info!("  Serialized size: {} bytes", serialized.len());

    info!("Compressing with zstd (level {})...", args.level);
    let compressed =
        zstd::encode_all(&serialized[..], args.level).expect("zstd compression failed");
    info!(
        "  Compressed size: {} bytes ({:.1}x)",
        compressed.len(),
        serialized.len() as f64 / compressed.len() as f64
    );

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent).expect("failed to create output directory");
    }
    let mut f = std::fs::File::create(&args.output).expect("failed to create output file");
    f.write_all(&compressed)
        .expect("failed to write compressed data");
    info!("Wrote {:?}", args.output);

    // Verify the blob loads through the library
    let lib = sedkit::Library::from_compressed(&compressed).expect("round-trip load failed");
    for name in lib.sed_names() {
        lib.sed(name).expect("SED failed to rebuild");
    }
    for name in lib.bandpass_names() {
        lib.bandpass(name).expect("bandpass failed to rebuild");
    }
    info!("Round-trip OK!");
}
