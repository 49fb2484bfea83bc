use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sedkit::{Angle, FluxType, LookupTable, Sed, filters};

fn tabulated_sed() -> Sed {
    let x: Vec<f64> = (0..2000).map(|i| 300.0 + i as f64 * 0.4).collect();
    let f: Vec<f64> = x
        .iter()
        .map(|&w| 1.0 + 0.3 * (w / 23.0).sin())
        .collect();
    Sed::from_table(LookupTable::new(x, f).unwrap(), FluxType::Flambda).unwrap()
}

fn bench_flux(c: &mut Criterion) {
    let sed = tabulated_sed();
    let v = filters::johnson_v().unwrap();

    c.bench_function("calculate_flux_tabulated_v", |b| {
        b.iter(|| black_box(sed.calculate_flux(black_box(Some(&v))).unwrap()));
    });

    let sum = (&sed + &sed.at_redshift(0.0).unwrap()).unwrap();
    c.bench_function("calculate_flux_combined_v", |b| {
        b.iter(|| black_box(sum.calculate_flux(black_box(Some(&v))).unwrap()));
    });
}

fn bench_moments(c: &mut Criterion) {
    let sed = tabulated_sed().at_redshift(0.3).unwrap();
    let v = filters::johnson_v().unwrap();

    c.bench_function("dcr_moment_shifts", |b| {
        b.iter(|| {
            black_box(
                sed.calculate_dcr_moment_shifts(
                    &v,
                    black_box(Angle::from_degrees(45.0)),
                    Angle::ZERO,
                )
                .unwrap(),
            )
        });
    });

    c.bench_function("thin_1e-4", |b| {
        b.iter(|| black_box(sed.thin(black_box(1e-4)).unwrap()));
    });
}

criterion_group!(benches, bench_flux, bench_moments);
criterion_main!(benches);
