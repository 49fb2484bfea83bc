use approx::{assert_abs_diff_eq, assert_relative_eq};
use sedkit::constants::ARCSEC_PER_RADIAN;
use sedkit::filters::johnson_v;
use sedkit::{Angle, Atmosphere, Bandpass, FluxType, LookupTable, SeeingModel, Sed};

/// Flat photon spectrum tabulated every 100 nm from 300 to 1100 nm.
fn flat_photons() -> Sed {
    let x: Vec<f64> = (0..=8).map(|i| 300.0 + 100.0 * i as f64).collect();
    let f = vec![1.0; x.len()];
    Sed::from_table(LookupTable::new(x, f).unwrap(), FluxType::Photons).unwrap()
}

fn sloped() -> Sed {
    Sed::from_expression("1e-12 * (wave / 500)**-3", FluxType::Flambda).unwrap()
}

#[test]
fn test_dcr_reference_values() {
    let v = johnson_v().unwrap();
    let shifts = flat_photons()
        .calculate_dcr_moment_shifts(&v, Angle::from_degrees(45.0), Angle::ZERO)
        .unwrap();
    let arcsec2 = ARCSEC_PER_RADIAN * ARCSEC_PER_RADIAN;
    assert_abs_diff_eq!(shifts.rbar[0], 0.0, epsilon = 1e-20);
    assert_relative_eq!(shifts.rbar[1] * ARCSEC_PER_RADIAN, 38.43267594465021, max_relative = 1e-9);
    assert_relative_eq!(shifts.v[1][1] * arcsec2, 0.010263340239952817, max_relative = 1e-9);
    assert_abs_diff_eq!(shifts.v[1][1] * arcsec2, 0.0103, epsilon = 1e-4);
    assert_abs_diff_eq!(shifts.v[0][0], 0.0, epsilon = 1e-30);
}

#[test]
fn test_seeing_reference_value() {
    let v = johnson_v().unwrap();
    let ratio = flat_photons().calculate_seeing_moment_shifts(&v).unwrap();
    assert_relative_eq!(ratio, 0.9622217007027808, max_relative = 1e-12);
}

#[test]
fn test_parallactic_rotation_180() {
    let v = johnson_v().unwrap();
    let sed = sloped();
    let zenith = Angle::from_degrees(35.0);
    for pa_deg in [0.0, 17.0, 60.0, 143.0] {
        let pa = Angle::from_degrees(pa_deg);
        let a = sed.calculate_dcr_moment_shifts(&v, zenith, pa).unwrap();
        let b = sed
            .calculate_dcr_moment_shifts(&v, zenith, pa + Angle::from_degrees(180.0))
            .unwrap();
        let scale = a.rbar[0].hypot(a.rbar[1]);
        let vscale = a.v[0][0] + a.v[1][1];
        for i in 0..2 {
            assert_abs_diff_eq!(b.rbar[i], -a.rbar[i], epsilon = 1e-12 * scale);
            for j in 0..2 {
                assert_abs_diff_eq!(b.v[i][j], a.v[i][j], epsilon = 1e-12 * vscale);
            }
        }
    }
}

#[test]
fn test_parallactic_rotation_90() {
    let v = johnson_v().unwrap();
    let sed = sloped();
    let zenith = Angle::from_degrees(50.0);
    let pa = Angle::from_degrees(20.0);
    let a = sed.calculate_dcr_moment_shifts(&v, zenith, pa).unwrap();
    let b = sed
        .calculate_dcr_moment_shifts(&v, zenith, pa + Angle::from_degrees(90.0))
        .unwrap();
    let scale = a.rbar[0].hypot(a.rbar[1]);
    let vscale = a.v[0][0] + a.v[1][1];
    assert_abs_diff_eq!(b.rbar[0], a.rbar[1], epsilon = 1e-12 * scale);
    assert_abs_diff_eq!(b.rbar[1], -a.rbar[0], epsilon = 1e-12 * scale);
    assert_abs_diff_eq!(b.v[1][1], a.v[0][0], epsilon = 1e-12 * vscale);
    assert_abs_diff_eq!(b.v[0][0], a.v[1][1], epsilon = 1e-12 * vscale);
    assert_abs_diff_eq!(b.v[0][1], -a.v[0][1], epsilon = 1e-12 * vscale);
}

#[test]
fn test_dcr_grows_with_zenith_angle() {
    let v = johnson_v().unwrap();
    let sed = sloped();
    let lo = sed
        .calculate_dcr_moment_shifts(&v, Angle::from_degrees(20.0), Angle::ZERO)
        .unwrap();
    let hi = sed
        .calculate_dcr_moment_shifts(&v, Angle::from_degrees(60.0), Angle::ZERO)
        .unwrap();
    assert!(hi.rbar[1] > lo.rbar[1]);
    assert!(hi.v[1][1] > lo.v[1][1]);
    // variance scales with tan^2 z
    let t = Angle::from_degrees(60.0).tan() / Angle::from_degrees(20.0).tan();
    assert_relative_eq!(hi.v[1][1] / lo.v[1][1], t * t, max_relative = 1e-9);
}

#[test]
fn test_custom_atmosphere() {
    let v = johnson_v().unwrap();
    let sed = flat_photons();
    let zenith = Angle::from_degrees(45.0);
    let thin_air = Atmosphere {
        pressure_kpa: 50.0,
        ..Atmosphere::default()
    };
    let default = sed.calculate_dcr_moment_shifts(&v, zenith, Angle::ZERO).unwrap();
    let high = sed
        .calculate_dcr_moment_shifts_with(&v, zenith, Angle::ZERO, &thin_air)
        .unwrap();
    assert!(high.rbar[1] < default.rbar[1]);
}

#[test]
fn test_seeing_bluer_is_broader() {
    // alpha < 0: the PSF is larger in the blue, so a blue SED has a larger ratio
    let v = johnson_v().unwrap();
    let blue = sloped();
    let red = Sed::from_expression("1e-12 * (wave / 500)**3", FluxType::Flambda).unwrap();
    let rb = blue.calculate_seeing_moment_shifts(&v).unwrap();
    let rr = red.calculate_seeing_moment_shifts(&v).unwrap();
    assert!(rb > rr);

    let achromatic = SeeingModel {
        alpha: 0.0,
        ..SeeingModel::default()
    };
    assert_relative_eq!(
        blue.calculate_seeing_moment_shifts_with(&v, &achromatic).unwrap(),
        1.0,
        max_relative = 1e-14
    );
}

#[test]
fn test_analytic_pair_moments() {
    let bp = Bandpass::from_expression("1", 500.0, 600.0, None).unwrap();
    let sed = Sed::from_expression("1", FluxType::Photons).unwrap();
    let ratio = sed.calculate_seeing_moment_shifts(&bp).unwrap();
    // closed form of the mean of (w/500)^-0.4 over [500, 600]
    let expected = 500.0 / 0.6 * ((600.0_f64 / 500.0).powf(0.6) - 1.0) / 100.0;
    assert_relative_eq!(ratio, expected, max_relative = 1e-9);
}
