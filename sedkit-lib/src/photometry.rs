//! Flux, magnitudes and photon-weighted moments of an SED through a bandpass.

use log::trace;

use crate::angle::Angle;
use crate::bandpass::Bandpass;
use crate::config::{Atmosphere, QuadratureConfig, SeeingModel};
use crate::dcr::refraction;
use crate::error::{Result, SedError};
use crate::integ::adaptive_simpson;
use crate::interp::{merge_knots, trapz};
use crate::sed::Sed;

/// First and second moments of the refraction offset, in radians.
///
/// `rbar` is `(x, y)` in the tangent plane with `y` pointing to the zenith
/// when the parallactic angle is zero; `v` is the covariance (radians²).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcrMomentShifts {
    pub rbar: [f64; 2],
    pub v: [[f64; 2]; 2],
}

/// Photon-weighted integrand `sed(w) * bandpass(w)` on the shared domain.
struct Integrand<'a> {
    sed: &'a Sed,
    bandpass: Option<&'a Bandpass>,
    blue: f64,
    red: f64,
    // quadrature nodes and the weights at them; empty for adaptive quadrature
    nodes: Vec<f64>,
    weights: Vec<f64>,
    config: QuadratureConfig,
}

impl<'a> Integrand<'a> {
    fn new(sed: &'a Sed, bandpass: Option<&'a Bandpass>, config: QuadratureConfig) -> Result<Self> {
        let (blue, red, knots) = match bandpass {
            Some(bp) => {
                let blue = sed.blue_limit().max(bp.blue_limit());
                let red = sed.red_limit().min(bp.red_limit());
                if !(blue < red) {
                    return Err(SedError::incompatible(format!(
                        "bandpass [{}, {}] does not overlap SED domain [{}, {}]",
                        bp.blue_limit(),
                        bp.red_limit(),
                        sed.blue_limit(),
                        sed.red_limit()
                    )));
                }
                let knots: Vec<f64> = merge_knots(sed.wave_list(), bp.wave_list())
                    .into_iter()
                    .filter(|w| (blue..=red).contains(w))
                    .collect();
                (blue, red, knots)
            }
            None => (sed.blue_limit(), sed.red_limit(), sed.wave_list().to_vec()),
        };

        let analytic =
            sed.wave_list().is_empty() && bandpass.is_none_or(|bp| bp.wave_list().is_empty());
        let nodes = if analytic {
            if !(blue.is_finite() && red.is_finite()) {
                return Err(SedError::NonIntegrable(format!(
                    "analytic integrand over unbounded range [{blue}, {red}]"
                )));
            }
            Vec::new()
        } else {
            merge_knots(&[blue, red], &knots)
        };
        let weights = nodes
            .iter()
            .map(|&w| weight(sed, bandpass, w))
            .collect::<Result<Vec<f64>>>()?;
        trace!("integrand on [{blue}, {red}] with {} nodes", nodes.len());

        Ok(Integrand {
            sed,
            bandpass,
            blue,
            red,
            nodes,
            weights,
            config,
        })
    }

    /// `∫ sed * bandpass * g`
    fn moment<G>(&self, g: G) -> Result<f64>
    where
        G: Fn(f64) -> f64,
    {
        if self.nodes.is_empty() {
            return adaptive_simpson(
                |w| Ok(weight(self.sed, self.bandpass, w)? * g(w)),
                self.blue,
                self.red,
                &self.config,
            );
        }
        let values: Vec<f64> = self
            .nodes
            .iter()
            .zip(&self.weights)
            .map(|(&w, &p)| p * g(w))
            .collect();
        Ok(trapz(&self.nodes, &values))
    }

    fn flux(&self) -> Result<f64> {
        self.moment(|_| 1.0)
    }

    fn positive_flux(&self) -> Result<f64> {
        let flux = self.flux()?;
        if !(flux > 0.0) {
            return Err(SedError::NonPositiveFlux(flux));
        }
        Ok(flux)
    }
}

fn weight(sed: &Sed, bandpass: Option<&Bandpass>, wave: f64) -> Result<f64> {
    let photons = sed.evaluate(wave)?;
    match bandpass {
        Some(bp) => Ok(photons * bp.evaluate(wave)?),
        None => Ok(photons),
    }
}

impl Sed {
    /// Photon flux (photons/s/cm²) through `bandpass`, or over the whole
    /// SED domain when `bandpass` is `None`.
    pub fn calculate_flux(&self, bandpass: Option<&Bandpass>) -> Result<f64> {
        self.calculate_flux_with(bandpass, QuadratureConfig::default())
    }

    pub fn calculate_flux_with(
        &self,
        bandpass: Option<&Bandpass>,
        config: QuadratureConfig,
    ) -> Result<f64> {
        Integrand::new(self, bandpass, config)?.flux()
    }

    /// `-2.5 log10(flux / zeropoint_flux)`
    pub fn calculate_magnitude(&self, bandpass: &Bandpass) -> Result<f64> {
        let flux = self.calculate_flux(Some(bandpass))?;
        if !(flux > 0.0) {
            return Err(SedError::NonPositiveFlux(flux));
        }
        let zeropoint = bandpass.zeropoint_flux()?;
        Ok(-2.5 * (flux / zeropoint).log10())
    }

    /// Rescaled copy with magnitude `target` through `bandpass`.
    pub fn with_magnitude(&self, target: f64, bandpass: &Bandpass) -> Result<Sed> {
        let current = self.calculate_magnitude(bandpass)?;
        Ok(self * 10f64.powf(-0.4 * (target - current)))
    }

    /// Rescaled copy with photon flux `target` through `bandpass`.
    pub fn with_flux(&self, target: f64, bandpass: Option<&Bandpass>) -> Result<Sed> {
        let current = self.calculate_flux(bandpass)?;
        if current == 0.0 || !current.is_finite() {
            return Err(SedError::NonPositiveFlux(current));
        }
        Ok(self * (target / current))
    }

    /// DCR moments under the default [`Atmosphere`].
    pub fn calculate_dcr_moment_shifts(
        &self,
        bandpass: &Bandpass,
        zenith_angle: Angle,
        parallactic_angle: Angle,
    ) -> Result<DcrMomentShifts> {
        self.calculate_dcr_moment_shifts_with(
            bandpass,
            zenith_angle,
            parallactic_angle,
            &Atmosphere::default(),
        )
    }

    /// Photon-weighted mean and covariance of the refraction offset.
    ///
    /// The offset points from the horizon to the zenith, rotated by the
    /// parallactic angle.
    pub fn calculate_dcr_moment_shifts_with(
        &self,
        bandpass: &Bandpass,
        zenith_angle: Angle,
        parallactic_angle: Angle,
        atmosphere: &Atmosphere,
    ) -> Result<DcrMomentShifts> {
        let integrand = Integrand::new(self, Some(bandpass), QuadratureConfig::default())?;
        let flux = integrand.positive_flux()?;
        let r = |w: f64| refraction(w, zenith_angle, atmosphere);

        let mean = integrand.moment(r)? / flux;
        let var = integrand.moment(|w| (r(w) - mean).powi(2))? / flux;

        let (s, c) = parallactic_angle.sin_cos();
        Ok(DcrMomentShifts {
            rbar: [mean * s, mean * c],
            v: [[var * s * s, var * s * c], [var * s * c, var * c * c]],
        })
    }

    /// Seeing moment ratio under the default [`SeeingModel`].
    pub fn calculate_seeing_moment_shifts(&self, bandpass: &Bandpass) -> Result<f64> {
        self.calculate_seeing_moment_shifts_with(bandpass, &SeeingModel::default())
    }

    /// Photon-weighted mean of `(w / base_wavelength)^(2 alpha)`, the ratio of
    /// the PSF second moment to its value at the base wavelength.
    pub fn calculate_seeing_moment_shifts_with(
        &self,
        bandpass: &Bandpass,
        model: &SeeingModel,
    ) -> Result<f64> {
        let integrand = Integrand::new(self, Some(bandpass), QuadratureConfig::default())?;
        let flux = integrand.positive_flux()?;
        let ratio = integrand.moment(|w| (w / model.base_wavelength_nm).powf(2.0 * model.alpha))?;
        Ok(ratio / flux)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sed::FluxType;
    use crate::table::LookupTable;
    use approx::assert_relative_eq;

    fn flat_photons() -> Sed {
        Sed::constant(2.0, FluxType::Photons).unwrap()
    }

    fn box_bandpass() -> Bandpass {
        let t = LookupTable::new(vec![400.0, 500.0, 600.0], vec![1.0, 1.0, 1.0]).unwrap();
        Bandpass::from_table(t, Some(crate::bandpass::Zeropoint::Flux(100.0))).unwrap()
    }

    #[test]
    fn test_flux_flat() {
        let flux = flat_photons().calculate_flux(Some(&box_bandpass())).unwrap();
        assert_relative_eq!(flux, 400.0, max_relative = 1e-14);
        assert_relative_eq!(
            flat_photons().calculate_magnitude(&box_bandpass()).unwrap(),
            -2.5 * 4.0_f64.log10(),
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_unbounded_is_error() {
        assert!(matches!(
            flat_photons().calculate_flux(None),
            Err(SedError::NonIntegrable(_))
        ));
        let bounded = flat_photons().truncate(100.0, 200.0).unwrap();
        assert_relative_eq!(bounded.calculate_flux(None).unwrap(), 200.0, max_relative = 1e-10);
    }

    #[test]
    fn test_analytic_pair_uses_adaptive() {
        let sed = Sed::from_expression("wave", FluxType::Photons).unwrap();
        let bp = Bandpass::from_expression("wave / 100", 100.0, 200.0, None).unwrap();
        // ∫ w^2 / 100 dw on [100, 200]
        let expected = (200.0_f64.powi(3) - 100.0_f64.powi(3)) / 300.0;
        assert_relative_eq!(sed.calculate_flux(Some(&bp)).unwrap(), expected, max_relative = 1e-10);
    }

    #[test]
    fn test_non_overlap() {
        let far = Bandpass::from_fn(|_| 1.0, 10.0, 20.0, None).unwrap();
        let t = LookupTable::new(vec![400.0, 500.0], vec![1.0, 1.0]).unwrap();
        let sed = Sed::from_table(t, FluxType::Photons).unwrap();
        assert!(matches!(
            sed.calculate_flux(Some(&far)),
            Err(SedError::IncompatibleOperand(_))
        ));
    }

    #[test]
    fn test_seeing_flat_at_base() {
        let bp = Bandpass::from_fn(|_| 1.0, 499.0, 501.0, None).unwrap();
        let ratio = flat_photons().calculate_seeing_moment_shifts(&bp).unwrap();
        assert_relative_eq!(ratio, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_dcr_zero_at_zenith() {
        let shifts = flat_photons()
            .calculate_dcr_moment_shifts(&box_bandpass(), Angle::ZERO, Angle::ZERO)
            .unwrap();
        assert_eq!(shifts.rbar, [0.0, 0.0]);
        assert_eq!(shifts.v, [[0.0, 0.0], [0.0, 0.0]]);
    }
}
