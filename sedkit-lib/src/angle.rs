use std::fmt;
use std::ops::{Add, Neg, Sub};

use crate::constants::ARCSEC_PER_RADIAN;

/// A plane angle, stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn from_radians(rad: f64) -> Self {
        Angle(rad)
    }

    pub fn from_degrees(deg: f64) -> Self {
        Angle(deg.to_radians())
    }

    pub fn from_arcsec(arcsec: f64) -> Self {
        Angle(arcsec / ARCSEC_PER_RADIAN)
    }

    pub fn radians(&self) -> f64 {
        self.0
    }

    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    pub fn arcsec(&self) -> f64 {
        self.0 * ARCSEC_PER_RADIAN
    }

    pub fn sin_cos(&self) -> (f64, f64) {
        self.0.sin_cos()
    }

    pub fn tan(&self) -> f64 {
        self.0.tan()
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} deg", self.degrees())
    }
}
