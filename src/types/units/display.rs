use std::fmt;
use uom::si::{
    angle::degree,
    area::square_meter,
    force::{kilogram_force, newton},
    length::meter,
    mass::kilogram,
    velocity::{knot, meter_per_second},
};

use crate::types::units::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayForce(pub Force);
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMass(pub Mass);
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayAngle(pub Angle);
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayLength(pub Length);
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayArea(pub Area);
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayVelocity(pub Velocity);

impl fmt::Display for DisplayForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let newtons = self.0.get::<newton>();
        let kgf = self.0.get::<kilogram_force>();
        write!(f, "{:.1} N ({:.1} kgf)", newtons, kgf)
    }
}

impl fmt::Display for DisplayMass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kg", self.0.get::<kilogram>())
    }
}

impl fmt::Display for DisplayAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0.get::<degree>())
    }
}

impl fmt::Display for DisplayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m", self.0.get::<meter>())
    }
}

impl fmt::Display for DisplayArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m²", self.0.get::<square_meter>())
    }
}

impl fmt::Display for DisplayVelocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let knots = self.0.get::<knot>();
        let mps = self.0.get::<meter_per_second>();
        write!(f, "{:.1} kn ({:.1} m/s)", knots, mps)
    }
}
