mod display;
mod explicit_unit_values;

pub use uom::si::f64::{Angle, Area, Force, Length, Mass, MassDensity, Velocity};

pub use uom::si::{
    angle::{degree, radian},
    area::{square_centimeter, square_foot, square_meter, square_millimeter},
    force::{kilogram_force, kilonewton, newton, pound_force},
    length::{centimeter, foot, inch, meter, millimeter, yard},
    mass::{gram, kilogram, megagram as metric_ton, pound, ton_long, ton_short},
    mass_density::kilogram_per_cubic_meter,
    velocity::{kilometer_per_hour, knot, meter_per_second, mile_per_hour},
};

pub use display::{DisplayAngle, DisplayArea, DisplayForce, DisplayLength, DisplayMass, DisplayVelocity};
pub use explicit_unit_values::{LengthValue, MassValue, UnitError, VelocityValue, WithUnit};
