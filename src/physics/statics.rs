use nalgebra as na;

use crate::config::SafetyFactors;
use crate::types::*;

/// Standard gravity, used to express loads as kilograms (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Component of a sail force acting along a halyard set at `angle`.
///
/// The sail force acts perpendicular to the mast; the halyard carries the
/// share that projects onto its own direction, `F * sin(angle)`.
pub fn halyard_component(force: Force, angle: Angle) -> Force {
    let sail_force = na::Vector2::new(force.get::<newton>(), 0.0);
    let theta = angle.get::<radian>();
    let halyard_direction = na::Vector2::new(theta.sin(), theta.cos());

    Force::new::<newton>(sail_force.dot(&halyard_direction))
}

/// Express a force as the mass it would hold up under standard gravity.
pub fn force_to_mass(force: Force) -> Mass {
    Mass::new::<kilogram>(force.get::<newton>() / STANDARD_GRAVITY)
}

/// Working load a halyard must carry for one sail force.
pub fn halyard_working_load(force: Force, angle: Angle, factors: &SafetyFactors) -> Mass {
    let resolved = halyard_component(force, angle);
    force_to_mass(resolved * factors.load_multiplier())
}
