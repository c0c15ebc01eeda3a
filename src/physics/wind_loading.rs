use crate::types::*;

/// Knots to meters per second, as used by the sail load heuristics
pub const KNOTS_TO_METERS_PER_SECOND: f64 = 0.514444;

/// Lift force on a sail.
///
/// Uses the lift equation: F = 0.5 * ρ * A * Cl * v²
/// Where:
/// - ρ = air density (1.225 kg/m³ at sea level)
/// - A = projected sail area
/// - Cl = lift coefficient (1.0 for a generic sail)
/// - v = apparent wind speed
pub fn aerodynamic_force(
    sail_area: Area,
    wind_speed: Velocity,
    lift_coefficient: f64,
    air_density: MassDensity,
) -> Force {
    let area_m2 = sail_area.get::<square_meter>();
    let v = wind_speed.get::<knot>() * KNOTS_TO_METERS_PER_SECOND;
    let rho = air_density.get::<kilogram_per_cubic_meter>();

    Force::new::<newton>(0.5 * rho * area_m2 * lift_coefficient * v.powi(2))
}

pub mod wind_speeds {
    //! Beaufort scale lower bounds, in knots

    use crate::types::*;

    pub fn calm() -> Velocity {
        Velocity::new::<knot>(0.0)
    }

    pub fn gentle_breeze() -> Velocity {
        Velocity::new::<knot>(7.0)
    }

    pub fn moderate_breeze() -> Velocity {
        Velocity::new::<knot>(11.0)
    }

    pub fn fresh_breeze() -> Velocity {
        Velocity::new::<knot>(17.0)
    }

    pub fn strong_breeze() -> Velocity {
        Velocity::new::<knot>(22.0)
    }

    pub fn near_gale() -> Velocity {
        Velocity::new::<knot>(28.0)
    }

    pub fn gale() -> Velocity {
        Velocity::new::<knot>(34.0)
    }

    pub fn storm() -> Velocity {
        Velocity::new::<knot>(48.0)
    }
}
