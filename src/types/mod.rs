pub mod conversion;
pub mod units;

pub use conversion::*;
pub use units::*;

// Type aliases for domain clarity (zero cost)
pub type RopeLength = Length;
pub type WorkingLoad = Mass;
pub type SailArea = Area;
pub type WindSpeed = Velocity;
pub type HalyardAngle = Angle;

/// Rope diameters are catalogued in whole millimeters.
pub type DiameterMm = u32;

// Re-export nalgebra
pub use nalgebra as na;

