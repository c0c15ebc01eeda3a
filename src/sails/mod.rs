pub mod geometry;
pub mod sail;

pub use geometry::*;
pub use sail::*;
