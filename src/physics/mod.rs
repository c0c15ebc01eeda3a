pub mod statics;
pub mod wind_loading;

pub use statics::*;
pub use wind_loading::*;
