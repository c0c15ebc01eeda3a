pub mod overrides;
pub mod settings;

pub use overrides::*;
pub use settings::*;
