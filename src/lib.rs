pub mod types;
pub mod config;
pub mod sails;
pub mod physics;
pub mod capacity;
pub mod rigging;
pub mod registry;

pub use types::*;
