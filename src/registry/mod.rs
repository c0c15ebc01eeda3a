pub mod names;
pub mod store;
pub mod records;
pub mod generation;

pub use names::*;
pub use store::*;
pub use records::*;
pub use generation::*;
