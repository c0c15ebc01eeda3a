pub mod termination;
pub mod rope;
pub mod halyards;
pub mod sheets;

pub use termination::*;
pub use rope::*;
pub use halyards::*;
pub use sheets::*;
