pub mod strength_table;
pub mod table_loader;

pub use strength_table::*;
pub use table_loader::*;
