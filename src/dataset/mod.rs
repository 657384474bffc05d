//! Reading the books CSV into an immutable [`Table`]

mod columns;
mod loader;
mod table;

pub use columns::{ColumnIndices, ColumnMapping};
pub use loader::{load, load_from_reader};
pub use table::Table;
