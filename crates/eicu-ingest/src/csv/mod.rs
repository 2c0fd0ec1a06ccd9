//! CSV reading and writing utilities.

mod reader;
mod writer;

pub use reader::{read_csv_headers, read_csv_table, require_column};
pub use writer::write_csv_table;
