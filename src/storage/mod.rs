mod csv_file;

pub use csv_file::*;

/// Where expenses live when no path is configured.
pub const DEFAULT_DATA_FILE: &str = "data/expenses.csv";
