use std::path::PathBuf;

/// View exported when none is configured
pub const DEFAULT_VIEW: &str = "completed_no_shipping_by_date";

/// Configuration for the report export.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// DuckDB database file holding the orders and the report view
    pub db_path: PathBuf,
    /// Destination CSV file (overwritten)
    pub output: PathBuf,
    /// View (or table) to export
    pub view: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("orders.duckdb"),
            output: PathBuf::from("results.csv"),
            view: DEFAULT_VIEW.to_string(),
        }
    }
}
