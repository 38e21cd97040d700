//! SQL for the report export.

/// Column names written as the CSV header, in view column order
pub const REPORT_COLUMNS: [&str; 5] = [
    "Date",
    "OrderTotal",
    "OrderStatusName",
    "ShippingStatusName",
    "PaymentStatusName",
];

/// Select every row of `view` with all columns rendered as text.
///
/// Casting in SQL keeps DuckDB's own formatting for dates and decimals.
pub fn select_report(view: &str) -> String {
    format!("SELECT COLUMNS(*)::VARCHAR FROM {view}")
}

/// Check that `view` exists as a table or view.
pub fn relation_exists() -> &'static str {
    "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?"
}
