pub mod load;
pub mod report;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

/// Two-column table with the house style
pub fn settings_table(header: [&str; 2]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(header[0]).fg(Color::Cyan),
            Cell::new(header[1]).fg(Color::Cyan),
        ]);
    table
}

/// Print the effective configuration
pub fn show_config(config: &Config) {
    let mut table = settings_table(["Setting", "Value"]);

    let db = &config.database;
    table.add_row(vec!["Database", db.path.as_str()]);
    table.add_row(vec!["Table", db.table.as_str()]);
    table.add_row(vec!["Create table", if db.create_table { "yes" } else { "no" }]);
    table.add_row(vec!["On conflict", db.on_conflict.name()]);
    table.add_row(vec!["Memory limit", db.memory_limit.as_deref().unwrap_or("DuckDB default")]);
    table.add_row(vec![
        "DuckDB threads".to_string(),
        db.threads
            .map_or_else(|| "DuckDB default".to_string(), |n| n.to_string()),
    ]);
    table.add_row(vec!["Batch size".to_string(), config.ingest.batch_size.to_string()]);
    table.add_row(vec!["Workers".to_string(), config.ingest.workers.to_string()]);
    table.add_row(vec![
        "Timings file".to_string(),
        config.output.timings.display().to_string(),
    ]);
    table.add_row(vec![
        "Report file".to_string(),
        config.output.report.display().to_string(),
    ]);

    eprintln!("\n{table}");
}
