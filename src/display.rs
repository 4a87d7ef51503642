//! Output formatting and display utilities.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, ContentArrangement, Table, TableComponent};
use serde::Serialize;

use crate::backend::BackendSpec;
use crate::config::Config;
use crate::connection::ConnectionRecord;
use crate::netstat::NetstatRow;

/// Placeholder for absent values.
const NONE: &str = "---";

/// Creates a table with clean styling: solid borders, no row separators.
fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    // Use solid vertical bars instead of dotted
    table.set_style(TableComponent::VerticalLines, '│');
    // Use single-line header separator instead of double
    table.set_style(TableComponent::MiddleHeaderIntersections, '┼');
    table.set_style(TableComponent::HeaderLines, '─');
    table.set_style(TableComponent::LeftHeaderIntersection, '├');
    table.set_style(TableComponent::RightHeaderIntersection, '┤');
    table
}

fn state_cell(state: Option<&str>) -> Cell {
    match state {
        Some("LISTEN") => Cell::new("LISTEN").fg(Color::Green),
        Some(other) => Cell::new(other),
        None => Cell::new(NONE).fg(Color::DarkGrey),
    }
}

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("Failed to serialize to JSON")
}

/// A connection record with its derived predicates, for JSON output.
#[derive(Debug, Serialize)]
pub struct ConnectionInfo<'a> {
    #[serde(flatten)]
    pub record: &'a ConnectionRecord,
    pub listening: bool,
    pub tcp: bool,
    pub udp: bool,
}

impl<'a> From<&'a ConnectionRecord> for ConnectionInfo<'a> {
    fn from(record: &'a ConnectionRecord) -> Self {
        Self {
            record,
            listening: record.is_listening(),
            tcp: record.is_tcp(),
            udp: record.is_udp(),
        }
    }
}

/// Displays the result of a single lookup.
pub fn display_connection(record: &ConnectionRecord) {
    let mut table = create_table();
    table.set_header(vec!["ADDRESS", "PORT", "PROTOCOL", "STATE"]);
    table.add_row(vec![
        Cell::new(&record.address),
        Cell::new(record.port),
        Cell::new(record.protocol.as_deref().unwrap_or(NONE)),
        state_cell(record.state.as_deref()),
    ]);
    println!("{table}");
}

/// Displays the result of a single lookup as JSON.
pub fn display_connection_json(record: &ConnectionRecord) {
    println!("{}", pretty_json(&ConnectionInfo::from(record)));
}

/// Displays the connections table.
pub fn display_rows(rows: &[NetstatRow]) {
    if rows.is_empty() {
        println!("No connections found.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["PROTOCOL", "ADDRESS", "PORT", "STATE"]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.protocol),
            Cell::new(&row.address),
            Cell::new(row.port),
            state_cell(Some(&row.state)),
        ]);
    }

    println!("{table}");
}

/// Displays the connections as JSON.
pub fn display_rows_json(rows: &[NetstatRow]) {
    println!("{}", pretty_json(rows));
}

/// Configuration info for JSON output.
#[derive(Debug, Serialize)]
pub struct ConfigInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    pub default_backend: &'a BackendSpec,
    pub hosts: Vec<HostInfo<'a>>,
}

/// Host alias info for JSON output.
#[derive(Debug, Serialize)]
pub struct HostInfo<'a> {
    pub name: &'a str,
    pub backend: &'a BackendSpec,
}

/// Displays configuration information.
pub fn display_config(config: &Config, path: Option<&std::path::Path>) {
    if let Some(p) = path {
        println!("Config file: {}", p.display());
        println!();
    }

    println!("Default backend: {}", config.default_backend);

    if config.hosts.is_empty() {
        println!("No hosts configured.");
        return;
    }

    println!();
    let mut table = create_table();
    table.set_header(vec!["HOST", "BACKEND"]);

    for (name, spec) in &config.hosts {
        table.add_row(vec![Cell::new(name), Cell::new(spec)]);
    }

    println!("{table}");
}

/// Displays configuration as JSON.
pub fn display_config_json(config: &Config, path: Option<&std::path::Path>) {
    let info = ConfigInfo {
        config_file: path.map(|p| p.display().to_string()),
        default_backend: &config.default_backend,
        hosts: config
            .hosts
            .iter()
            .map(|(name, backend)| HostInfo { name, backend })
            .collect(),
    };

    println!("{}", pretty_json(&info));
}
