// ABOUTME: This module handles output formatting for capability query reports
// ABOUTME: It provides table formatting with color support and JSON output

use anyhow::Result;
use kgp_sdk::CapabilityReport;
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub trait OutputFormat {
    fn format_report(&self, report: &CapabilityReport) -> Result<String>;
}

pub struct TableFormatter {
    use_color: bool,
}

impl TableFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn format_support(&self, supported: bool) -> String {
        let text = if supported { "yes" } else { "no" };

        if !self.use_color {
            return text.to_string();
        }
        if supported {
            text.green().to_string()
        } else {
            text.red().to_string()
        }
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormat for JsonFormatter {
    fn format_report(&self, report: &CapabilityReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Capability")]
    capability: String,
    #[tabled(rename = "Supported")]
    supported: String,
}

impl OutputFormat for TableFormatter {
    fn format_report(&self, report: &CapabilityReport) -> Result<String> {
        let rows: Vec<TableRow> = report
            .iter()
            .map(|entry| TableRow {
                capability: entry.name.clone(),
                supported: self.format_support(entry.supported),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::psql());
        Ok(table.to_string())
    }
}
