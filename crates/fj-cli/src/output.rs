// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared human/JSON rendering for every `fj` subcommand (spec.md §6
//! "Configuration" lists no CLI surface of its own, but every operator
//! tool in this workspace renders both ways via `-o/--output`).

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a single value as pretty JSON, or hand it to `render` for the
/// text path.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, render: impl FnOnce(&T)) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Text => render(value),
    }
    Ok(())
}

/// A left-aligned text table with a header row, sized to the widest
/// cell in each column. Scaled down from the fuller renderer used by
/// this workspace's heavier list views — this CLI only ever prints
/// short operator-facing summaries.
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn print(&self) {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }
        let line = |cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
                .collect();
            println!("{}", padded.join("  ").trim_end());
        };
        line(&self.headers.iter().map(|h| h.to_string()).collect::<Vec<_>>());
        for row in &self.rows {
            line(row);
        }
        if self.rows.is_empty() {
            println!("(none)");
        }
    }
}
