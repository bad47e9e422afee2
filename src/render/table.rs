// src/render/table.rs
use super::renderer::{RenderTarget, RenderedRow};
use std::fmt;

const HEADERS: [&str; 6] = ["Ad ID", "Name", "Status", "Spend", "Conversions", "Reason"];

/// In-memory results table, printable as aligned text.
#[derive(Debug, Default, Clone)]
pub struct TableView {
    rows: Vec<RenderedRow>,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RenderTarget for TableView {
    fn replace_rows(&mut self, rows: Vec<RenderedRow>) {
        self.rows = rows;
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row.cells.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(f, &HEADERS, &widths, "")?;
        for row in &self.rows {
            write_line(f, &row.cells, &widths, row.style.css_class().unwrap_or(""))?;
        }
        Ok(())
    }
}

fn write_line<S: AsRef<str>>(
    f: &mut fmt::Formatter<'_>,
    cells: &[S],
    widths: &[usize],
    marker: &str,
) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join(" | ");

    if marker.is_empty() {
        writeln!(f, "{}", line.trim_end())
    } else {
        writeln!(f, "{}  [{}]", line.trim_end(), marker)
    }
}
