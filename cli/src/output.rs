//! Plain-text tables for command output.
//!
//! ```text
//! +----+--------------------+----------+
//! | ID | API URL            | Username |
//! +----+--------------------+----------+
//! | 1  | http://child:8774/ | admin    |
//! +----+--------------------+----------+
//! ```

use unicode_width::UnicodeWidthStr;

use gantt_client::{Zone, ZoneInfo};

#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a row. Short rows are padded with empty cells, extra cells dropped.
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .map(|cell| sanitize_cell(&cell.into()))
            .take(self.headers.len())
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    #[must_use]
    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].width())
                    .chain(std::iter::once(header.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let border = {
            let mut line = String::from("+");
            for width in &widths {
                line.push_str(&"-".repeat(width + 2));
                line.push('+');
            }
            line
        };

        let render_row = |cells: &[String]| {
            let mut line = String::from("|");
            for (cell, width) in cells.iter().zip(&widths) {
                line.push(' ');
                line.push_str(cell);
                line.push_str(&" ".repeat(width - cell.width()));
                line.push_str(" |");
            }
            line
        };

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&render_row(&self.headers));
        out.push('\n');
        out.push_str(&border);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_row(row));
            out.push('\n');
        }
        if !self.rows.is_empty() {
            out.push_str(&border);
            out.push('\n');
        }
        out
    }
}

/// Keep one table row on one terminal line.
fn sanitize_cell(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Two-column `Property | Value` table for a single object.
#[must_use]
pub fn properties<'a, I>(pairs: I) -> Table
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut table = Table::new(["Property", "Value"]);
    for (key, value) in pairs {
        table.add_row([key.to_string(), value]);
    }
    table
}

#[must_use]
pub fn zone_list(zones: &[Zone]) -> Table {
    let mut table = Table::new(["ID", "API URL", "Username", "Weight Offset", "Weight Scale"]);
    for zone in zones {
        table.add_row([
            zone.id.to_string(),
            zone.api_url.clone(),
            zone.username.clone(),
            zone.weight_offset.to_string(),
            zone.weight_scale.to_string(),
        ]);
    }
    table
}

#[must_use]
pub fn zone_details(zone: &Zone) -> Table {
    properties([
        ("id", zone.id.to_string()),
        ("api_url", zone.api_url.clone()),
        ("username", zone.username.clone()),
        ("weight_offset", zone.weight_offset.to_string()),
        ("weight_scale", zone.weight_scale.to_string()),
    ])
}

#[must_use]
pub fn zone_info(info: &ZoneInfo) -> Table {
    let mut table = properties([("name", info.name.clone())]);
    for (capability, value) in &info.capabilities {
        table.add_row([capability.clone(), value.clone()]);
    }
    table
}
