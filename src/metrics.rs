use serde::Serialize;

use crate::config::ColumnNames;
use crate::error::SchemaError;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    /// Position in the source table.
    pub index: usize,
    pub team: String,
    pub competition: Option<String>,
    pub goals_for: f64,
    pub expected_goals: f64,
    /// `goals_for - expected_goals`
    pub difference: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedTable {
    pub rows: Vec<DerivedRow>,
}

impl DerivedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn expected_goals_range(&self) -> Option<(f64, f64)> {
        min_max(self.rows.iter().map(|r| r.expected_goals))
    }

    pub fn goals_for_range(&self) -> Option<(f64, f64)> {
        min_max(self.rows.iter().map(|r| r.goals_for))
    }

    pub fn difference_range(&self) -> Option<(f64, f64)> {
        min_max(self.rows.iter().map(|r| r.difference))
    }
}

/// Add `difference = GF - xG` to every row. Any row without usable numbers
/// fails the whole table.
pub fn derive_difference(table: &Table, columns: &ColumnNames) -> Result<DerivedTable, SchemaError> {
    let team_col = require_column(table, &columns.team)?;
    let gf_col = require_column(table, &columns.goals_for)?;
    let xg_col = require_column(table, &columns.expected_goals)?;
    let comp_col = table.column(&columns.competition);

    let mut rows = Vec::with_capacity(table.len());
    for (index, row) in table.rows.iter().enumerate() {
        let team = row.get(team_col).unwrap_or_default().to_string();
        let goals_for = numeric_cell(row.get(gf_col), index, &columns.goals_for)?;
        let expected_goals = numeric_cell(row.get(xg_col), index, &columns.expected_goals)?;
        let competition = comp_col
            .and_then(|c| row.get(c))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        rows.push(DerivedRow {
            index,
            team,
            competition,
            goals_for,
            expected_goals,
            difference: goals_for - expected_goals,
        });
    }
    Ok(DerivedTable { rows })
}

fn require_column(table: &Table, name: &str) -> Result<usize, SchemaError> {
    table.column(name).ok_or_else(|| SchemaError::MissingColumn {
        column: name.to_string(),
        available: table.headers.join(", "),
    })
}

fn numeric_cell(raw: Option<&str>, row: usize, column: &str) -> Result<f64, SchemaError> {
    let s = raw.unwrap_or_default().trim();
    if s.is_empty() {
        return Err(SchemaError::MissingValue {
            row,
            column: column.to_string(),
        });
    }
    parse_number(s).ok_or_else(|| SchemaError::NotNumeric {
        row,
        column: column.to_string(),
        value: s.to_string(),
    })
}

/// Plain decimal with optional thousands separators; NaN and infinities are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
