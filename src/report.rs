use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::metrics::DerivedRow;
use crate::selection::Performers;

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub source: &'a str,
    pub rows: usize,
    pub top_k: usize,
    pub overperformers: &'a [DerivedRow],
    pub underperformers: &'a [DerivedRow],
}

impl<'a> Summary<'a> {
    pub fn new(source: &'a str, rows: usize, top_k: usize, performers: &'a Performers) -> Self {
        Self {
            source,
            rows,
            top_k,
            overperformers: &performers.over,
            underperformers: &performers.under,
        }
    }
}

/// Two ranked blocks, one line per team.
pub fn format_performers(performers: &Performers) -> String {
    let mut out = String::new();
    push_block(&mut out, "Overperformers (GF - xG)", &performers.over);
    push_block(&mut out, "Underperformers (GF - xG)", &performers.under);
    out
}

fn push_block(out: &mut String, title: &str, rows: &[DerivedRow]) {
    let _ = writeln!(out, "{title}:");
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    let width = rows.iter().map(|r| display_name(r).len()).max().unwrap_or(0);
    for (rank, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<width$}  {:>+6.1}  (GF {:.0}, xG {:.1})",
            rank + 1,
            display_name(row),
            row.difference,
            row.goals_for,
            row.expected_goals,
        );
    }
}

fn display_name(row: &DerivedRow) -> String {
    match row.competition.as_deref() {
        Some(comp) => format!("{} [{}]", row.team, comp),
        None => row.team.clone(),
    }
}

pub fn write_summary(path: &Path, summary: &Summary<'_>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("create summary directory")?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&tmp, json).context("write summary")?;
    fs::rename(&tmp, path).context("swap summary")?;
    Ok(())
}
