use std::fs;
use std::path::Path;

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::config::ScatterConfig;
use crate::error::FetchError;
use crate::http_client::http_client;
use crate::table::{Row, Table};

// Row classes FBref uses for repeated headers and separators inside <tbody>.
const SKIP_ROW_CLASSES: &[&str] = &["thead", "over_header", "spacer", "partial_table"];

pub fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    resp.text().map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })
}

pub fn read_page(path: &Path) -> Result<String, FetchError> {
    fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Fetch (or read the saved page named by `html_path`) and parse the stats table.
pub fn fetch_stats_table(cfg: &ScatterConfig) -> Result<Table, FetchError> {
    let html = match cfg.html_path.as_deref() {
        Some(path) => {
            info!(path = %path.display(), "reading saved page");
            read_page(path)?
        }
        None => {
            info!(url = %cfg.url, "fetching page");
            let client = http_client(cfg.timeout_secs)?;
            fetch_page(client, &cfg.url)?
        }
    };
    debug!(bytes = html.len(), "page loaded");
    parse_stats_table(&html, &cfg.table_id)
}

/// Locate the single `<table id=...>` in `html` and read it into a [`Table`].
///
/// FBref ships some tables inside HTML comments and reveals them with JS;
/// commented markup is searched only when no live table matches.
pub fn parse_stats_table(html: &str, table_id: &str) -> Result<Table, FetchError> {
    let selector = table_selector(table_id)?;
    let doc = Html::parse_document(html);

    let live: Vec<ElementRef> = doc.select(&selector).collect();
    match live.len() {
        1 => return Ok(read_table(live[0])),
        0 => {}
        count => {
            return Err(FetchError::AmbiguousTable {
                table_id: table_id.to_string(),
                count,
            });
        }
    }

    let needle = format!("id=\"{table_id}\"");
    let commented: Vec<String> = doc
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_comment().map(|c| String::from(&**c)))
        .filter(|text| text.contains(&needle))
        .collect();

    let mut found = Vec::new();
    for text in &commented {
        let fragment = Html::parse_fragment(text);
        found.extend(fragment.select(&selector).map(read_table));
    }
    match found.len() {
        0 => Err(FetchError::TableNotFound {
            table_id: table_id.to_string(),
        }),
        1 => {
            debug!(table_id, "table found inside html comment");
            Ok(found.remove(0))
        }
        count => Err(FetchError::AmbiguousTable {
            table_id: table_id.to_string(),
            count,
        }),
    }
}

fn table_selector(table_id: &str) -> Result<Selector, FetchError> {
    let escaped = table_id.replace('\\', "\\\\").replace('"', "\\\"");
    Selector::parse(&format!("table[id=\"{escaped}\"]")).map_err(|e| FetchError::Selector {
        table_id: table_id.to_string(),
        reason: e.to_string(),
    })
}

fn read_table(table: ElementRef) -> Table {
    let mut head_rows = Vec::new();
    let mut body_rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => head_rows.extend(child_rows(child)),
            "tbody" => body_rows.extend(child_rows(child)),
            "tr" => body_rows.push(child),
            _ => {}
        }
    }

    // Without <thead> the first row carries the headers.
    let header_row = match head_rows.last() {
        Some(row) => Some(*row),
        None if !body_rows.is_empty() => Some(body_rows.remove(0)),
        None => None,
    };
    let headers = header_row.map(row_cells).unwrap_or_default();

    let mut rows = Vec::with_capacity(body_rows.len());
    for tr in body_rows {
        if is_skipped_row(tr) {
            continue;
        }
        let mut cells = row_cells(tr);
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }
        rows.push(Row::new(cells));
    }
    Table::new(headers, rows)
}

fn child_rows(section: ElementRef) -> impl Iterator<Item = ElementRef> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
}

fn is_skipped_row(tr: ElementRef) -> bool {
    tr.value()
        .classes()
        .any(|class| SKIP_ROW_CLASSES.contains(&class))
}

fn row_cells(tr: ElementRef) -> Vec<String> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(cell_text)
        .collect()
}

fn cell_text(cell: ElementRef) -> String {
    let raw: String = cell.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_come_from_last_thead_row() {
        let html = r#"
            <table id="t">
              <thead>
                <tr class="over_header"><th colspan="3">Group</th></tr>
                <tr><th>Squad</th><th>GF</th><th>xG</th></tr>
              </thead>
              <tbody>
                <tr><th>Arsenal</th><td>68</td><td>60.1</td></tr>
                <tr class="thead"><th>Squad</th><th>GF</th><th>xG</th></tr>
                <tr><th>Wolves</th><td>50</td></tr>
              </tbody>
            </table>"#;
        let table = parse_stats_table(html, "t").expect("table should parse");
        assert_eq!(table.headers, vec!["Squad", "GF", "xG"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get(0), Some("Arsenal"));
        // short row padded to header width
        assert_eq!(table.rows[1].get(2), Some(""));
    }

    #[test]
    fn first_row_is_header_without_thead() {
        let html = r#"<table id="t"><tr><td>Squad</td><td>GF</td></tr><tr><td>A  B</td><td>1</td></tr></table>"#;
        let table = parse_stats_table(html, "t").expect("table should parse");
        assert_eq!(table.headers, vec!["Squad", "GF"]);
        assert_eq!(table.rows[0].get(0), Some("A B"));
    }

    #[test]
    fn missing_table_is_reported() {
        let err = parse_stats_table("<html><body><p>nothing</p></body></html>", "big5_table")
            .expect_err("no table on page");
        assert!(matches!(err, FetchError::TableNotFound { .. }));
    }

    #[test]
    fn duplicate_ids_are_ambiguous() {
        let html = r#"<table id="t"><tr><th>a</th></tr></table><table id="t"><tr><th>a</th></tr></table>"#;
        let err = parse_stats_table(html, "t").expect_err("two tables share the id");
        assert!(matches!(err, FetchError::AmbiguousTable { count: 2, .. }));
    }

    #[test]
    fn commented_table_is_found() {
        let html = r#"<div><!--
            <table id="hidden"><thead><tr><th>Squad</th><th>GF</th></tr></thead>
            <tbody><tr><td>Lens</td><td>44</td></tr></tbody></table>
        --></div>"#;
        let table = parse_stats_table(html, "hidden").expect("commented table should parse");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].cells, vec!["Lens", "44"]);
    }
}
