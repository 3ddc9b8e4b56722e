use std::cmp::Ordering;

use crate::metrics::{DerivedRow, DerivedTable};

/// Biggest over- and under-performers by difference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Performers {
    /// Largest difference first.
    pub over: Vec<DerivedRow>,
    /// Smallest difference first.
    pub under: Vec<DerivedRow>,
}

/// Pick `k` rows from each end of the difference ranking.
///
/// Ties keep source order in both lists: the row that appears first in the
/// fetched table wins. With fewer than `k` rows every row is returned, so
/// the two lists overlap when the table has fewer than `2k` rows.
pub fn select_performers(table: &DerivedTable, k: usize) -> Performers {
    Performers {
        over: top_k(table, k, |a, b| b.total_cmp(a)),
        under: top_k(table, k, |a, b| a.total_cmp(b)),
    }
}

fn top_k(table: &DerivedTable, k: usize, order: impl Fn(&f64, &f64) -> Ordering) -> Vec<DerivedRow> {
    let mut ranked: Vec<&DerivedRow> = table.rows.iter().collect();
    // Stable sort, then the explicit index key makes the tie-break independent of input order.
    ranked.sort_by(|a, b| order(&a.difference, &b.difference).then(a.index.cmp(&b.index)));
    ranked.into_iter().take(k).cloned().collect()
}
