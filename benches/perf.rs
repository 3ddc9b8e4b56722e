use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use xg_scatter::config::ColumnNames;
use xg_scatter::metrics::derive_difference;
use xg_scatter::selection::select_performers;
use xg_scatter::table_fetch::parse_stats_table;

const BIG5_HTML: &str = include_str!("../tests/fixtures/big5_table.html");

fn bench_table_parse(c: &mut Criterion) {
    c.bench_function("big5_table_parse", |b| {
        b.iter(|| {
            let table = parse_stats_table(black_box(BIG5_HTML), "big5_table").unwrap();
            black_box(table.len());
        })
    });
}

fn bench_derive_and_select(c: &mut Criterion) {
    let table = parse_stats_table(BIG5_HTML, "big5_table").expect("valid fixture html");
    let columns = ColumnNames::default();
    c.bench_function("derive_and_select", |b| {
        b.iter(|| {
            let derived = derive_difference(black_box(&table), &columns).unwrap();
            let performers = select_performers(&derived, 10);
            black_box(performers.over.len() + performers.under.len());
        })
    });
}

criterion_group!(benches, bench_table_parse, bench_derive_and_select);
criterion_main!(benches);
