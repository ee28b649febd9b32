use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use csv_tidy::{
    config::CleanConfig,
    context::RunContext,
    engine::clean_table,
    frame::{RawTable, Table},
};

fn generate_orders(rows: usize) -> RawTable {
    let headers = ["Order #", "Customer Name", "Revenue ($)", "Discount %", "Order Date"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let records = (0..rows)
        .map(|i| {
            let month = (i % 12) + 1;
            let day = (i % 28) + 1;
            vec![
                i.to_string(),
                format!(" customer {} ", i % 97),
                format!("${},{:03}.{:02}", i % 50 + 1, i % 1000, i % 100),
                format!("{}%", i % 100),
                format!("{month:02}/{day:02}/2024"),
            ]
        })
        .collect();
    Table::from_rows(headers, records)
}

fn bench_clean_table(c: &mut Criterion) {
    let config = CleanConfig::default();
    let mut group = c.benchmark_group("clean_table");
    for rows in [1_000usize, 20_000] {
        let raw = generate_orders(rows);
        group.bench_function(format!("orders_{rows}"), |b| {
            b.iter_batched(
                || RunContext::new("orders.csv", &config),
                |mut ctx| clean_table(&raw, &mut ctx).expect("clean"),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_clean_table);
criterion_main!(benches);
