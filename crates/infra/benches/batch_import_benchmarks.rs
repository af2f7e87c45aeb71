use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use sockstock_infra::{InMemoryStockStore, StockLedger};
use sockstock_inventory::FilterCriteria;

const COLORS: [&str; 6] = ["red", "blue", "green", "black", "white", "grey"];

/// Synthetic upload: `rows` data lines over a bounded key space, every tenth row malformed.
fn upload(rows: usize) -> Vec<u8> {
    let mut out = String::from("color,cottonPart,quantity\n");
    for i in 0..rows {
        if i % 10 == 9 {
            out.push_str("broken-row\n");
            continue;
        }
        let color = COLORS[i % COLORS.len()];
        let cotton = (i * 7) % 101;
        out.push_str(&format!("{color},{cotton},{}\n", 1 + i % 50));
    }
    out.into_bytes()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime")
}

fn bench_batch_import(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("batch_import");

    for rows in [100usize, 1_000, 10_000] {
        let body = upload(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &body, |b, body| {
            b.iter(|| {
                let ledger = StockLedger::new(InMemoryStockStore::new());
                let report = rt
                    .block_on(ledger.batch_income(Some("bench.csv"), &body[..]))
                    .expect("batch import");
                black_box(report.records.len());
            });
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let rt = runtime();
    let ledger = StockLedger::new(InMemoryStockStore::new());
    rt.block_on(ledger.batch_income(Some("seed.csv"), &upload(10_000)[..]))
        .expect("seed store");

    let criteria = FilterCriteria {
        color: Some("red".to_string()),
        min_cotton_part: Some(20),
        max_cotton_part: Some(80),
        ..Default::default()
    };

    c.bench_function("aggregate_filtered", |b| {
        b.iter(|| black_box(rt.block_on(ledger.aggregate(&criteria)).expect("aggregate")));
    });
}

criterion_group!(benches, bench_batch_import, bench_aggregate);
criterion_main!(benches);
