//! CSV export row mapping benchmarks

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use linkhub::analytics::{ExportColumns, parse_columns};
use linkhub::storage::AnalyticsEvent;

fn sale_event(i: usize) -> AnalyticsEvent {
    AnalyticsEvent {
        id: format!("evt_{:024}", i),
        workspace_id: "ws_bench".to_string(),
        event: "sale".to_string(),
        timestamp: Utc::now(),
        click_id: format!("clk_{:024}", i),
        link_id: "link_bench".to_string(),
        domain: "go.example.com".to_string(),
        key: "spring-sale".to_string(),
        url: "https://example.com/products/spring?utm_source=newsletter".to_string(),
        qr: i % 3 == 0,
        country: Some(["US", "DE", "JP", "BR"][i % 4].to_string()),
        city: Some("Berlin".to_string()),
        device: Some("Desktop".to_string()),
        browser: Some("Chrome".to_string()),
        os: Some("Windows 10".to_string()),
        referer: Some("(direct)".to_string()),
        event_name: Some("Purchase".to_string()),
        customer_name: Some("Ada Lovelace".to_string()),
        customer_email: Some("ada@example.com".to_string()),
        invoice_id: Some(format!("in_{}", i)),
        amount: Some(4900 + i as i64),
        currency: Some("usd".to_string()),
        payment_processor: Some("stripe".to_string()),
        ..Default::default()
    }
}

fn bench_record_mapping(c: &mut Criterion) {
    let rows: Vec<AnalyticsEvent> = (0..1_000).map(sale_event).collect();
    let mut group = c.benchmark_group("export/record");
    group.throughput(Throughput::Elements(rows.len() as u64));

    let cases = [
        ("accessors_only", "trigger,link,country,customer,amount"),
        ("raw_fields", "timestamp,url,city,browser,os,currency"),
        (
            "mixed",
            "timestamp,event,link,country,city,customer,invoiceId,amount,payment_processor",
        ),
    ];

    for (name, columns) in cases {
        let columns = ExportColumns::new(parse_columns(Some(columns)).unwrap());
        group.bench_with_input(BenchmarkId::from_parameter(name), &columns, |b, columns| {
            b.iter(|| {
                for row in &rows {
                    std::hint::black_box(columns.record(row));
                }
            });
        });
    }

    group.finish();
}

fn bench_parse_columns(c: &mut Criterion) {
    c.bench_function("export/parse_columns", |b| {
        b.iter(|| {
            parse_columns(std::hint::black_box(Some(
                " timestamp, link ,country,link,,amount,customer,timestamp ",
            )))
        });
    });
}

criterion_group!(benches, bench_record_mapping, bench_parse_columns);
criterion_main!(benches);
