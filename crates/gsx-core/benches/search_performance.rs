//! Benchmarks for index construction and query latency

#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gsx_core::{CatalogControl, ControlRecord, SearchFilters, SearchIndex, parse_catalog};
use serde_json::{Value, json};
use std::hint::black_box;
use std::time::Duration;

const TOPICS: [&str; 5] = [
    "Datensicherung Backups Wiederherstellung",
    "Firewall Netzsegmentierung Paketfilter",
    "Kryptografie Schlüsselverwaltung Zertifikate",
    "Protokollierung Auswertung Aufbewahrung",
    "Zugriffskontrolle Berechtigungen Rollen",
];

// Realistic records spread over a handful of groups
fn create_test_records(count: usize) -> Vec<ControlRecord> {
    (0..count)
        .map(|i| {
            let topic = TOPICS[i % TOPICS.len()];
            let title = format!("Anforderung {i} {}", topic.split(' ').next().unwrap_or_default());
            ControlRecord {
                id: format!("CTRL-{i}"),
                full_text: format!(
                    "{title} {topic} Die Institution SOLLTE geeignete Maßnahmen umsetzen und regelmäßig prüfen."
                ),
                title,
                group_path: vec![format!("Baustein {}", i % 10), format!("Teil {}", i % 3)],
                control: CatalogControl::default(),
            }
        })
        .collect()
}

fn create_nested_payload(groups: usize, controls_per_group: usize) -> Value {
    let groups: Vec<Value> = (0..groups)
        .map(|g| {
            let controls: Vec<Value> = (0..controls_per_group)
                .map(|c| {
                    json!({
                        "id": format!("G{g}.C{c}"),
                        "title": format!("Control {g}.{c}"),
                        "props": [{"name": "tags", "value": TOPICS[c % TOPICS.len()]}],
                        "parts": [{"name": "statement", "prose": "Die Institution SOLLTE Maßnahmen umsetzen."}],
                        "controls": [{"id": format!("G{g}.C{c}.1"), "title": "Erweiterung"}]
                    })
                })
                .collect();
            json!({"title": format!("Group {g}"), "controls": controls})
        })
        .collect();
    json!({"catalog": {"groups": groups}})
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    group.sample_size(20);

    for &count in &[100usize, 1_000, 5_000] {
        let records = create_test_records(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| SearchIndex::build(black_box(records)).expect("build index"));
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let records = create_test_records(2_000);
    let index = SearchIndex::build(&records).expect("build index");

    let mut group = c.benchmark_group("query");
    group.measurement_time(Duration::from_secs(5));

    let cases = [
        ("single_token", "firewall", SearchFilters::default()),
        ("prefix", "krypto", SearchFilters::default()),
        ("typo", "wiederherstelung", SearchFilters::default()),
        ("multi_token", "backups prüfen institution", SearchFilters::default()),
        ("browse_group", "", SearchFilters::default().with_group("Baustein 3")),
    ];

    for (name, query, filters) in &cases {
        group.bench_with_input(BenchmarkId::new("search", name), query, |b, query| {
            b.iter(|| index.search(black_box(query), filters).expect("search"));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let payload = create_nested_payload(50, 40);
    c.bench_function("parse_nested_catalog", |b| {
        b.iter(|| parse_catalog(black_box(&payload)));
    });
}

criterion_group!(benches, bench_index_build, bench_queries, bench_parse);
criterion_main!(benches);
