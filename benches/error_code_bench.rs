// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmarks for code resolution, display lookup and payload conversion.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use skygear_config::MessageCatalog;
use skygear_error::{ErrorCode, ErrorPayload, Info, SkygearError};

fn sample_payload_json() -> String {
    let mut info = Info::new();
    info.insert("arguments".into(), serde_json::json!(["email"]));
    let err = SkygearError::from_parts(
        108,
        Some("InvalidArgument".into()),
        Some("invalid email".into()),
        Some(info),
        None,
    );
    serde_json::to_string(&ErrorPayload::from(&err)).unwrap()
}

fn bench_resolution(c: &mut Criterion) {
    let values: Vec<i32> = (90..130).chain([9999, 10000, 10001]).collect();
    c.bench_function("error_code_from_value", |b| {
        b.iter(|| {
            for v in &values {
                black_box(ErrorCode::from_value(black_box(*v)));
            }
        })
    });

    let err = SkygearError::with_code(120, "bad query");
    c.bench_function("skygear_error_display_message", |b| {
        b.iter(|| black_box(black_box(&err).display_message()))
    });

    let catalog = MessageCatalog::new().with_override(ErrorCode::RecordQueryInvalid, "Bad query.");
    c.bench_function("catalog_message_for", |b| {
        b.iter(|| black_box(catalog.message_for(black_box(&err))))
    });
}

fn bench_payload(c: &mut Criterion) {
    let json = sample_payload_json();
    c.bench_function("payload_deserialize_to_error", |b| {
        b.iter(|| {
            let payload: ErrorPayload = serde_json::from_str(black_box(&json)).unwrap();
            black_box(SkygearError::from(payload))
        })
    });
}

criterion_group!(benches, bench_resolution, bench_payload);
criterion_main!(benches);
