use criterion::{Criterion, criterion_group, criterion_main};
use domain::BookingContext;
use serde_json::json;

fn valid_context() -> BookingContext {
    serde_json::from_value(json!({
        "requester": {"id": "42", "email": "ana@example.com", "phone": "+1 555 123 4567"},
        "record": {
            "start_date": "2025-01-05",
            "end_date": "2025-01-12",
            "coverage_amount": 50000,
            "premium": 49.6
        }
    }))
    .unwrap()
}

fn bench_validate_valid(c: &mut Criterion) {
    let ctx = valid_context();
    c.bench_function("domain/validate_valid", |b| {
        b.iter(|| ctx.validate().unwrap());
    });
}

fn bench_validate_invalid(c: &mut Criterion) {
    let ctx = BookingContext::default();
    c.bench_function("domain/validate_empty", |b| {
        b.iter(|| ctx.validate().unwrap_err());
    });
}

criterion_group!(benches, bench_validate_valid, bench_validate_invalid);
criterion_main!(benches);
