use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::time::Duration;

use discount_desk_api::models::{
    DiscountRequest, NewDiscountRequest, Priority, Product, RequestStage,
};
use discount_desk_api::services::analytics::{margin_impact_report, risk_assessment};
use discount_desk_api::services::assistant;
use discount_desk_api::services::filter::{filter_requests, FilterCriteria};

fn synthetic_requests(count: usize) -> Vec<DiscountRequest> {
    let products = [Product::WireRod, Product::Rebar, Product::Billets];
    let stages = [
        RequestStage::Inquiry,
        RequestStage::Negotiation,
        RequestStage::FinalReview,
        RequestStage::ReadyToClose,
    ];
    let now = Utc::now();
    (0..count)
        .map(|i| {
            NewDiscountRequest {
                customer_id: format!("customer-{}", i % 7),
                product: products[i % products.len()],
                grade: "A500".to_string(),
                discount_percentage: Decimal::new((i % 2_000) as i64, 2),
                order_value: Decimal::from(100_000 + (i as u64 * 7_919) % 900_000),
                stage: stages[i % stages.len()],
                priority: Priority::Medium,
                region: None,
            }
            .into_request(format!("request-{}", i), now)
        })
        .collect()
}

// Filtering a growing request list
fn filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_requests");
    let criteria = FilterCriteria {
        product_type: Some("Rebar".to_string()),
        min_value: Some(250_000.0),
        max_value: Some(750_000.0),
        ..FilterCriteria::default()
    };

    for size in [10usize, 100, 1_000, 10_000].iter() {
        let requests = synthetic_requests(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &requests, |b, requests| {
            b.iter(|| filter_requests(black_box(requests.clone()), black_box(&criteria)));
        });
    }

    group.finish();
}

// Margin analysis, risk and trend over a selection
fn aggregation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("margin_impact_report");

    for size in [3usize, 100, 1_000].iter() {
        let requests = synthetic_requests(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &requests, |b, requests| {
            b.iter(|| margin_impact_report(black_box(requests)).expect("bounded inputs"));
        });
    }

    group.finish();

    let requests = synthetic_requests(1_000);
    c.bench_function("risk_assessment_1000", |b| {
        b.iter(|| risk_assessment(black_box(&requests)).expect("bounded inputs"))
    });
}

fn money_format_benchmark(c: &mut Criterion) {
    c.bench_function("format_omr", |b| {
        b.iter(|| assistant::format_omr(black_box(Decimal::new(123_456_789_12, 2))))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets =
        filter_benchmark,
        aggregation_benchmark,
        money_format_benchmark
}

criterion_main!(benches);
