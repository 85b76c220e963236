//! Property-based tests for the filter and aggregation invariants.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use discount_desk_api::models::{DiscountRequest, NewDiscountRequest, Priority, Product, RequestStage};
use discount_desk_api::services::analytics::{margin_analysis, risk_assessment};
use discount_desk_api::services::filter::{filter_requests, FilterCriteria, ALL};

fn product_strategy() -> impl Strategy<Value = Product> {
    prop_oneof![
        Just(Product::WireRod),
        Just(Product::Rebar),
        Just(Product::Billets)
    ]
}

fn stage_strategy() -> impl Strategy<Value = RequestStage> {
    prop_oneof![
        Just(RequestStage::Inquiry),
        Just(RequestStage::Negotiation),
        Just(RequestStage::FinalReview),
        Just(RequestStage::ReadyToClose)
    ]
}

fn region_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("Oman"), Just("UAE"), Just("Qatar")].prop_map(str::to_string)
}

fn requests_strategy() -> impl Strategy<Value = Vec<DiscountRequest>> {
    requests_with_discounts(0i64..3_000)
}

/// Discounts in hundredths of a percent, far outside 0..=100 in both directions.
fn wide_discount_requests_strategy() -> impl Strategy<Value = Vec<DiscountRequest>> {
    requests_with_discounts(-1_000_000_000i64..1_000_000_000)
}

fn requests_with_discounts(
    discount_bp: impl Strategy<Value = i64>,
) -> impl Strategy<Value = Vec<DiscountRequest>> {
    let spec = (
        product_strategy(),
        stage_strategy(),
        region_strategy(),
        discount_bp,
        0u32..2_000_000,
    );
    prop::collection::vec(spec, 0..20).prop_map(|specs| {
        let now = Utc::now();
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (product, stage, region, discount_bp, value))| {
                NewDiscountRequest {
                    customer_id: format!("customer-{}", i % 3),
                    product,
                    grade: "A500".to_string(),
                    discount_percentage: Decimal::new(discount_bp, 2),
                    order_value: Decimal::from(value),
                    stage,
                    priority: Priority::Medium,
                    region: Some(region),
                }
                .into_request(format!("request-{}", i), now)
            })
            .collect()
    })
}

fn criteria_strategy() -> impl Strategy<Value = FilterCriteria> {
    (
        prop::option::of(prop_oneof![
            Just(ALL.to_string()),
            product_strategy().prop_map(|p| p.to_string())
        ]),
        prop::option::of(prop_oneof![Just(ALL.to_string()), region_strategy()]),
        prop::option::of(prop_oneof![
            Just(ALL.to_string()),
            stage_strategy().prop_map(|s| s.to_string())
        ]),
        prop::option::of(0f64..1_000_000.0),
        prop::option::of(0f64..2_000_000.0),
    )
        .prop_map(|(product_type, region, stage, min_value, max_value)| FilterCriteria {
            product_type,
            region,
            stage,
            min_value,
            max_value,
        })
}

fn ids(requests: &[DiscountRequest]) -> Vec<&str> {
    requests.iter().map(|r| r.id.as_str()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn wildcard_criteria_keep_everything_in_order(requests in requests_strategy()) {
        let criteria = FilterCriteria {
            product_type: Some(ALL.to_string()),
            region: Some(ALL.to_string()),
            stage: Some(ALL.to_string()),
            min_value: Some(0.0),
            max_value: Some(f64::MAX),
        };
        let kept = filter_requests(requests.clone(), &criteria);
        prop_assert_eq!(ids(&kept), ids(&requests));
    }

    #[test]
    fn filter_output_is_an_ordered_matching_subsequence(
        requests in requests_strategy(),
        criteria in criteria_strategy(),
    ) {
        let kept = filter_requests(requests.clone(), &criteria);
        prop_assert!(kept.iter().all(|r| criteria.matches(r)));

        let expected: Vec<&str> = requests
            .iter()
            .filter(|r| criteria.matches(r))
            .map(|r| r.id.as_str())
            .collect();
        prop_assert_eq!(ids(&kept), expected);

        let again = filter_requests(kept.clone(), &criteria);
        prop_assert_eq!(ids(&again), ids(&kept));
    }

    #[test]
    fn loss_percent_tracks_average_discount(requests in requests_strategy()) {
        let analysis = margin_analysis(&requests).expect("bounded inputs");
        prop_assert_eq!(analysis.current_loss_percent, analysis.avg_discount);
        prop_assert_eq!(
            analysis.projected_revenue,
            analysis.total_order_value - analysis.current_loss
        );
        if requests.is_empty() {
            prop_assert_eq!(analysis.revenue_growth, Decimal::ZERO);
        }
    }

    #[test]
    fn risk_levels_stay_within_bounds(requests in wide_discount_requests_strategy()) {
        let risk = risk_assessment(&requests).expect("bounded inputs");
        prop_assert!(risk.competition_level >= Decimal::ZERO);
        prop_assert!(risk.competition_level <= dec!(65));
        prop_assert!(risk.retention_level >= dec!(30));
        prop_assert!(risk.retention_level <= dec!(100));
        prop_assert!(risk.volume_impact >= dec!(25));
        prop_assert!(risk.volume_impact <= dec!(85));
    }
}
