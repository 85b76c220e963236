//! Keyword-routed answers to common pricing questions.
//!
//! Questions are lower-cased and checked against an ordered rule table; the
//! first rule whose predicate holds produces the reply. Replies depend only on
//! the question, the requests in view and the focused request, so the same
//! inputs always give the same text.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoEnumIterator};
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::models::{Priority, Product, RequestWithCustomer};
use crate::services::analytics::{
    average_discount, checked_sum, overflow, total_margin_impact, RiskLevel,
};

/// Monthly revenue used to express margin impact as a share.
pub const ASSUMED_MONTHLY_REVENUE: Decimal = dec!(5500000);
pub const BENCHMARK_REGION: &str = "Oman";
/// Regional average discount the product comparison is made against.
pub const BENCHMARK_DISCOUNT: Decimal = dec!(12.5);
pub const HIGH_VALUE_THRESHOLD: Decimal = dec!(400000);
/// Combined impact above which a high-value batch is rated HIGH.
pub const HIGH_VALUE_IMPACT_LIMIT: Decimal = dec!(200000);
pub const STRESS_DISCOUNT: Decimal = dec!(20);

const COUNTER_OFFER_ABOVE: Decimal = dec!(18);

pub const HELP_MESSAGE: &str = "I can help with margin analysis, customer insights, and regional comparisons. Try asking about specific discount impacts, total monthly effects, or product performance comparisons.";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Intent {
    TotalImpact,
    ProductPerformance,
    HighValueRisk,
    SingleRequestImpact,
    ApproveRecommendation,
    Help,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssistantReply {
    pub intent: Intent,
    pub reply: String,
}

struct Question<'a> {
    text: String,
    requests: &'a [RequestWithCustomer],
    focused: Option<&'a RequestWithCustomer>,
}

impl Question<'_> {
    fn mentions(&self, word: &str) -> bool {
        self.text.contains(word)
    }

    fn product(&self) -> Option<Product> {
        Product::iter().find(|p| self.mentions(p.keyword()))
    }
}

struct Rule {
    intent: Intent,
    applies: fn(&Question<'_>) -> bool,
    answer: fn(&Question<'_>) -> Result<String, ServiceError>,
}

const RULES: &[Rule] = &[
    Rule {
        intent: Intent::TotalImpact,
        applies: |q| q.mentions("total") && q.mentions("impact"),
        answer: total_impact,
    },
    Rule {
        intent: Intent::ProductPerformance,
        applies: |q| q.mentions("performance") && q.product().is_some(),
        answer: product_performance,
    },
    Rule {
        intent: Intent::HighValueRisk,
        applies: |q| q.mentions("risk") && (q.mentions("high") || q.mentions("all")),
        answer: high_value_risk,
    },
    Rule {
        intent: Intent::SingleRequestImpact,
        applies: |q| q.focused.is_some() && (q.mentions("20%") || q.mentions("margin")),
        answer: single_request_impact,
    },
    Rule {
        intent: Intent::ApproveRecommendation,
        applies: |q| {
            q.focused.is_some() && (q.mentions("approve") || q.mentions("recommendation"))
        },
        answer: approve_recommendation,
    },
];

/// Answers `message` against the requests in view.
pub fn respond(
    message: &str,
    requests: &[RequestWithCustomer],
    focused: Option<&RequestWithCustomer>,
) -> Result<AssistantReply, ServiceError> {
    let question = Question {
        text: message.to_lowercase(),
        requests,
        focused,
    };

    match RULES.iter().find(|rule| (rule.applies)(&question)) {
        Some(rule) => Ok(AssistantReply {
            intent: rule.intent,
            reply: (rule.answer)(&question)?,
        }),
        None => Ok(AssistantReply {
            intent: Intent::Help,
            reply: HELP_MESSAGE.to_string(),
        }),
    }
}

/// Whole OMR with thousands separators, e.g. `1,205,000`.
pub fn format_omr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn one_decimal(value: Decimal) -> String {
    format!(
        "{:.1}",
        value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Breakpoints on the requested discount: above 20 HIGH, above 15 MEDIUM.
fn discount_risk(discount: Decimal) -> (RiskLevel, &'static str) {
    if discount > dec!(20) {
        (RiskLevel::High, "Reject or counter-offer")
    } else if discount > dec!(15) {
        (RiskLevel::Medium, "Approve with conditions")
    } else {
        (RiskLevel::Low, "Safe to approve")
    }
}

fn level(risk: RiskLevel) -> String {
    risk.to_string().to_uppercase()
}

fn total_impact(q: &Question<'_>) -> Result<String, ServiceError> {
    let requests = || q.requests.iter().map(|r| &r.request);
    let total = total_margin_impact(requests())?;
    let share = if ASSUMED_MONTHLY_REVENUE.is_zero() {
        Decimal::ZERO
    } else {
        total / ASSUMED_MONTHLY_REVENUE * Decimal::ONE_HUNDRED
    };

    let mut lines = vec![
        "**Total Margin Impact Analysis:**".to_string(),
        format!(
            "• All {} requests: -OMR {}",
            q.requests.len(),
            format_omr(total)
        ),
    ];
    for priority in Priority::iter() {
        let count = requests().filter(|r| r.priority == priority).count();
        let impact = total_margin_impact(requests().filter(|r| r.priority == priority))?;
        lines.push(format!(
            "• {} priority ({}): -OMR {}",
            priority,
            count,
            format_omr(impact)
        ));
    }
    lines.push(format!(
        "This represents {}% of monthly revenue.",
        one_decimal(share)
    ));
    Ok(lines.join("\n"))
}

fn product_performance(q: &Question<'_>) -> Result<String, ServiceError> {
    let Some(product) = q.product() else {
        return Ok(HELP_MESSAGE.to_string());
    };
    let matching: Vec<_> = q
        .requests
        .iter()
        .map(|r| &r.request)
        .filter(|r| r.product == product)
        .collect();

    let mut lines = vec![
        format!(
            "**{} Performance vs {} Benchmark:**",
            product, BENCHMARK_REGION
        ),
        format!(
            "• {} Avg Discount: {}%",
            BENCHMARK_REGION,
            one_decimal(BENCHMARK_DISCOUNT)
        ),
    ];
    if matching.is_empty() {
        lines.push(format!("• No open {} requests in the current view.", product));
        return Ok(lines.join("\n"));
    }

    let avg = average_discount(matching.iter().copied())?;
    let variance = avg - BENCHMARK_DISCOUNT;
    let sign = if variance.is_sign_negative() && !variance.is_zero() {
        ""
    } else {
        "+"
    };
    lines.push(format!(
        "• Current Requests: {}% avg discount across {} request(s)",
        one_decimal(avg),
        matching.len()
    ));
    lines.push(format!(
        "• Variance vs benchmark: {}{} pts",
        sign,
        one_decimal(variance)
    ));
    Ok(lines.join("\n"))
}

fn high_value_risk(q: &Question<'_>) -> Result<String, ServiceError> {
    let high_value: Vec<_> = q
        .requests
        .iter()
        .map(|r| &r.request)
        .filter(|r| r.order_value > HIGH_VALUE_THRESHOLD)
        .collect();
    let total_value = checked_sum(high_value.iter().map(|r| r.order_value), "high-value total")?;
    let impact = total_margin_impact(high_value.iter().copied())?;
    let risk = if impact > HIGH_VALUE_IMPACT_LIMIT {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };
    let millions = (total_value / dec!(1000000))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok([
        "**Risk Assessment - High Value Requests:**".to_string(),
        format!(
            "• {} requests above OMR {}K = OMR {:.2}M total",
            high_value.len(),
            (HIGH_VALUE_THRESHOLD / dec!(1000)).normalize(),
            millions
        ),
        format!(
            "• Combined margin impact: -OMR {}K",
            format_omr(impact / dec!(1000))
        ),
        format!("• Risk Level: {}", level(risk)),
        "• Recommendation: Stagger approvals across 2 months".to_string(),
        "• Alternative: Counter with 12-14% discount".to_string(),
    ]
    .join("\n"))
}

fn single_request_impact(q: &Question<'_>) -> Result<String, ServiceError> {
    let Some(focused) = q.focused else {
        return Ok(HELP_MESSAGE.to_string());
    };
    let request = &focused.request;
    let stressed = request
        .order_value
        .checked_mul(STRESS_DISCOUNT)
        .map(|value| value / Decimal::ONE_HUNDRED)
        .ok_or_else(|| overflow("stress discount impact"))?;
    let (risk, recommendation) = discount_risk(request.discount_percentage);

    Ok([
        format!("**Margin Impact - {}:**", focused.customer_name),
        format!(
            "• Requested {}% discount: -OMR {}",
            request.discount_percentage.normalize(),
            format_omr(request.margin_impact()?)
        ),
        format!(
            "• At {}% discount: -OMR {}",
            STRESS_DISCOUNT,
            format_omr(stressed)
        ),
        format!("• Risk Level: {}", level(risk)),
        format!("• Recommendation: {}", recommendation),
    ]
    .join("\n"))
}

fn approve_recommendation(q: &Question<'_>) -> Result<String, ServiceError> {
    let Some(focused) = q.focused else {
        return Ok(HELP_MESSAGE.to_string());
    };
    let request = &focused.request;
    let (risk, recommendation) = discount_risk(request.discount_percentage);
    let action = if request.discount_percentage > COUNTER_OFFER_ABOVE {
        "Counter with 15% max"
    } else {
        "Approve as requested"
    };

    Ok([
        format!("**Recommendation for {}:**", focused.customer_name),
        format!("• Product: {} {}", request.product, request.grade),
        format!(
            "• Requested Discount: {}%",
            request.discount_percentage.normalize()
        ),
        format!("• Risk Level: {}", level(risk)),
        format!("• Recommendation: {}", recommendation),
        format!("• Suggested Action: {}", action),
    ]
    .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::seed;
    use crate::services::analytics::join_customers;
    use assert_matches::assert_matches;

    fn seeded_view() -> Vec<RequestWithCustomer> {
        let fixtures = seed::fixtures(1);
        join_customers(fixtures.discount_requests, &fixtures.customers)
    }

    fn focused(view: &[RequestWithCustomer], id: &str) -> RequestWithCustomer {
        view.iter().find(|r| r.request.id == id).cloned().unwrap()
    }

    #[test]
    fn formats_money_with_separators() {
        assert_eq!(format_omr(dec!(0)), "0");
        assert_eq!(format_omr(dec!(999.5)), "1,000");
        assert_eq!(format_omr(dec!(60625)), "60,625");
        assert_eq!(format_omr(dec!(1205000.4)), "1,205,000");
        assert_eq!(format_omr(dec!(-1500)), "-1,500");
    }

    #[test]
    fn total_impact_breaks_down_by_priority() {
        let view = seeded_view();
        let reply = respond("What's the TOTAL impact this month?", &view, None).unwrap();
        assert_eq!(reply.intent, Intent::TotalImpact);
        assert_eq!(
            reply.reply,
            [
                "**Total Margin Impact Analysis:**",
                "• All 3 requests: -OMR 172,165",
                "• High priority (1): -OMR 60,625",
                "• Medium priority (1): -OMR 59,040",
                "• Low priority (1): -OMR 52,500",
                "This represents 3.1% of monthly revenue.",
            ]
            .join("\n")
        );
    }

    #[test]
    fn product_performance_compares_to_benchmark() {
        let view = seeded_view();
        let reply = respond("How is wire rod performance?", &view, None).unwrap();
        assert_eq!(reply.intent, Intent::ProductPerformance);
        assert!(reply.reply.contains("Oman Avg Discount: 12.5%"));
        assert!(reply.reply.contains("12.5% avg discount across 1 request(s)"));
        assert!(reply.reply.contains("+0.0 pts"));

        let rebar = respond("rebar performance", &view, None).unwrap();
        assert!(rebar.reply.contains("-4.3 pts"));
    }

    #[test]
    fn product_performance_without_matches_does_not_divide_by_zero() {
        let view: Vec<_> = seeded_view()
            .into_iter()
            .filter(|r| r.request.product != Product::Billets)
            .collect();
        let reply = respond("billets performance", &view, None).unwrap();
        assert!(reply.reply.contains("No open Billets requests"));
    }

    #[test]
    fn performance_without_product_falls_through() {
        let reply = respond("overall performance", &seeded_view(), None).unwrap();
        assert_eq!(reply.intent, Intent::Help);
    }

    #[test]
    fn high_value_risk_sums_large_orders() {
        let reply = respond("Show risk for all high value deals", &seeded_view(), None).unwrap();
        assert_eq!(reply.intent, Intent::HighValueRisk);
        assert!(reply
            .reply
            .contains("• 2 requests above OMR 400K = OMR 1.21M total"));
        assert!(reply.reply.contains("Combined margin impact: -OMR 120K"));
        assert!(reply.reply.contains("Risk Level: MEDIUM"));
    }

    #[test]
    fn focused_intents_need_a_focused_request() {
        let reply = respond("what if we give 20%?", &seeded_view(), None).unwrap();
        assert_eq!(reply.intent, Intent::Help);
        assert_eq!(reply.reply, HELP_MESSAGE);
    }

    #[test]
    fn single_request_impact_at_stress_discount() {
        let view = seeded_view();
        let target = focused(&view, seed::ARABIAN_WIRE_REQUEST);
        let reply = respond("What if we give 20%?", &view, Some(&target)).unwrap();
        assert_eq!(reply.intent, Intent::SingleRequestImpact);
        assert!(reply.reply.contains("Arabian Steel Co."));
        assert!(reply.reply.contains("Requested 12.5% discount: -OMR 60,625"));
        assert!(reply.reply.contains("At 20% discount: -OMR 97,000"));
        assert!(reply.reply.contains("Risk Level: LOW"));
    }

    #[test]
    fn approve_recommendation_uses_breakpoints() {
        let mut view = seeded_view();
        view[2].request.discount_percentage = dec!(19);
        let target = view[2].clone();
        let reply = respond("Should I approve this?", &view, Some(&target)).unwrap();
        assert_eq!(reply.intent, Intent::ApproveRecommendation);
        assert!(reply.reply.contains("Risk Level: MEDIUM"));
        assert!(reply.reply.contains("Recommendation: Approve with conditions"));
        assert!(reply.reply.contains("Suggested Action: Counter with 15% max"));
    }

    #[test]
    fn earlier_rules_win() {
        let view = seeded_view();
        let target = focused(&view, seed::GULF_REBAR_REQUEST);
        let reply = respond("total margin impact", &view, Some(&target)).unwrap();
        assert_eq!(reply.intent, Intent::TotalImpact);
    }

    #[test]
    fn replies_are_deterministic() {
        let view = seeded_view();
        let target = focused(&view, seed::OMAN_BILLETS_REQUEST);
        for message in ["total impact", "risk high", "approve?", "hello"] {
            assert_eq!(
                respond(message, &view, Some(&target)).unwrap(),
                respond(message, &view, Some(&target)).unwrap()
            );
        }
    }

    #[test]
    fn overflowing_impact_is_an_error() {
        let mut view = seeded_view();
        view[0].request.order_value = Decimal::MAX;
        view[1].request.order_value = Decimal::MAX;
        let target = view[0].clone();

        assert_matches!(
            respond("total impact", &view, None),
            Err(ServiceError::InternalError(_))
        );
        assert_matches!(
            respond("high risk", &view, None),
            Err(ServiceError::InternalError(_))
        );
        assert_matches!(
            respond("margin at 20%?", &view, Some(&target)),
            Err(ServiceError::InternalError(_))
        );
    }

    #[test]
    fn intents_serialize_kebab_case() {
        assert_eq!(Intent::HighValueRisk.to_string(), "high-value-risk");
        assert_eq!(
            serde_json::to_value(Intent::ApproveRecommendation).unwrap(),
            "approve-recommendation"
        );
    }
}
