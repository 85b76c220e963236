//! Prometheus counters for review decisions and assistant traffic, exported
//! in text format at `/metrics`.

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("Metrics output was not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

lazy_static! {
    pub static ref DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "discount_request_decisions_total",
        "Discount request status updates applied, by resulting status",
        &["status"]
    )
    .expect("metric can be created");
    pub static ref REFUSED_TRANSITIONS_TOTAL: IntCounter = register_int_counter!(
        "discount_request_refused_transitions_total",
        "Status updates refused because the request was already decided"
    )
    .expect("metric can be created");
    pub static ref ASSISTANT_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "assistant_queries_total",
        "Assistant questions answered, by matched intent",
        &["intent"]
    )
    .expect("metric can be created");
}

/// Forces registration so that every series shows up before its first increment.
pub fn init() {
    lazy_static::initialize(&DECISIONS_TOTAL);
    lazy_static::initialize(&REFUSED_TRANSITIONS_TOTAL);
    lazy_static::initialize(&ASSISTANT_QUERIES_TOTAL);
}

pub fn record_decision(status: &str) {
    DECISIONS_TOTAL.with_label_values(&[status]).inc();
}

pub fn record_refused_transition() {
    REFUSED_TRANSITIONS_TOTAL.inc();
}

pub fn record_assistant_query(intent: &str) {
    ASSISTANT_QUERIES_TOTAL.with_label_values(&[intent]).inc();
}

/// Renders the default registry in the Prometheus text format.
pub async fn metrics_handler() -> Result<String, MetricsError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exported_text_contains_recorded_series() {
        init();
        record_decision("approved");
        record_assistant_query("total-impact");

        let body = metrics_handler().await.unwrap();
        assert!(body.contains("discount_request_decisions_total"));
        assert!(body.contains("assistant_queries_total"));
    }
}
