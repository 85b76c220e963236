pub mod analytics;
pub mod assistant;
pub mod common;
pub mod customers;
pub mod dashboard;
pub mod discount_requests;
pub mod regional;

use slog::Logger;
use std::sync::Arc;

use crate::repositories::Storage;
use crate::services::{analytics::AnalyticsService, review::ReviewService};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub review: Arc<ReviewService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppServices {
    pub fn new(storage: Arc<dyn Storage>, base_logger: Logger) -> Self {
        let audit_logger = crate::logging::audit_logger(&base_logger);
        Self {
            review: Arc::new(ReviewService::new(storage.clone(), audit_logger)),
            analytics: Arc::new(AnalyticsService::new(storage)),
        }
    }
}
