// Pure pipeline: filtering, aggregation, assistant replies
pub mod analytics;
pub mod assistant;
pub mod filter;

// Decisions against the store
pub mod review;
