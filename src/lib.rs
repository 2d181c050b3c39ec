pub mod analytics;
pub mod answer;
pub mod audit;
pub mod cache;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod retrieval;
pub mod stats;
pub mod store;
pub mod types;

// Re-export primary types for convenience
pub use audit::{AuditLog, InMemoryAuditLog};
pub use config::QaConfig;
pub use engine::QaEngine;
pub use error::QaError;
pub use store::{InMemorySource, JsonSnapshotSource, RecordSource};
pub use types::{
    BookingRecord, Category, HealthStatus, QaResponse, QueryHistoryRecord, ScoredBooking,
    TimeFilter,
};

// Re-export common types
pub use anyhow::{Error, Result};
