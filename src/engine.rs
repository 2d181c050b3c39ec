//! QA Engine
//!
//! The session facade. Construction loads the full record set once and
//! wires up groupings, retrieval, and the query cache; after that the
//! engine answers questions without touching the backing store again.
//!
//! Answering is infallible by design: every internal miss degrades to a
//! fixed fallback sentence, and audit-log failures are logged and swallowed
//! so history never blocks an answer.

use std::sync::Arc;

use tracing::{info, warn};

use crate::answer;
use crate::audit::AuditLog;
use crate::cache::QueryCache;
use crate::classify;
use crate::config::QaConfig;
use crate::error::QaError;
use crate::grouping::GroupingCache;
use crate::retrieval::Retriever;
use crate::store::RecordSource;
use crate::types::{BookingRecord, HealthStatus, QaResponse, QueryHistoryRecord};

pub struct QaEngine {
    records: Arc<[BookingRecord]>,
    groupings: Arc<GroupingCache>,
    retriever: Retriever,
    cache: QueryCache,
    audit: Arc<dyn AuditLog>,
    config: QaConfig,
}

impl QaEngine {
    /// Load all records from `source` and build the engine. A source
    /// failure is fatal; an empty record set is not, the engine then
    /// answers every question with the no-data sentence.
    pub fn new(
        config: QaConfig,
        source: &dyn RecordSource,
        audit: Arc<dyn AuditLog>,
    ) -> Result<Self, QaError> {
        config.validate().map_err(QaError::Config)?;

        let records: Arc<[BookingRecord]> = source.load_all()?.into();
        if records.is_empty() {
            warn!("Record source returned no bookings; all answers will report no data");
        } else {
            info!(count = records.len(), "Booking records loaded");
        }

        let groupings = Arc::new(GroupingCache::new(Arc::clone(&records)));
        groupings.precompute();

        let retriever = Retriever::new(
            Arc::clone(&records),
            Arc::clone(&groupings),
            config.search.clone(),
        );
        let cache = QueryCache::new(config.cache.query_cache_capacity);

        Ok(Self {
            records,
            groupings,
            retriever,
            cache,
            audit,
            config,
        })
    }

    /// Answer a question end to end: audit, cache lookup, classify,
    /// retrieve, generate, cache fill, audit update.
    pub async fn answer_question(&self, question: &str) -> QaResponse {
        let audit_id = match self.audit.log_question(question).await {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(error = %error, "Failed to record question in audit log");
                None
            }
        };

        let response = match self.cache.get(question) {
            Some(cached) => {
                info!(question = question, "Query cache hit");
                cached
            }
            None => {
                let category = classify::classify(question);
                let filter = classify::extract_time_filter(question);
                let subset = self.retriever.retrieve(
                    category,
                    question,
                    &filter,
                    self.config.search.default_k,
                );
                let answer = answer::generate(
                    category,
                    question,
                    &subset,
                    &self.records,
                    &self.config.answer,
                );
                info!(
                    question = question,
                    category = %category,
                    retrieved = subset.len(),
                    "Question answered"
                );

                let response = QaResponse {
                    question: question.to_string(),
                    answer,
                    relevant_bookings: subset,
                    category,
                };
                self.cache.put(question, response.clone());
                response
            }
        };

        if let Some(id) = audit_id {
            let booking_ids: Vec<i64> = response
                .relevant_bookings
                .iter()
                .map(|s| s.booking.id)
                .collect();
            if let Err(error) = self
                .audit
                .update_answer(id, &response.answer, &booking_ids)
                .await
            {
                warn!(error = %error, id = id, "Failed to attach answer to audit log");
            }
        }

        response
    }

    /// Most-recent-first question history.
    pub async fn get_history(&self, limit: usize) -> anyhow::Result<Vec<QueryHistoryRecord>> {
        self.audit.list_recent(limit).await
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            records_loaded: !self.records.is_empty(),
            record_count: self.records.len(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Drop and lazily rebuild the grouping partitions.
    pub fn reset_groupings(&self) {
        self.groupings.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{FailingAuditLog, InMemoryAuditLog};
    use crate::store::InMemorySource;
    use crate::types::Category;

    fn sample_records() -> Vec<BookingRecord> {
        let mut records = Vec::new();
        for i in 0..20 {
            records.push(BookingRecord {
                id: i,
                hotel: if i % 2 == 0 { "City Hotel" } else { "Resort Hotel" }.to_string(),
                is_canceled: i < 8,
                lead_time: (i as u32) * 10,
                stays_in_week_nights: 2,
                adr: 75.0 + i as f64,
                deposit_type: "No Deposit".to_string(),
                country: Some("PRT".to_string()),
                ..Default::default()
            });
        }
        records
    }

    fn engine_with(records: Vec<BookingRecord>, audit: Arc<dyn AuditLog>) -> QaEngine {
        let source = InMemorySource::new(records);
        QaEngine::new(QaConfig::default(), &source, audit).unwrap()
    }

    #[tokio::test]
    async fn test_answer_question_populates_audit_log() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let engine = engine_with(sample_records(), audit.clone());

        let response = engine.answer_question("Why do guests cancel?").await;
        assert_eq!(response.category, Category::Cancellation);
        assert!(!response.answer.is_empty());
        assert!(!response.relevant_bookings.is_empty());

        let history = engine.get_history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "Why do guests cancel?");
        assert_eq!(history[0].answer.as_deref(), Some(response.answer.as_str()));
        assert!(!history[0].relevant_booking_ids.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_question_is_served_from_cache() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let engine = engine_with(sample_records(), audit.clone());

        let first = engine.answer_question("Which hotel is popular?").await;
        let second = engine.answer_question("Which hotel is popular?").await;

        // Sampling-based retrieval would differ between runs; identical
        // booking lists prove the second response came from the cache.
        let first_ids: Vec<i64> = first.relevant_bookings.iter().map(|s| s.booking.id).collect();
        let second_ids: Vec<i64> = second.relevant_bookings.iter().map(|s| s.booking.id).collect();
        assert_eq!(first.answer, second.answer);
        assert_eq!(first_ids, second_ids);

        // Both asks are audited even though only one was computed.
        let history = engine.get_history(10).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_block_answers() {
        let engine = engine_with(sample_records(), Arc::new(FailingAuditLog));
        let response = engine.answer_question("What is the cancellation rate?").await;
        assert_eq!(response.category, Category::Cancellation);
        assert!(response.answer.contains("%"));
    }

    #[tokio::test]
    async fn test_empty_record_set_answers_no_data() {
        let audit = Arc::new(InMemoryAuditLog::new());
        let engine = engine_with(Vec::new(), audit);

        let health = engine.health();
        assert!(!health.records_loaded);
        assert_eq!(health.record_count, 0);

        let response = engine.answer_question("How long do guests stay?").await;
        assert_eq!(
            response.answer,
            "I don't have any booking information to answer this question."
        );
        assert!(response.relevant_bookings.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = QaConfig::default();
        config.search.default_k = 0;
        let source = InMemorySource::new(sample_records());
        let result = QaEngine::new(config, &source, Arc::new(InMemoryAuditLog::new()));
        assert!(matches!(result, Err(QaError::Config(_))));
    }

    #[tokio::test]
    async fn test_health_reports_loaded_records() {
        let engine = engine_with(sample_records(), Arc::new(InMemoryAuditLog::new()));
        let health = engine.health();
        assert!(health.records_loaded);
        assert_eq!(health.record_count, 20);
        assert_eq!(engine.record_count(), 20);
    }

    #[tokio::test]
    async fn test_reset_groupings_keeps_answers_working() {
        let engine = engine_with(sample_records(), Arc::new(InMemoryAuditLog::new()));
        engine.reset_groupings();
        let response = engine.answer_question("Which country do guests come from?").await;
        assert_eq!(response.category, Category::Country);
        assert!(!response.relevant_bookings.is_empty());
    }
}
