//! Query History Audit Log
//!
//! External collaborator seam. A question is logged before any computation
//! so abandoned requests still leave a trace; the answer and the retrieved
//! booking ids are attached afterwards, best-effort. The engine never
//! deletes history.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::QueryHistoryRecord;

#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Record a question, returning its log identifier.
    async fn log_question(&self, question: &str) -> anyhow::Result<i64>;

    /// Attach the final answer and retrieved booking ids to an entry.
    async fn update_answer(
        &self,
        id: i64,
        answer: &str,
        relevant_booking_ids: &[i64],
    ) -> anyhow::Result<()>;

    /// Most-recent-first slice of the history.
    async fn list_recent(&self, limit: usize) -> anyhow::Result<Vec<QueryHistoryRecord>>;
}

/// Process-local audit log. Stands in for the relational collaborator in
/// tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryAuditLog {
    next_id: AtomicI64,
    entries: RwLock<Vec<QueryHistoryRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn log_question(&self, question: &str) -> anyhow::Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.write().push(QueryHistoryRecord {
            id,
            question: question.to_string(),
            answer: None,
            timestamp: Utc::now(),
            relevant_booking_ids: Vec::new(),
        });
        Ok(id)
    }

    async fn update_answer(
        &self,
        id: i64,
        answer: &str,
        relevant_booking_ids: &[i64],
    ) -> anyhow::Result<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| anyhow::anyhow!("no history entry with id {}", id))?;
        entry.answer = Some(answer.to_string());
        entry.relevant_booking_ids = relevant_booking_ids.to_vec();
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> anyhow::Result<Vec<QueryHistoryRecord>> {
        let entries = self.entries.read();
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}

/// Audit log that rejects every write. Used to exercise the facade's
/// degrade-gracefully path.
#[cfg(test)]
pub struct FailingAuditLog;

#[cfg(test)]
#[async_trait]
impl AuditLog for FailingAuditLog {
    async fn log_question(&self, _question: &str) -> anyhow::Result<i64> {
        anyhow::bail!("audit log unavailable")
    }

    async fn update_answer(&self, _id: i64, _answer: &str, _ids: &[i64]) -> anyhow::Result<()> {
        anyhow::bail!("audit log unavailable")
    }

    async fn list_recent(&self, _limit: usize) -> anyhow::Result<Vec<QueryHistoryRecord>> {
        anyhow::bail!("audit log unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_then_update() {
        let log = InMemoryAuditLog::new();
        let id = log.log_question("What is the cancellation rate?").await.unwrap();
        log.update_answer(id, "The rate is 37.00%.", &[3, 7]).await.unwrap();

        let recent = log.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
        assert_eq!(recent[0].answer.as_deref(), Some("The rate is 37.00%."));
        assert_eq!(recent[0].relevant_booking_ids, vec![3, 7]);
    }

    #[tokio::test]
    async fn test_list_recent_is_most_recent_first() {
        let log = InMemoryAuditLog::new();
        for i in 0..5 {
            log.log_question(&format!("question {}", i)).await.unwrap();
        }
        let recent = log.list_recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].question, "question 4");
        assert_eq!(recent[2].question, "question 2");
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails() {
        let log = InMemoryAuditLog::new();
        assert!(log.update_answer(99, "answer", &[]).await.is_err());
    }
}
