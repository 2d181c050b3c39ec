//! Retrieval Engine
//!
//! Produces a bounded, representative subset of bookings for a question's
//! category. One policy per category; each policy annotates its results
//! with a transient relevance score (5 for a direct category match, 3 for
//! padding, token-match count for the keyword fallback).
//!
//! Near-equal group sampling draws `floor(k / groups) + 1` per group and
//! truncates to `k`, which can under- or over-represent small groups. That
//! non-uniformity is inherited behavior, kept on purpose.

use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::grouping::GroupingCache;
use crate::types::{BookingRecord, Category, ScoredBooking, TimeFilter};

/// Relevance assigned to records the policy targeted directly.
const SCORE_DIRECT: u32 = 5;
/// Relevance assigned to backfill records kept for comparison.
const SCORE_PADDING: u32 = 3;

/// Lead-time bands (days) for stratified sampling.
const LEAD_TIME_BANDS: [(u32, u32); 5] =
    [(0, 7), (8, 30), (31, 90), (91, 365), (366, u32::MAX)];

const STOPWORDS: [&str; 20] = [
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "in", "on", "at", "to",
    "for", "with", "by", "about", "of", "from",
];

pub struct Retriever {
    records: Arc<[BookingRecord]>,
    groupings: Arc<GroupingCache>,
    config: SearchConfig,
}

impl Retriever {
    pub fn new(
        records: Arc<[BookingRecord]>,
        groupings: Arc<GroupingCache>,
        config: SearchConfig,
    ) -> Self {
        Self {
            records,
            groupings,
            config,
        }
    }

    /// Retrieve at most `k` bookings for a category. Never fails; an empty
    /// record set or an unmatched time filter yields an empty subset.
    pub fn retrieve(
        &self,
        category: Category,
        question: &str,
        filter: &TimeFilter,
        k: usize,
    ) -> Vec<ScoredBooking> {
        self.retrieve_with_rng(category, question, filter, k, &mut rand::rng())
    }

    /// Same as [`retrieve`](Self::retrieve) with caller-provided randomness,
    /// so sampling policies can be exercised deterministically.
    pub fn retrieve_with_rng(
        &self,
        category: Category,
        question: &str,
        filter: &TimeFilter,
        k: usize,
        rng: &mut impl Rng,
    ) -> Vec<ScoredBooking> {
        let results = match category {
            Category::Cancellation => self.by_cancellation(k),
            Category::LeadTime => self.by_lead_time(k, rng),
            Category::Revenue => self.by_revenue(filter, k),
            Category::Duration => self.by_duration(k),
            Category::Family => self.by_family(k),
            Category::Hotel => self.by_hotel(k, rng),
            Category::Country => self.by_country(k, rng),
            Category::Requests => self.by_requests(k, rng),
            Category::General => self.by_keywords(question, k),
        };
        tracing::debug!(
            category = %category,
            k = k,
            retrieved = results.len(),
            "Retrieval complete"
        );
        results
    }

    /// Prioritize canceled bookings, padding with non-canceled ones for
    /// comparison. Both halves keep store order.
    fn by_cancellation(&self, k: usize) -> Vec<ScoredBooking> {
        let canceled_quota = (k as f64 * self.config.cancellation_priority) as usize;

        let mut results: Vec<ScoredBooking> = self
            .records
            .iter()
            .filter(|r| r.is_canceled)
            .take(canceled_quota)
            .map(|r| scored(r, SCORE_DIRECT))
            .collect();

        let remaining = k.saturating_sub(results.len());
        results.extend(
            self.records
                .iter()
                .filter(|r| !r.is_canceled)
                .take(remaining)
                .map(|r| scored(r, SCORE_PADDING)),
        );

        results
    }

    /// Stratified sample across lead-time bands.
    fn by_lead_time(&self, k: usize, rng: &mut impl Rng) -> Vec<ScoredBooking> {
        let mut results = Vec::new();

        for (lo, hi) in LEAD_TIME_BANDS {
            let band: Vec<usize> = self
                .records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.lead_time >= lo && r.lead_time <= hi)
                .map(|(idx, _)| idx)
                .collect();
            if band.is_empty() {
                continue;
            }
            let sample_size = (k / LEAD_TIME_BANDS.len() + 1).min(band.len());
            for &idx in band.choose_multiple(rng, sample_size) {
                results.push(scored(&self.records[idx], SCORE_DIRECT));
            }
        }

        results.truncate(k);
        results
    }

    /// Time-filtered non-canceled bookings, or the top-ADR ones when the
    /// question names no period.
    fn by_revenue(&self, filter: &TimeFilter, k: usize) -> Vec<ScoredBooking> {
        if !filter.is_empty() {
            let mut results: Vec<ScoredBooking> = self
                .records
                .iter()
                .filter(|r| !r.is_canceled && filter.matches(r.arrival_date))
                .map(|r| scored(r, SCORE_DIRECT))
                .collect();
            results.truncate(k);
            return results;
        }

        let mut active: Vec<&BookingRecord> =
            self.records.iter().filter(|r| !r.is_canceled).collect();
        active.sort_by(|a, b| b.adr.partial_cmp(&a.adr).unwrap_or(std::cmp::Ordering::Equal));
        active
            .into_iter()
            .take(k)
            .map(|r| scored(r, SCORE_DIRECT))
            .collect()
    }

    /// Even index strides across bookings sorted by total nights, so the
    /// subset spans short and long stays instead of clustering.
    fn by_duration(&self, k: usize) -> Vec<ScoredBooking> {
        let mut with_nights: Vec<(usize, u32)> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.total_nights() > 0)
            .map(|(idx, r)| (idx, r.total_nights()))
            .collect();
        if with_nights.is_empty() || k == 0 {
            return Vec::new();
        }
        with_nights.sort_by_key(|&(_, nights)| nights);

        let step = (with_nights.len() / k).max(1);
        with_nights
            .iter()
            .step_by(step)
            .take(k)
            .map(|&(idx, _)| scored(&self.records[idx], SCORE_DIRECT))
            .collect()
    }

    /// Bookings with children or babies, padded with multi-adult bookings
    /// when too few exist. Discovery order is preserved.
    fn by_family(&self, k: usize) -> Vec<ScoredBooking> {
        let mut results: Vec<ScoredBooking> = self
            .records
            .iter()
            .filter(|r| r.has_children_or_babies())
            .take(k)
            .map(|r| scored(r, SCORE_DIRECT))
            .collect();

        let remaining = k.saturating_sub(results.len());
        if remaining > 0 {
            results.extend(
                self.records
                    .iter()
                    .filter(|r| r.adults > 1 && !r.has_children_or_babies())
                    .take(remaining)
                    .map(|r| scored(r, SCORE_PADDING)),
            );
        }

        results
    }

    /// Near-equal random sample from each hotel group.
    fn by_hotel(&self, k: usize, rng: &mut impl Rng) -> Vec<ScoredBooking> {
        let groups = self.groupings.by_hotel();
        if groups.is_empty() {
            return Vec::new();
        }
        let mut keys: Vec<&String> = groups.keys().collect();
        keys.sort();

        let mut results = Vec::new();
        for key in keys {
            let members = &groups[key];
            let sample_size = (k / groups.len() + 1).min(members.len());
            for &idx in members.choose_multiple(rng, sample_size) {
                results.push(scored(&self.records[idx], SCORE_DIRECT));
            }
        }
        results.truncate(k);
        results
    }

    /// Near-equal random sample from each of the top countries by booking
    /// count.
    fn by_country(&self, k: usize, rng: &mut impl Rng) -> Vec<ScoredBooking> {
        let groups = self.groupings.by_country();
        if groups.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(&String, &Vec<usize>)> = groups.iter().collect();
        ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        let included = self.config.top_countries.min(ranked.len());

        let mut results = Vec::new();
        for (_, members) in ranked.into_iter().take(included) {
            let sample_size = (k / included + 1).min(members.len());
            for &idx in members.choose_multiple(rng, sample_size) {
                results.push(scored(&self.records[idx], SCORE_DIRECT));
            }
        }
        results.truncate(k);
        results
    }

    /// Near-equal random sample from each distinct request-count bucket,
    /// lowest counts first.
    fn by_requests(&self, k: usize, rng: &mut impl Rng) -> Vec<ScoredBooking> {
        let groups = self.groupings.by_request_count();
        if groups.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        for members in groups.values() {
            let sample_size = (k / groups.len() + 1).min(members.len());
            for &idx in members.choose_multiple(rng, sample_size) {
                results.push(scored(&self.records[idx], SCORE_DIRECT));
            }
        }
        results.truncate(k);
        results
    }

    /// Fallback keyword search: score every booking by how many question
    /// tokens appear in its concatenated field values; zero-score records
    /// are excluded.
    fn by_keywords(&self, question: &str, k: usize) -> Vec<ScoredBooking> {
        let tokens = tokenize(question);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut matched: Vec<ScoredBooking> = self
            .records
            .iter()
            .filter_map(|record| {
                let text = record.full_text();
                let matches = tokens.iter().filter(|t| text.contains(t.as_str())).count() as u32;
                (matches > 0).then(|| scored(record, matches))
            })
            .collect();

        // Stable sort keeps store order among equal scores.
        matched.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        matched.truncate(k);
        matched
    }
}

fn scored(record: &BookingRecord, relevance_score: u32) -> ScoredBooking {
    ScoredBooking {
        booking: record.clone(),
        relevance_score,
    }
}

/// Lowercase, strip punctuation, drop stopwords.
fn tokenize(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(|t| t.to_string())
        .collect()
}
