use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One hotel booking record. Loaded once at startup and treated as
/// read-only by the engine; the full set is shared as `Arc<[BookingRecord]>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub hotel: String,
    #[serde(default)]
    pub is_canceled: bool,
    #[serde(default)]
    pub lead_time: u32,
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub stays_in_weekend_nights: u32,
    #[serde(default)]
    pub stays_in_week_nights: u32,
    #[serde(default)]
    pub adults: u32,
    #[serde(default)]
    pub children: Option<u32>,
    #[serde(default)]
    pub babies: Option<u32>,
    #[serde(default)]
    pub meal: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub market_segment: String,
    #[serde(default)]
    pub distribution_channel: String,
    #[serde(default)]
    pub is_repeated_guest: bool,
    #[serde(default)]
    pub previous_cancellations: u32,
    #[serde(default)]
    pub previous_bookings_not_canceled: u32,
    #[serde(default)]
    pub reserved_room_type: String,
    #[serde(default)]
    pub assigned_room_type: String,
    #[serde(default)]
    pub booking_changes: u32,
    #[serde(default)]
    pub deposit_type: String,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub days_in_waiting_list: u32,
    #[serde(default)]
    pub customer_type: String,
    #[serde(default)]
    pub adr: f64,
    #[serde(default)]
    pub required_car_parking_spaces: u32,
    #[serde(default)]
    pub total_of_special_requests: u32,
    #[serde(default)]
    pub reservation_status: String,
    #[serde(default)]
    pub reservation_status_date: Option<NaiveDate>,
}

impl BookingRecord {
    /// Weekend plus weekday nights.
    pub fn total_nights(&self) -> u32 {
        self.stays_in_weekend_nights + self.stays_in_week_nights
    }

    pub fn children(&self) -> u32 {
        self.children.unwrap_or(0)
    }

    pub fn babies(&self) -> u32 {
        self.babies.unwrap_or(0)
    }

    pub fn has_children_or_babies(&self) -> bool {
        self.children() > 0 || self.babies() > 0
    }

    pub fn hotel_or_unknown(&self) -> &str {
        if self.hotel.is_empty() {
            "Unknown"
        } else {
            &self.hotel
        }
    }

    pub fn country_or_unknown(&self) -> &str {
        match self.country.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => "Unknown",
        }
    }

    /// Revenue realized by this booking (average daily rate times nights).
    pub fn revenue(&self) -> f64 {
        self.adr * f64::from(self.total_nights())
    }

    /// Every field value except `id`, concatenated and lowercased.
    /// Used by the keyword-matching fallback search.
    pub fn full_text(&self) -> String {
        let mut text = String::new();
        let _ = write!(
            text,
            "{} {} {} ",
            self.hotel,
            self.is_canceled,
            self.lead_time,
        );
        if let Some(date) = self.arrival_date {
            let _ = write!(text, "{} ", date);
        }
        let _ = write!(
            text,
            "{} {} {} {} {} {} ",
            self.stays_in_weekend_nights,
            self.stays_in_week_nights,
            self.adults,
            self.children(),
            self.babies(),
            self.meal,
        );
        if let Some(country) = &self.country {
            let _ = write!(text, "{} ", country);
        }
        let _ = write!(
            text,
            "{} {} {} {} {} {} {} {} ",
            self.market_segment,
            self.distribution_channel,
            self.is_repeated_guest,
            self.previous_cancellations,
            self.previous_bookings_not_canceled,
            self.reserved_room_type,
            self.assigned_room_type,
            self.booking_changes,
        );
        let _ = write!(text, "{} ", self.deposit_type);
        if let Some(agent) = &self.agent {
            let _ = write!(text, "{} ", agent);
        }
        if let Some(company) = &self.company {
            let _ = write!(text, "{} ", company);
        }
        let _ = write!(
            text,
            "{} {} {} {} {} {}",
            self.days_in_waiting_list,
            self.customer_type,
            self.adr,
            self.required_car_parking_spaces,
            self.total_of_special_requests,
            self.reservation_status,
        );
        if let Some(date) = self.reservation_status_date {
            let _ = write!(text, " {}", date);
        }
        text.to_lowercase()
    }
}

/// Topic category assigned to a question. Drives both the retrieval policy
/// and the answer template. Declaration order is the classification
/// tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cancellation,
    LeadTime,
    Revenue,
    Duration,
    Family,
    Hotel,
    Country,
    Requests,
    General,
}

impl Category {
    /// All categories in declaration (tie-break) order.
    pub const ALL: [Category; 9] = [
        Category::Cancellation,
        Category::LeadTime,
        Category::Revenue,
        Category::Duration,
        Category::Family,
        Category::Hotel,
        Category::Country,
        Category::Requests,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cancellation => "cancellation",
            Category::LeadTime => "lead_time",
            Category::Revenue => "revenue",
            Category::Duration => "duration",
            Category::Family => "family",
            Category::Hotel => "hotel",
            Category::Country => "country",
            Category::Requests => "requests",
            Category::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional month/year constraint parsed from question text.
/// Absent fields mean "unconstrained".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl TimeFilter {
    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.year.is_none()
    }

    /// Whether a booking's arrival date satisfies the filter.
    /// A record without an arrival date never matches a non-empty filter.
    pub fn matches(&self, arrival: Option<NaiveDate>) -> bool {
        use chrono::Datelike;
        if self.is_empty() {
            return true;
        }
        let Some(date) = arrival else {
            return false;
        };
        if let Some(year) = self.year {
            if date.year() != year {
                return false;
            }
        }
        if let Some(month) = self.month {
            if date.month() != month {
                return false;
            }
        }
        true
    }
}

/// A retrieved booking with its transient relevance annotation.
/// The score reflects the retrieval policy's confidence and is never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredBooking {
    #[serde(flatten)]
    pub booking: BookingRecord,
    pub relevance_score: u32,
}

/// Result of answering one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResponse {
    pub question: String,
    pub answer: String,
    pub relevant_bookings: Vec<ScoredBooking>,
    pub category: Category,
}

/// One entry of the question audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHistoryRecord {
    pub id: i64,
    pub question: String,
    pub answer: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub relevant_booking_ids: Vec<i64>,
}

/// Health probe payload: whether the in-memory record set is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub records_loaded: bool,
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_nights_and_revenue() {
        let booking = BookingRecord {
            stays_in_weekend_nights: 2,
            stays_in_week_nights: 3,
            adr: 100.0,
            ..Default::default()
        };
        assert_eq!(booking.total_nights(), 5);
        assert!((booking.revenue() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_time_filter_matches() {
        let date = NaiveDate::from_ymd_opt(2017, 7, 14);
        let filter = TimeFilter {
            month: Some(7),
            year: Some(2017),
        };
        assert!(filter.matches(date));
        assert!(!filter.matches(NaiveDate::from_ymd_opt(2017, 8, 14)));
        assert!(!filter.matches(NaiveDate::from_ymd_opt(2016, 7, 14)));
        assert!(!filter.matches(None));
        assert!(TimeFilter::default().matches(None));
    }

    #[test]
    fn test_full_text_contains_field_values() {
        let booking = BookingRecord {
            id: 42,
            hotel: "Resort Hotel".to_string(),
            country: Some("PRT".to_string()),
            deposit_type: "No Deposit".to_string(),
            ..Default::default()
        };
        let text = booking.full_text();
        assert!(text.contains("resort hotel"));
        assert!(text.contains("prt"));
        assert!(text.contains("no deposit"));
        assert!(!text.contains("42"));
    }

    #[test]
    fn test_unknown_sentinels() {
        let booking = BookingRecord::default();
        assert_eq!(booking.hotel_or_unknown(), "Unknown");
        assert_eq!(booking.country_or_unknown(), "Unknown");
    }
}
