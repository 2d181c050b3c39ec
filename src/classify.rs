//! Category Classifier
//!
//! Keyword-scored classification of free-text questions into a closed set
//! of topic categories, plus month/year extraction. Both are pure functions
//! of the input text and static tables.

use std::sync::LazyLock;

use crate::types::{Category, TimeFilter};

static YEAR_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\b(20\d{2})\b").expect("year regex is valid"));

/// Keyword table, one row per non-general category, in tie-break order.
const KEYWORDS: [(Category, &[&str]); 8] = [
    (Category::Cancellation, &["cancel", "cancellation", "canceled"]),
    (Category::LeadTime, &["lead", "advance", "booking time", "booked"]),
    (Category::Revenue, &["revenue", "income", "adr", "money", "profit", "earn"]),
    (Category::Duration, &["stay", "night", "duration", "length"]),
    (Category::Family, &["family", "child", "children", "baby", "babies", "adult"]),
    (Category::Hotel, &["hotel", "resort", "property", "accommodation"]),
    (Category::Country, &["country", "nation", "nationality", "origin"]),
    (Category::Requests, &["request", "special", "requirement", "needs"]),
];

/// Month names and abbreviations, scanned in order; first match wins.
/// "may" appears only once since name and abbreviation coincide.
const MONTHS: [(&str, u32); 23] = [
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Assign exactly one category to a question.
///
/// Each category scores one point per keyword found as a case-insensitive
/// substring. The strictly highest nonzero score wins; ties break to the
/// first-declared category. Zero everywhere yields `General`.
pub fn classify(question: &str) -> Category {
    let question_lower = question.to_lowercase();

    let mut best = Category::General;
    let mut best_score = 0usize;

    for (category, keywords) in KEYWORDS {
        let score = keywords
            .iter()
            .filter(|kw| question_lower.contains(*kw))
            .count();
        if score > best_score {
            best = category;
            best_score = score;
        }
    }

    best
}

/// Extract an optional month/year constraint from question text.
///
/// At most one month (literal English name or abbreviation, first substring
/// match wins) and one year (`20xx`) are extracted, independent of category
/// scoring.
pub fn extract_time_filter(question: &str) -> TimeFilter {
    let question_lower = question.to_lowercase();

    let month = MONTHS
        .iter()
        .find(|(name, _)| question_lower.contains(name))
        .map(|&(_, number)| number);

    let year = YEAR_RE
        .captures(&question_lower)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok());

    TimeFilter { month, year }
}

/// Full month name for a 1-based month number, for answer phrasing.
pub fn month_name(month: u32) -> Option<&'static str> {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    NAMES.get(month.checked_sub(1)? as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_category_has_a_winning_question() {
        let cases = [
            ("What is the cancellation rate?", Category::Cancellation),
            ("How far in advance do guests book?", Category::LeadTime),
            ("What was the total revenue in July?", Category::Revenue),
            ("How long do guests stay on average?", Category::Duration),
            ("How many bookings include children?", Category::Family),
            ("Which resort gets the most visitors?", Category::Hotel),
            ("What nationality are most guests?", Category::Country),
            ("How many special requests are typical?", Category::Requests),
        ];
        for (question, expected) in cases {
            assert_eq!(classify(question), expected, "question: {}", question);
        }
    }

    #[test]
    fn test_no_keywords_defaults_to_general() {
        assert_eq!(classify("Tell me something interesting"), Category::General);
        assert_eq!(classify(""), Category::General);
    }

    #[test]
    fn test_tie_breaks_to_first_declared_category() {
        // "cancel" (cancellation) and "lead" (lead_time) each score one;
        // cancellation is declared first.
        assert_eq!(classify("cancel lead"), Category::Cancellation);
    }

    #[test]
    fn test_higher_score_beats_declaration_order() {
        // "lead" + "advance" outscore the single "cancel" hit.
        assert_eq!(classify("cancel lead advance"), Category::LeadTime);
    }

    #[test]
    fn test_substring_matching_is_case_insensitive() {
        assert_eq!(classify("CANCELLATION trends"), Category::Cancellation);
    }

    #[test]
    fn test_extract_month_and_year() {
        let filter = extract_time_filter("Total revenue for July 2017");
        assert_eq!(filter.month, Some(7));
        assert_eq!(filter.year, Some(2017));
    }

    #[test]
    fn test_extract_abbreviated_month() {
        let filter = extract_time_filter("bookings in dec");
        assert_eq!(filter.month, Some(12));
        assert_eq!(filter.year, None);
    }

    #[test]
    fn test_first_month_match_wins() {
        let filter = extract_time_filter("compare january and june");
        assert_eq!(filter.month, Some(1));
    }

    #[test]
    fn test_year_requires_four_digits() {
        assert!(extract_time_filter("revenue in 201").is_empty());
        assert_eq!(extract_time_filter("revenue in 2016").year, Some(2016));
    }

    #[test]
    fn test_no_time_info() {
        assert!(extract_time_filter("average stay length").is_empty());
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(7), Some("July"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
