//! Answer Generator
//!
//! Turns a retrieved subset into a templated natural-language answer. Each
//! category has its own renderer; secondary keyword checks on the question
//! (the trigger lists in `AnswerConfig`) decide when a renderer answers
//! from the whole record set instead of the subset — global-rate questions
//! must be answered from the full population, not a five-record sample.
//!
//! Generation is deterministic: the same category/question/subset always
//! produces the identical string.

use std::fmt::Write as _;

use crate::classify;
use crate::config::AnswerConfig;
use crate::stats;
use crate::types::{BookingRecord, Category, ScoredBooking};

const NO_DATA: &str = "I don't have any booking information to answer this question.";

pub fn generate(
    category: Category,
    question: &str,
    subset: &[ScoredBooking],
    all_records: &[BookingRecord],
    config: &AnswerConfig,
) -> String {
    if subset.is_empty() {
        return NO_DATA.to_string();
    }

    let question_lower = question.to_lowercase();
    match category {
        Category::Cancellation => cancellation(&question_lower, subset, all_records, config),
        Category::LeadTime => lead_time(&question_lower, subset, config),
        Category::Revenue => revenue(&question_lower, subset, config),
        Category::Duration => duration(&question_lower, subset, config),
        Category::Family => family(&question_lower, subset, all_records, config),
        Category::Hotel => hotel(&question_lower, subset, all_records, config),
        Category::Country => country(&question_lower, subset, all_records, config),
        Category::Requests => requests(&question_lower, subset, all_records, config),
        Category::General => {
            "Based on the booking data, I found some related information, but I'm not sure how to \
             answer your specific question."
                .to_string()
        }
    }
}

fn triggered(question_lower: &str, triggers: &[String]) -> bool {
    triggers.iter().any(|t| question_lower.contains(t.as_str()))
}

fn cancellation(
    question_lower: &str,
    subset: &[ScoredBooking],
    all_records: &[BookingRecord],
    config: &AnswerConfig,
) -> String {
    if triggered(question_lower, &config.cancellation_global_triggers) {
        let all_total = all_records.len();
        let all_canceled = all_records.iter().filter(|r| r.is_canceled).count();
        let rate = if all_total > 0 {
            all_canceled as f64 / all_total as f64 * 100.0
        } else {
            0.0
        };
        return format!(
            "I found that the overall cancellation rate is {:.2}%. Out of {} bookings, {} were \
             canceled.",
            rate, all_total, all_canceled
        );
    }

    let total = subset.len();
    let canceled: Vec<&BookingRecord> = subset
        .iter()
        .map(|s| &s.booking)
        .filter(|b| b.is_canceled)
        .collect();

    if canceled.is_empty() {
        return "I haven't found any canceled bookings in the sample. This suggests a low \
                cancellation rate, but I would need to analyze more data to give you a precise \
                cancellation rate."
            .to_string();
    }

    let lead_times: Vec<f64> = canceled.iter().map(|b| f64::from(b.lead_time)).collect();
    let most_common_deposit =
        stats::most_common(canceled.iter().map(|b| b.deposit_type.as_str()))
            .unwrap_or("Unknown");

    format!(
        "I found that out of {} bookings, {} were canceled ({:.2}%). The average lead time for \
         canceled bookings was {:.1} days. The most common deposit type for canceled bookings \
         was '{}'.",
        total,
        canceled.len(),
        canceled.len() as f64 / total as f64 * 100.0,
        stats::mean(&lead_times),
        most_common_deposit
    )
}

fn lead_time(question_lower: &str, subset: &[ScoredBooking], config: &AnswerConfig) -> String {
    let lead_times: Vec<f64> = subset
        .iter()
        .map(|s| f64::from(s.booking.lead_time))
        .collect();
    let avg = stats::mean(&lead_times);

    if triggered(question_lower, &config.average_triggers) {
        return format!("The average lead time for bookings is {:.1} days.", avg);
    }

    let mut result = format!(
        "Based on the booking data, the average lead time is {:.1} days, with a median of {:.1} \
         days. ",
        avg,
        stats::median(&lead_times)
    );

    let by_hotel = per_hotel_values(subset, |b| Some(f64::from(b.lead_time)));
    if !by_hotel.is_empty() {
        let parts: Vec<String> = by_hotel
            .iter()
            .map(|(hotel, values)| format!("{}: {:.1} days", hotel, stats::mean(values)))
            .collect();
        let _ = write!(result, "Average lead times by hotel type: {}.", parts.join(", "));
    }

    result
}

fn revenue(question_lower: &str, subset: &[ScoredBooking], config: &AnswerConfig) -> String {
    let active: Vec<&BookingRecord> = subset
        .iter()
        .map(|s| &s.booking)
        .filter(|b| !b.is_canceled)
        .collect();

    if active.is_empty() {
        return "I couldn't find any revenue information from completed bookings.".to_string();
    }

    let revenues: Vec<f64> = active.iter().map(|b| b.revenue()).collect();
    let total: f64 = revenues.iter().sum();
    let avg = stats::mean(&revenues);

    // Rebuild the period phrase from the question so the answer echoes
    // whatever month/year the caller asked about.
    let filter = classify::extract_time_filter(question_lower);
    let mut period = String::new();
    if let Some(name) = filter.month.and_then(classify::month_name) {
        let _ = write!(period, " for {}", name);
    }
    if let Some(year) = filter.year {
        if filter.month.is_some() {
            let _ = write!(period, " {}", year);
        } else {
            let _ = write!(period, " for {}", year);
        }
    }

    let symbol = &config.currency_symbol;
    if triggered(question_lower, &config.total_triggers) {
        return format!(
            "The total revenue{} from the analyzed bookings is {}{:.2}.",
            period, symbol, total
        );
    }

    format!(
        "Based on {} analyzed bookings{}, the total revenue is {}{:.2}, with an average of \
         {}{:.2} per booking.",
        active.len(),
        period,
        symbol,
        total,
        symbol,
        avg
    )
}

fn duration(question_lower: &str, subset: &[ScoredBooking], config: &AnswerConfig) -> String {
    let staying: Vec<&BookingRecord> = subset
        .iter()
        .map(|s| &s.booking)
        .filter(|b| b.total_nights() > 0)
        .collect();

    if staying.is_empty() {
        return "I couldn't find any information about stay durations in the booking data."
            .to_string();
    }

    let totals: Vec<f64> = staying.iter().map(|b| f64::from(b.total_nights())).collect();
    let avg_total = stats::mean(&totals);

    if triggered(question_lower, &config.average_triggers) {
        let weekend: Vec<f64> = staying
            .iter()
            .map(|b| f64::from(b.stays_in_weekend_nights))
            .collect();
        let weekday: Vec<f64> = staying
            .iter()
            .map(|b| f64::from(b.stays_in_week_nights))
            .collect();
        return format!(
            "The average length of stay is {:.1} nights, comprising {:.1} weekday nights and \
             {:.1} weekend nights.",
            avg_total,
            stats::mean(&weekday),
            stats::mean(&weekend)
        );
    }

    let most_common_nights =
        stats::most_common(staying.iter().map(|b| b.total_nights())).unwrap_or(0);
    let mut result = format!(
        "Based on the booking data, the average length of stay is {:.1} nights. The most common \
         stay duration is {} nights.",
        avg_total, most_common_nights
    );

    let by_hotel = per_hotel_refs(&staying, |b| Some(f64::from(b.total_nights())));
    if !by_hotel.is_empty() {
        let parts: Vec<String> = by_hotel
            .iter()
            .map(|(hotel, values)| format!("{}: {:.1} nights", hotel, stats::mean(values)))
            .collect();
        let _ = write!(result, " Average stay by hotel type: {}.", parts.join(", "));
    }

    result
}

fn family(
    question_lower: &str,
    subset: &[ScoredBooking],
    all_records: &[BookingRecord],
    config: &AnswerConfig,
) -> String {
    if triggered(question_lower, &config.family_global_triggers) {
        let all_total = all_records.len();
        let with_children = all_records.iter().filter(|r| r.children() > 0).count();
        let with_babies = all_records.iter().filter(|r| r.babies() > 0).count();
        let pct = |count: usize| {
            if all_total > 0 {
                count as f64 / all_total as f64 * 100.0
            } else {
                0.0
            }
        };
        return format!(
            "Out of {} bookings, {} ({:.2}%) include children and {} ({:.2}%) include babies.",
            all_total,
            with_children,
            pct(with_children),
            with_babies,
            pct(with_babies)
        );
    }

    let total = subset.len();
    let with_children = subset.iter().filter(|s| s.booking.children() > 0).count();
    let with_babies = subset.iter().filter(|s| s.booking.babies() > 0).count();

    let family_bookings: Vec<&BookingRecord> = subset
        .iter()
        .map(|s| &s.booking)
        .filter(|b| b.has_children_or_babies())
        .collect();
    let most_common_hotel =
        stats::most_common(family_bookings.iter().map(|b| b.hotel_or_unknown()))
            .unwrap_or("Unknown");
    let most_common_room =
        stats::most_common(family_bookings.iter().map(|b| b.reserved_room_type.as_str()))
            .unwrap_or("Unknown");

    format!(
        "Looking at {} bookings, {} include children and {} include babies. Families most \
         commonly stay at '{}' hotel, and the most popular room type for families is '{}'.",
        total, with_children, with_babies, most_common_hotel, most_common_room
    )
}

fn hotel(
    question_lower: &str,
    subset: &[ScoredBooking],
    all_records: &[BookingRecord],
    config: &AnswerConfig,
) -> String {
    if triggered(question_lower, &config.hotel_global_triggers) {
        let top = stats::top_counts(all_records.iter().map(|r| r.hotel_or_unknown()), 3);
        let parts: Vec<String> = top
            .iter()
            .map(|(hotel, count)| format!("'{}' ({} bookings)", hotel, count))
            .collect();
        return format!("The hotels with the most bookings are {}.", parts.join(", "));
    }

    let mut result = String::from("Here's information about the hotels in the booking data:\n");
    for (hotel, members) in ordered_groups(subset, |b| b.hotel_or_unknown().to_string()) {
        let total = members.len();
        let canceled = members.iter().filter(|b| b.is_canceled).count();
        let adrs: Vec<f64> = members.iter().map(|b| b.adr).collect();
        let _ = writeln!(
            result,
            "- {}: {} bookings, {:.2}% cancellation rate, average daily rate of {}{:.2}",
            hotel,
            total,
            canceled as f64 / total as f64 * 100.0,
            config.currency_symbol,
            stats::mean(&adrs)
        );
    }
    result.trim_end().to_string()
}

fn country(
    question_lower: &str,
    subset: &[ScoredBooking],
    all_records: &[BookingRecord],
    config: &AnswerConfig,
) -> String {
    if triggered(question_lower, &config.country_global_triggers) {
        let top = stats::top_counts(all_records.iter().map(|r| r.country_or_unknown()), 5);
        let parts: Vec<String> = top
            .iter()
            .map(|(country, count)| format!("{} ({} bookings)", country, count))
            .collect();
        return format!("The top countries of origin for guests are: {}.", parts.join(", "));
    }

    let mut groups = ordered_groups(subset, |b| b.country_or_unknown().to_string());
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut result = String::from("Here's information about guest countries in the booking data:\n");
    for (country, members) in groups {
        let stays: Vec<f64> = members
            .iter()
            .filter(|b| b.total_nights() > 0)
            .map(|b| f64::from(b.total_nights()))
            .collect();
        let adrs: Vec<f64> = members.iter().map(|b| b.adr).collect();
        let _ = writeln!(
            result,
            "- {}: {} bookings, average stay of {:.1} nights, average daily rate of {}{:.2}",
            country,
            members.len(),
            stats::mean(&stays),
            config.currency_symbol,
            stats::mean(&adrs)
        );
    }
    result.trim_end().to_string()
}

fn requests(
    question_lower: &str,
    subset: &[ScoredBooking],
    all_records: &[BookingRecord],
    config: &AnswerConfig,
) -> String {
    if triggered(question_lower, &config.requests_global_triggers) {
        let counts: Vec<f64> = all_records
            .iter()
            .map(|r| f64::from(r.total_of_special_requests))
            .collect();
        return format!(
            "The average number of special requests per booking is {:.2}.",
            stats::mean(&counts)
        );
    }

    let counts: Vec<f64> = subset
        .iter()
        .map(|s| f64::from(s.booking.total_of_special_requests))
        .collect();
    let most_common_count =
        stats::most_common(subset.iter().map(|s| s.booking.total_of_special_requests))
            .unwrap_or(0);
    let max = subset
        .iter()
        .map(|s| s.booking.total_of_special_requests)
        .max()
        .unwrap_or(0);

    let mut result = format!(
        "Based on the booking data, the average number of special requests is {:.2} per booking. \
         The most common number of requests is {}, and the maximum is {}.",
        stats::mean(&counts),
        most_common_count,
        max
    );

    let by_hotel = per_hotel_values(subset, |b| Some(f64::from(b.total_of_special_requests)));
    if !by_hotel.is_empty() {
        let parts: Vec<String> = by_hotel
            .iter()
            .map(|(hotel, values)| format!("{}: {:.2}", hotel, stats::mean(values)))
            .collect();
        let _ = write!(result, " Average requests by hotel type: {}.", parts.join(", "));
    }

    result
}

/// Group subset bookings by a key, preserving first-seen order.
fn ordered_groups(
    subset: &[ScoredBooking],
    key: impl Fn(&BookingRecord) -> String,
) -> Vec<(String, Vec<&BookingRecord>)> {
    let mut groups: Vec<(String, Vec<&BookingRecord>)> = Vec::new();
    for scored in subset {
        let k = key(&scored.booking);
        match groups.iter().position(|(existing, _)| *existing == k) {
            Some(i) => groups[i].1.push(&scored.booking),
            None => groups.push((k, vec![&scored.booking])),
        }
    }
    groups
}

/// Per-hotel numeric samples, first-seen hotel order.
fn per_hotel_values(
    subset: &[ScoredBooking],
    value: impl Fn(&BookingRecord) -> Option<f64>,
) -> Vec<(String, Vec<f64>)> {
    let refs: Vec<&BookingRecord> = subset.iter().map(|s| &s.booking).collect();
    per_hotel_refs(&refs, value)
}

fn per_hotel_refs(
    bookings: &[&BookingRecord],
    value: impl Fn(&BookingRecord) -> Option<f64>,
) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for &booking in bookings {
        let Some(v) = value(booking) else { continue };
        let hotel = booking.hotel_or_unknown().to_string();
        match groups.iter().position(|(existing, _)| *existing == hotel) {
            Some(i) => groups[i].1.push(v),
            None => groups.push((hotel, vec![v])),
        }
    }
    groups
}
