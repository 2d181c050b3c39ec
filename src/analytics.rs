//! Booking Analytics
//!
//! Whole-dataset aggregate reports, independent of question answering.
//! Every report is a pure function over the record slice and serializes to
//! JSON for dashboards.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::stats;
use crate::types::BookingRecord;

/// Lead-time bins (days) used for the distribution report.
const LEAD_TIME_BINS: [(u32, u32, &str); 6] = [
    (0, 7, "0-7"),
    (8, 30, "8-30"),
    (31, 90, "31-90"),
    (91, 180, "91-180"),
    (181, 365, "181-365"),
    (366, u32::MAX, "365+"),
];

/// How many countries are reported individually before the rest collapse
/// into "Others".
const TOP_COUNTRIES: usize = 10;

/// Granularity of the revenue trend report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Monthly,
    Yearly,
}

impl Period {
    fn key(&self, date: chrono::NaiveDate) -> String {
        match self {
            Period::Daily => format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()),
            Period::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            Period::Yearly => format!("{:04}", date.year()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueTrends {
    pub period: Period,
    /// Realized revenue per arrival period, keyed "YYYY[-MM[-DD]]", sorted.
    pub revenue_by_period: BTreeMap<String, f64>,
    pub total_revenue: f64,
    pub average_booking_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRates {
    pub overall_rate: f64,
    pub total_bookings: usize,
    pub total_canceled: usize,
    /// Cancellation rate per hotel, sorted by hotel name.
    pub by_hotel: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeographicalDistribution {
    /// Booking counts for the top countries, descending; everything past
    /// the cutoff is folded into an "Others" entry.
    pub countries: Vec<CountryShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryShare {
    pub country: String,
    pub bookings: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimeDistribution {
    /// Booking counts per lead-time bin, in bin order.
    pub bins: Vec<LeadTimeBin>,
    pub mean: f64,
    pub median: f64,
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimeBin {
    pub label: String,
    pub bookings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalAnalytics {
    /// Average daily rate per hotel, sorted by hotel name.
    pub average_adr_by_hotel: BTreeMap<String, f64>,
    /// Booking counts per market segment, sorted by segment name.
    pub market_segments: BTreeMap<String, usize>,
    pub repeated_guest_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub revenue_trends: RevenueTrends,
    pub cancellation_rates: CancellationRates,
    pub geographical_distribution: GeographicalDistribution,
    pub lead_time_distribution: LeadTimeDistribution,
    pub additional: AdditionalAnalytics,
}

pub fn revenue_trends(records: &[BookingRecord], period: Period) -> RevenueTrends {
    let mut revenue_by_period: BTreeMap<String, f64> = BTreeMap::new();
    let mut revenues = Vec::new();

    for record in records.iter().filter(|r| !r.is_canceled) {
        let revenue = record.revenue();
        revenues.push(revenue);
        if let Some(date) = record.arrival_date {
            *revenue_by_period.entry(period.key(date)).or_insert(0.0) += revenue;
        }
    }

    RevenueTrends {
        period,
        revenue_by_period,
        total_revenue: revenues.iter().sum(),
        average_booking_value: stats::mean(&revenues),
    }
}

pub fn cancellation_rates(records: &[BookingRecord]) -> CancellationRates {
    let total_bookings = records.len();
    let total_canceled = records.iter().filter(|r| r.is_canceled).count();

    let mut per_hotel: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = per_hotel
            .entry(record.hotel_or_unknown().to_string())
            .or_insert((0, 0));
        entry.0 += 1;
        if record.is_canceled {
            entry.1 += 1;
        }
    }

    let by_hotel = per_hotel
        .into_iter()
        .map(|(hotel, (total, canceled))| (hotel, rate(canceled, total)))
        .collect();

    CancellationRates {
        overall_rate: rate(total_canceled, total_bookings),
        total_bookings,
        total_canceled,
        by_hotel,
    }
}

pub fn geographical_distribution(records: &[BookingRecord]) -> GeographicalDistribution {
    let total = records.len();
    let ranked = stats::top_counts(
        records.iter().map(|r| r.country_or_unknown().to_string()),
        usize::MAX,
    );

    let mut countries: Vec<CountryShare> = ranked
        .iter()
        .take(TOP_COUNTRIES)
        .map(|(country, bookings)| CountryShare {
            country: country.clone(),
            bookings: *bookings,
            share: rate(*bookings, total),
        })
        .collect();

    let others: usize = ranked.iter().skip(TOP_COUNTRIES).map(|(_, n)| n).sum();
    if others > 0 {
        countries.push(CountryShare {
            country: "Others".to_string(),
            bookings: others,
            share: rate(others, total),
        });
    }

    GeographicalDistribution { countries }
}

pub fn lead_time_distribution(records: &[BookingRecord]) -> LeadTimeDistribution {
    let lead_times: Vec<u32> = records.iter().map(|r| r.lead_time).collect();

    let bins = LEAD_TIME_BINS
        .iter()
        .map(|&(lo, hi, label)| LeadTimeBin {
            label: label.to_string(),
            bookings: lead_times.iter().filter(|&&lt| lt >= lo && lt <= hi).count(),
        })
        .collect();

    let as_f64: Vec<f64> = lead_times.iter().map(|&lt| f64::from(lt)).collect();
    LeadTimeDistribution {
        bins,
        mean: stats::mean(&as_f64),
        median: stats::median(&as_f64),
        min: lead_times.iter().copied().min().unwrap_or(0),
        max: lead_times.iter().copied().max().unwrap_or(0),
    }
}

pub fn additional_analytics(records: &[BookingRecord]) -> AdditionalAnalytics {
    let mut adr_by_hotel: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut market_segments: BTreeMap<String, usize> = BTreeMap::new();
    let mut repeated = 0usize;

    for record in records {
        adr_by_hotel
            .entry(record.hotel_or_unknown().to_string())
            .or_default()
            .push(record.adr);
        if !record.market_segment.is_empty() {
            *market_segments.entry(record.market_segment.clone()).or_insert(0) += 1;
        }
        if record.is_repeated_guest {
            repeated += 1;
        }
    }

    AdditionalAnalytics {
        average_adr_by_hotel: adr_by_hotel
            .into_iter()
            .map(|(hotel, adrs)| (hotel, stats::mean(&adrs)))
            .collect(),
        market_segments,
        repeated_guest_rate: rate(repeated, records.len()),
    }
}

/// All reports in one pass-friendly bundle. Revenue is reported monthly.
pub fn full_report(records: &[BookingRecord]) -> AnalyticsReport {
    AnalyticsReport {
        revenue_trends: revenue_trends(records, Period::Monthly),
        cancellation_rates: cancellation_rates(records),
        geographical_distribution: geographical_distribution(records),
        lead_time_distribution: lead_time_distribution(records),
        additional: additional_analytics(records),
    }
}

fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn records() -> Vec<BookingRecord> {
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(BookingRecord {
                id: i,
                hotel: if i < 6 { "City Hotel" } else { "Resort Hotel" }.to_string(),
                is_canceled: i < 3,
                lead_time: (i as u32) * 40,
                stays_in_week_nights: 2,
                adr: 100.0,
                country: Some(if i < 8 { "PRT" } else { "GBR" }.to_string()),
                market_segment: "Online TA".to_string(),
                is_repeated_guest: i == 0,
                arrival_date: NaiveDate::from_ymd_opt(2017, if i < 5 { 7 } else { 8 }, 1),
                ..Default::default()
            });
        }
        records
    }

    #[test]
    fn test_revenue_trends_excludes_canceled() {
        let trends = revenue_trends(&records(), Period::Monthly);
        // 7 active bookings at 100 * 2 nights each.
        assert!((trends.total_revenue - 1400.0).abs() < 1e-9);
        assert!((trends.average_booking_value - 200.0).abs() < 1e-9);
        // Active July arrivals are ids 3 and 4.
        assert!((trends.revenue_by_period["2017-07"] - 400.0).abs() < 1e-9);
        assert!((trends.revenue_by_period["2017-08"] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_revenue_trend_period_keys() {
        let trends = revenue_trends(&records(), Period::Yearly);
        assert!((trends.revenue_by_period["2017"] - 1400.0).abs() < 1e-9);
        let daily = revenue_trends(&records(), Period::Daily);
        assert!(daily.revenue_by_period.contains_key("2017-07-01"));
    }

    #[test]
    fn test_cancellation_rates_overall_and_per_hotel() {
        let rates = cancellation_rates(&records());
        assert!((rates.overall_rate - 30.0).abs() < 1e-9);
        assert_eq!(rates.total_canceled, 3);
        assert!((rates.by_hotel["City Hotel"] - 50.0).abs() < 1e-9);
        assert!((rates.by_hotel["Resort Hotel"] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_geographical_distribution_folds_tail_into_others() {
        let mut many = Vec::new();
        let mut id = 0;
        for c in 0..12 {
            for _ in 0..(12 - c) {
                many.push(BookingRecord {
                    id,
                    country: Some(format!("C{:02}", c)),
                    ..Default::default()
                });
                id += 1;
            }
        }
        let distribution = geographical_distribution(&many);
        assert_eq!(distribution.countries.len(), TOP_COUNTRIES + 1);
        assert_eq!(distribution.countries[0].country, "C00");
        assert_eq!(distribution.countries[0].bookings, 12);
        let others = distribution.countries.last().unwrap();
        assert_eq!(others.country, "Others");
        // The two smallest groups hold 2 + 1 bookings.
        assert_eq!(others.bookings, 3);
    }

    #[test]
    fn test_lead_time_distribution_bins() {
        let distribution = lead_time_distribution(&records());
        let counts: Vec<usize> = distribution.bins.iter().map(|b| b.bookings).collect();
        // Lead times 0, 40, 80, ..., 360: one in 0-7, one in 31-90 (40),
        // one more (80) in 31-90, 120/160 in 91-180, 200..360 in 181-365.
        assert_eq!(counts, vec![1, 0, 2, 2, 5, 0]);
        assert_eq!(distribution.min, 0);
        assert_eq!(distribution.max, 360);
        assert!((distribution.mean - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_additional_analytics() {
        let additional = additional_analytics(&records());
        assert!((additional.average_adr_by_hotel["City Hotel"] - 100.0).abs() < 1e-9);
        assert_eq!(additional.market_segments["Online TA"], 10);
        assert!((additional.repeated_guest_rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_report_on_empty_dataset() {
        let report = full_report(&[]);
        assert_eq!(report.cancellation_rates.total_bookings, 0);
        assert_eq!(report.cancellation_rates.overall_rate, 0.0);
        assert!(report.geographical_distribution.countries.is_empty());
        assert_eq!(report.lead_time_distribution.mean, 0.0);
    }
}
