//! Aggregate statistics over a schedule.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::entry::ScheduleEntry;

/// How many time slots the report keeps
pub const TOP_TIME_SLOTS: usize = 10;
/// How many buildings the report keeps
pub const TOP_LOCATIONS: usize = 5;

/// Weekday names indexed by the export's day number (0 = Sunday)
const WEEKDAYS: [&str; 7] = [
    "Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado",
];

/// Report order for weekdays, Monday first
const WEEKDAY_REPORT_ORDER: [usize; 7] = [1, 2, 3, 4, 5, 6, 0];

/// A label and how many sessions carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub invalid_entries: usize,
    pub unique_subjects: usize,
    pub unique_locations: usize,
    pub unique_time_slots: usize,
}

/// Result of analyzing a schedule.
///
/// Only entries with a name and a start date contribute to the distributions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub statistics: Statistics,
    /// Sessions per subject, most common first
    pub subjects: Vec<Tally>,
    /// "start - end" slots, most common first, capped at `TOP_TIME_SLOTS`
    pub time_slots: Vec<Tally>,
    /// Sessions per building, most common first, capped at `TOP_LOCATIONS`
    pub locations: Vec<Tally>,
    /// Sessions per weekday, Monday first, days without sessions omitted
    pub days_of_week: Vec<Tally>,
    /// Sessions per "YYYY-MM", ascending
    pub monthly_distribution: Vec<Tally>,
    /// Sessions per starting hour ("HH:00"), ascending
    pub hourly_distribution: Vec<Tally>,
}

impl Analysis {
    pub fn has_valid_entries(&self) -> bool {
        self.statistics.valid_entries > 0
    }
}

/// Counter that remembers first-seen order, so ties stay stable.
#[derive(Default)]
struct Counter {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl Counter {
    fn add(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    fn into_tallies(self) -> Vec<Tally> {
        let Counter { order, counts } = self;
        order
            .into_iter()
            .map(|label| {
                let count = counts.get(&label).copied().unwrap_or(0);
                Tally { label, count }
            })
            .collect()
    }

    /// Most common first; `sort_by` is stable so ties keep first-seen order.
    fn most_common(self, limit: Option<usize>) -> Vec<Tally> {
        let mut tallies = self.into_tallies();
        tallies.sort_by(|a, b| b.count.cmp(&a.count));
        if let Some(limit) = limit {
            tallies.truncate(limit);
        }
        tallies
    }

    fn sorted_by_label(self) -> Vec<Tally> {
        let mut tallies = self.into_tallies();
        tallies.sort_by(|a, b| a.label.cmp(&b.label));
        tallies
    }
}

/// Compute the schedule statistics.
pub fn analyze(entries: &[ScheduleEntry]) -> Analysis {
    let mut subjects = Counter::default();
    let mut time_slots = Counter::default();
    let mut locations = Counter::default();
    let mut weekdays = Counter::default();
    let mut months = Counter::default();
    let mut hours = Counter::default();
    let mut valid_entries = 0;

    for entry in entries.iter().filter(|e| e.is_exportable()) {
        valid_entries += 1;

        if let Some(name) = &entry.name {
            subjects.add(name);
        }

        if let (Some(start), Some(end)) = (&entry.start_time, &entry.end_time) {
            time_slots.add(&format!("{} - {}", start, end));
        }

        if let Some(building) = &entry.building {
            locations.add(building);
        }

        if let Some(day) = entry.weekday.as_deref().and_then(weekday_name) {
            weekdays.add(day);
        }

        if let Some(month) = entry.normalized_start_date().and_then(month_of) {
            months.add(&month);
        }

        if let Some(hour) = entry.start_time.as_deref().and_then(hour_of) {
            hours.add(&format!("{}:00", hour));
        }
    }

    let statistics = Statistics {
        total_entries: entries.len(),
        valid_entries,
        invalid_entries: entries.len() - valid_entries,
        unique_subjects: subjects.len(),
        unique_locations: locations.len(),
        unique_time_slots: time_slots.len(),
    };

    let days_of_week = WEEKDAY_REPORT_ORDER
        .iter()
        .map(|&i| WEEKDAYS[i])
        .filter_map(|day| match weekdays.count(day) {
            0 => None,
            count => Some(Tally {
                label: day.to_string(),
                count,
            }),
        })
        .collect();

    debug!(
        total = statistics.total_entries,
        valid = statistics.valid_entries,
        "Analyzed schedule"
    );

    Analysis {
        statistics,
        subjects: subjects.most_common(None),
        time_slots: time_slots.most_common(Some(TOP_TIME_SLOTS)),
        locations: locations.most_common(Some(TOP_LOCATIONS)),
        days_of_week,
        monthly_distribution: months.sorted_by_label(),
        hourly_distribution: hours.sorted_by_label(),
    }
}

/// Map the export's "0".."6" day number to its name.
fn weekday_name(day: &str) -> Option<&'static str> {
    let index: usize = day.trim().parse().ok()?;
    WEEKDAYS.get(index).copied()
}

fn month_of(date: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .ok()?;
    Some(date.format("%Y-%m").to_string())
}

fn hour_of(time: &str) -> Option<&str> {
    let hour = time.split(':').next()?.trim();
    if hour.is_empty() {
        None
    } else {
        Some(hour)
    }
}
