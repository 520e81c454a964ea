//! Pure grouping passes: record slice in, ordered count table out.
//!
//! All five functions are total: an empty input yields an empty table (or,
//! for the hourly histogram, its 24 zero buckets), never an error.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Timelike};

use crate::types::{AccessRecord, CountTable};

/// Accesses per calendar date, ascending by date. Chronological order is
/// required by the trend-line consumer.
pub fn by_day(records: &[AccessRecord]) -> CountTable<NaiveDate> {
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.timestamp.date()).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Accesses per hour-of-day, all 24 buckets 0..=23 even when empty; the bar
/// chart shows gaps rather than skipping hours.
pub fn by_hour(records: &[AccessRecord]) -> CountTable<u32> {
    let mut buckets = [0u64; 24];
    for record in records {
        buckets[record.timestamp.hour() as usize] += 1;
    }
    (0u32..24).zip(buckets).collect()
}

/// Accesses per acting user, descending by count, ties in first-encountered
/// input order.
pub fn by_user(records: &[AccessRecord]) -> CountTable<String> {
    count_values(records.iter().map(|r| r.user.as_str()))
}

/// Lookups per queried member, same ordering contract as [`by_user`].
pub fn by_member(records: &[AccessRecord]) -> CountTable<String> {
    count_values(records.iter().map(|r| r.member.as_str()))
}

/// Outcomes per status value. The consumer is a proportional view that does
/// not care about order, but repeated calls on the same input must agree, so
/// this shares the stable descending order of the other groupings.
pub fn by_status(records: &[AccessRecord]) -> CountTable<String> {
    count_values(records.iter().map(|r| r.status.as_str()))
}

/// Group string values, preserving first-encounter order, then stable-sort
/// descending by count. `sort_by` being stable is what gives ties their
/// first-encountered order.
fn count_values<'a>(values: impl Iterator<Item = &'a str>) -> CountTable<String> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut table: CountTable<String> = Vec::new();

    for value in values {
        match index.get(value) {
            Some(&i) => table[i].1 += 1,
            None => {
                index.insert(value, table.len());
                table.push((value.to_string(), 1));
            }
        }
    }

    table.sort_by(|a, b| b.1.cmp(&a.1));
    table
}
