use crate::model::AttendanceRecord;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameCount {
    pub name: String,
    pub count: u32,
}

fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Day-of-month -> check-ins. Days without check-ins are absent.
pub fn month_daily_counts(
    records: &[AttendanceRecord],
    year: i32,
    month: u32,
) -> BTreeMap<u32, u32> {
    let mut out = BTreeMap::new();
    for r in records.iter().filter(|r| in_month(r.date, year, month)) {
        *out.entry(r.date.day()).or_insert(0) += 1;
    }
    out
}

pub fn month_total(records: &[AttendanceRecord], year: i32, month: u32) -> usize {
    records
        .iter()
        .filter(|r| in_month(r.date, year, month))
        .count()
}

pub fn month_student_counts(records: &[AttendanceRecord], year: i32, month: u32) -> Vec<NameCount> {
    rank_by_name(records.iter().filter(|r| in_month(r.date, year, month)))
}

pub fn year_student_counts(records: &[AttendanceRecord], year: i32) -> Vec<NameCount> {
    rank_by_name(records.iter().filter(|r| r.date.year() == year))
}

/// Most recent first. Records on the same date keep their input order.
pub fn student_history(records: &[AttendanceRecord], student_name: &str) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.student_name == student_name)
        .map(|r| r.date)
        .collect();
    dates.sort_by(|a, b| b.cmp(a));
    dates
}

// Count descending; equal counts stay in first-appearance order.
fn rank_by_name<'a, I>(records: I) -> Vec<NameCount>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut out: Vec<NameCount> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for r in records {
        match index.get(r.student_name.as_str()) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(r.student_name.as_str(), out.len());
                out.push(NameCount {
                    name: r.student_name.clone(),
                    count: 1,
                });
            }
        }
    }
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
