use chrono::NaiveDate;
use serde::Serialize;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub total_classes: u32,
    pub date_joined: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub student_id: i64,
    pub student_name: String,
}

impl Student {
    pub const HEADERS: [&'static str; 4] = ["Student ID", "Name", "Total Classes", "Date Joined"];

    pub fn from_row(row: &[String]) -> Result<Self, String> {
        let id = parse_int_cell(cell(row, 0))
            .ok_or_else(|| format!("bad Student ID: {:?}", cell(row, 0)))?;
        let name = cell(row, 1).to_string();
        let total_classes = parse_int_cell(cell(row, 2))
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| format!("bad Total Classes: {:?}", cell(row, 2)))?;
        let date_joined = parse_date_cell(cell(row, 3))
            .ok_or_else(|| format!("bad Date Joined: {:?}", cell(row, 3)))?;
        Ok(Self {
            id,
            name,
            total_classes,
            date_joined,
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.total_classes.to_string(),
            self.date_joined.format(DATE_FORMAT).to_string(),
        ]
    }
}

impl AttendanceRecord {
    pub const HEADERS: [&'static str; 3] = ["Date", "Student ID", "Name"];

    pub fn from_row(row: &[String]) -> Result<Self, String> {
        let date =
            parse_date_cell(cell(row, 0)).ok_or_else(|| format!("bad Date: {:?}", cell(row, 0)))?;
        let student_id = parse_int_cell(cell(row, 1))
            .ok_or_else(|| format!("bad Student ID: {:?}", cell(row, 1)))?;
        Ok(Self {
            date,
            student_id,
            student_name: cell(row, 2).to_string(),
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format(DATE_FORMAT).to_string(),
            self.student_id.to_string(),
            self.student_name.clone(),
        ]
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Worksheet exports write integer columns as floats ("3.0").
pub fn parse_int_cell(raw: &str) -> Option<i64> {
    let t = raw.trim();
    if let Ok(v) = t.parse::<i64>() {
        return Some(v);
    }
    let f = t.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Keeps the calendar date only; a trailing time-of-day is dropped.
pub fn parse_date_cell(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(t, DATE_FORMAT) {
        return Some(d);
    }
    let head = t.get(..10)?;
    match t[10..].chars().next() {
        Some(' ') | Some('T') => NaiveDate::parse_from_str(head, DATE_FORMAT).ok(),
        _ => None,
    }
}
