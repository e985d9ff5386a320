use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("no such month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Cell {
    Empty,
    Day { day: u32, count: u32, tier: u8 },
}

/// Monday-first weeks for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Cell; 7]>,
}

/// Density bucket: 0 | 1-3 | 4-7 | 8+.
pub fn tier_for(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=3 => 1,
        4..=7 => 2,
        _ => 3,
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn month_grid(
    year: i32,
    month: u32,
    counts: &BTreeMap<u32, u32>,
) -> Result<MonthGrid, GridError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(GridError::InvalidMonth { year, month })?;
    let lead = first.weekday().num_days_from_monday() as usize;

    let mut cells: Vec<Cell> = vec![Cell::Empty; lead];
    for day in 1..=days_in_month(year, month) {
        let count = counts.get(&day).copied().unwrap_or(0);
        cells.push(Cell::Day {
            day,
            count,
            tier: tier_for(count),
        });
    }
    while cells.len() % 7 != 0 {
        cells.push(Cell::Empty);
    }

    let weeks = cells
        .chunks_exact(7)
        .map(|w| {
            let mut week = [Cell::Empty; 7];
            week.copy_from_slice(w);
            week
        })
        .collect();
    Ok(MonthGrid { year, month, weeks })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_cells(grid: &MonthGrid) -> Vec<u32> {
        grid.weeks
            .iter()
            .flatten()
            .filter_map(|c| match c {
                Cell::Day { day, .. } => Some(*day),
                Cell::Empty => None,
            })
            .collect()
    }

    #[test]
    fn tier_boundaries() {
        let tiers: Vec<u8> = [0, 1, 3, 4, 7, 8].into_iter().map(tier_for).collect();
        assert_eq!(tiers, vec![0, 1, 1, 2, 2, 3]);
        assert_eq!(tier_for(u32::MAX), 3);
    }

    #[test]
    fn every_month_has_full_weeks_and_all_days() {
        for year in [1900, 2000, 2023, 2024] {
            for month in 1..=12 {
                let grid = month_grid(year, month, &BTreeMap::new()).expect("grid");
                assert!(grid.weeks.len() >= 4 && grid.weeks.len() <= 6);
                let days = day_cells(&grid);
                assert_eq!(days.len() as u32, days_in_month(year, month));
                assert_eq!(days, (1..=days_in_month(year, month)).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn march_2024_starts_on_friday() {
        let counts = BTreeMap::from([(1, 2), (2, 9)]);
        let grid = month_grid(2024, 3, &counts).expect("grid");
        assert_eq!(grid.weeks.len(), 5);
        assert_eq!(&grid.weeks[0][..4], &[Cell::Empty; 4]);
        assert_eq!(
            grid.weeks[0][4],
            Cell::Day {
                day: 1,
                count: 2,
                tier: 1
            }
        );
        assert_eq!(
            grid.weeks[0][5],
            Cell::Day {
                day: 2,
                count: 9,
                tier: 3
            }
        );
        assert_eq!(
            grid.weeks[0][6],
            Cell::Day {
                day: 3,
                count: 0,
                tier: 0
            }
        );
        assert_eq!(grid.weeks[4][6], Cell::Day { day: 31, count: 0, tier: 0 });
    }

    #[test]
    fn february_2021_fits_four_weeks() {
        let grid = month_grid(2021, 2, &BTreeMap::new()).expect("grid");
        assert_eq!(grid.weeks.len(), 4);
        assert!(grid.weeks.iter().flatten().all(|c| *c != Cell::Empty));
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert_eq!(
            month_grid(2024, 13, &BTreeMap::new()),
            Err(GridError::InvalidMonth {
                year: 2024,
                month: 13
            })
        );
    }

    #[test]
    fn cells_serialize_with_kind_tag() {
        let v = serde_json::to_value(Cell::Day {
            day: 4,
            count: 5,
            tier: 2,
        })
        .expect("serialize");
        assert_eq!(
            v,
            serde_json::json!({ "kind": "day", "day": 4, "count": 5, "tier": 2 })
        );
        assert_eq!(
            serde_json::to_value(Cell::Empty).expect("serialize"),
            serde_json::json!({ "kind": "empty" })
        );
    }
}
