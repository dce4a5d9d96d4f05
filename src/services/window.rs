use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::weight_entry::WeightSample;

/// Inclusive date range selected for charts and rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Shortcut ranges, anchored on the latest recorded day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickRange {
    #[default]
    All,
    Month,
    Week,
}

impl QuickRange {
    fn lookback_days(self) -> Option<i64> {
        match self {
            QuickRange::All => None,
            QuickRange::Month => Some(30),
            QuickRange::Week => Some(6),
        }
    }
}

/// Earliest and latest recorded dates, if any.
pub fn sample_bounds(samples: &[WeightSample]) -> Option<(NaiveDate, NaiveDate)> {
    let min = samples.iter().map(|s| s.date).min()?;
    let max = samples.iter().map(|s| s.date).max()?;
    Some((min, max))
}

/// Resolves the window to filter by. Explicit `start`/`end` win over the quick
/// range; without any data and without explicit bounds there is no window.
pub fn resolve_window(
    bounds: Option<(NaiveDate, NaiveDate)>,
    range: QuickRange,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<DateWindow> {
    let quick = bounds.map(|(min, max)| {
        let start = match range.lookback_days() {
            Some(days) => min.max(max - Duration::days(days)),
            None => min,
        };
        (start, max)
    });

    match (start.or(quick.map(|q| q.0)), end.or(quick.map(|q| q.1))) {
        (Some(start), Some(end)) => Some(DateWindow::new(start, end)),
        (Some(start), None) => Some(DateWindow::new(start, NaiveDate::MAX)),
        (None, Some(end)) => Some(DateWindow::new(NaiveDate::MIN, end)),
        (None, None) => None,
    }
}
