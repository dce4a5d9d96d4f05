//! Weight history aggregation.
//!
//! Turns the raw `(user, date, weight)` history into the two views the
//! clients render: a gap-filled per-day grid for trend lines and the
//! weight-loss leaderboards. Both are recomputed from scratch on every call.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::weight_entry::WeightSample;
use crate::services::window::DateWindow;

/// Length of each leaderboard.
pub const RANKING_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    #[error("Starting weight of {username} is {weight} kg, relative loss is undefined")]
    DegenerateStartWeight { username: String, weight: f64 },
}

/// Dense per-day grid plus the observations it was built from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InterpolatedSeries {
    /// Every calendar day from the earliest to the latest selected sample.
    pub dates: Vec<NaiveDate>,
    /// One trend per user with data, alphabetical, each aligned with `dates`.
    pub trends: Vec<UserTrend>,
    /// Recorded observations only, sorted by date then username.
    pub real_points: Vec<RealPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTrend {
    pub username: String,
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealPoint {
    pub username: String,
    pub date: NaiveDate,
    pub weight: f64,
}

impl InterpolatedSeries {
    pub fn is_empty(&self) -> bool {
        self.trends.is_empty()
    }

    #[cfg(test)]
    pub fn weight_on(&self, username: &str, date: NaiveDate) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.trends
            .iter()
            .find(|t| t.username == username)
            .map(|t| t.weights[idx])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossEntry {
    pub username: String,
    pub start_weight: f64,
    pub latest_weight: f64,
    pub absolute_loss: f64,
    pub relative_loss_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LossRanking {
    pub by_absolute: Vec<LossEntry>,
    pub by_relative: Vec<LossEntry>,
}

/// Builds the chart grid for the selected users inside `window`.
///
/// `users = None` selects everyone. Duplicate dates for one user collapse to
/// the most recently created sample. Days between two recorded points are
/// linearly interpolated; days before a user's first or after their last
/// point repeat that boundary value. Users without samples in the window are
/// left out, and an empty selection yields an empty series.
pub fn build_interpolated_series(
    samples: &[WeightSample],
    users: Option<&BTreeSet<String>>,
    window: Option<DateWindow>,
) -> InterpolatedSeries {
    let groups = group_by_user(samples, users, window);

    let per_user: Vec<(&str, Vec<(NaiveDate, f64)>)> = groups
        .into_iter()
        .map(|(username, group)| (username, collapse_by_date(group)))
        .collect();

    let first_day = per_user.iter().filter_map(|(_, p)| p.first()).map(|p| p.0).min();
    let last_day = per_user.iter().filter_map(|(_, p)| p.last()).map(|p| p.0).max();
    let (Some(first_day), Some(last_day)) = (first_day, last_day) else {
        return InterpolatedSeries::default();
    };

    let dates: Vec<NaiveDate> = first_day
        .iter_days()
        .take_while(|d| *d <= last_day)
        .collect();

    let mut real_points = Vec::new();
    let mut trends = Vec::with_capacity(per_user.len());
    for (username, points) in &per_user {
        real_points.extend(points.iter().map(|&(date, weight)| RealPoint {
            username: username.to_string(),
            date,
            weight,
        }));
        trends.push(UserTrend {
            username: username.to_string(),
            weights: fill_days(points, &dates),
        });
    }
    real_points.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.username.cmp(&b.username)));

    InterpolatedSeries {
        dates,
        trends,
        real_points,
    }
}

/// Ranks users by the weight they lost between their first and last sample
/// inside `window` (`None` ranks the whole history).
///
/// Values are rounded to one decimal before ordering; equal values keep
/// alphabetical order. A user with a single sample has zero loss.
pub fn compute_loss_ranking(
    samples: &[WeightSample],
    window: Option<DateWindow>,
) -> Result<LossRanking, AggregateError> {
    let groups = group_by_user(samples, None, window);

    let mut entries = Vec::with_capacity(groups.len());
    for (username, group) in groups {
        let (Some(first), Some(last)) = (
            group.iter().copied().min_by(|a, b| chronological(a, b)),
            group.iter().copied().max_by(|a, b| chronological(a, b)),
        ) else {
            continue;
        };

        if first.weight <= 0.0 || !first.weight.is_finite() {
            return Err(AggregateError::DegenerateStartWeight {
                username: username.to_string(),
                weight: first.weight,
            });
        }

        let absolute = first.weight - last.weight;
        let relative = absolute / first.weight * 100.0;
        entries.push(LossEntry {
            username: username.to_string(),
            start_weight: round_one(first.weight),
            latest_weight: round_one(last.weight),
            absolute_loss: round_one(absolute),
            relative_loss_percent: round_one(relative),
        });
    }

    let mut by_absolute = entries.clone();
    by_absolute.sort_by(|a, b| b.absolute_loss.total_cmp(&a.absolute_loss));
    by_absolute.truncate(RANKING_SIZE);

    let mut by_relative = entries;
    by_relative.sort_by(|a, b| b.relative_loss_percent.total_cmp(&a.relative_loss_percent));
    by_relative.truncate(RANKING_SIZE);

    Ok(LossRanking {
        by_absolute,
        by_relative,
    })
}

fn group_by_user<'a>(
    samples: &'a [WeightSample],
    users: Option<&BTreeSet<String>>,
    window: Option<DateWindow>,
) -> BTreeMap<&'a str, Vec<&'a WeightSample>> {
    let mut groups: BTreeMap<&str, Vec<&WeightSample>> = BTreeMap::new();
    for sample in samples {
        if users.is_some_and(|u| !u.contains(&sample.username)) {
            continue;
        }
        if window.is_some_and(|w| !w.contains(sample.date)) {
            continue;
        }
        groups.entry(sample.username.as_str()).or_default().push(sample);
    }
    groups
}

fn chronological(a: &WeightSample, b: &WeightSample) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Sorts by date and keeps one point per date, the latest-created one.
fn collapse_by_date(mut group: Vec<&WeightSample>) -> Vec<(NaiveDate, f64)> {
    group.sort_by(|a, b| chronological(a, b));

    let mut points: Vec<(NaiveDate, f64)> = Vec::with_capacity(group.len());
    for sample in group {
        match points.last_mut() {
            Some(last) if last.0 == sample.date => last.1 = sample.weight,
            _ => points.push((sample.date, sample.weight)),
        }
    }
    points
}

/// `points` must be non-empty and sorted by unique date; `dates` ascending.
fn fill_days(points: &[(NaiveDate, f64)], dates: &[NaiveDate]) -> Vec<f64> {
    let mut weights = Vec::with_capacity(dates.len());
    // index of the first point dated on or after the current day
    let mut next = 0;

    for &day in dates {
        while next < points.len() && points[next].0 < day {
            next += 1;
        }

        let weight = if next == 0 {
            points[0].1
        } else if next == points.len() {
            points[points.len() - 1].1
        } else {
            let (after_date, after_weight) = points[next];
            if after_date == day {
                after_weight
            } else {
                let (before_date, before_weight) = points[next - 1];
                let span = (after_date - before_date).num_days() as f64;
                let offset = (day - before_date).num_days() as f64;
                before_weight + (after_weight - before_weight) * offset / span
            }
        };
        weights.push(weight);
    }

    weights
}

fn round_one(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // avoid serializing -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, n).unwrap()
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
    }

    fn sample(user: &str, date: NaiveDate, weight: f64) -> WeightSample {
        sample_at(user, date, weight, at(0))
    }

    fn sample_at(user: &str, date: NaiveDate, weight: f64, created_at: DateTime<Utc>) -> WeightSample {
        WeightSample {
            username: user.to_string(),
            date,
            weight,
            created_at,
        }
    }

    fn select(users: &[&str]) -> BTreeSet<String> {
        users.iter().map(|u| u.to_string()).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_missing_day_interpolated_between_neighbours() {
        let samples = vec![sample("A", day(1), 100.0), sample("A", day(3), 96.0)];
        let series = build_interpolated_series(&samples, None, None);

        assert_eq!(series.dates, vec![day(1), day(2), day(3)]);
        assert_close(series.weight_on("A", day(2)).unwrap(), 98.0);
        assert_eq!(series.real_points.len(), 2);
    }

    #[test]
    fn test_interpolation_matches_linear_formula() {
        let samples = vec![sample("A", day(2), 90.0), sample("A", day(9), 83.0)];
        let series = build_interpolated_series(&samples, None, None);

        for d in 3..9 {
            let expected = 90.0 + (83.0 - 90.0) * (d as f64 - 2.0) / 7.0;
            assert_close(series.weight_on("A", day(d)).unwrap(), expected);
        }
    }

    #[test]
    fn test_flat_extrapolation_outside_own_range() {
        let samples = vec![
            sample("A", day(1), 100.0),
            sample("A", day(10), 90.0),
            sample("B", day(4), 80.0),
            sample("B", day(6), 79.0),
        ];
        let series = build_interpolated_series(&samples, None, None);

        assert_eq!(series.dates.len(), 10);
        for d in 1..=4 {
            assert_close(series.weight_on("B", day(d)).unwrap(), 80.0);
        }
        for d in 6..=10 {
            assert_close(series.weight_on("B", day(d)).unwrap(), 79.0);
        }
        assert_close(series.weight_on("B", day(5)).unwrap(), 79.5);
    }

    #[test]
    fn test_grid_has_value_for_every_user_and_day() {
        let samples = vec![
            sample("carol", day(5), 70.0),
            sample("alice", day(1), 60.0),
            sample("bob", day(3), 90.0),
            sample("bob", day(12), 88.0),
        ];
        let series = build_interpolated_series(&samples, None, None);

        assert_eq!(series.dates.first(), Some(&day(1)));
        assert_eq!(series.dates.last(), Some(&day(12)));
        let names: Vec<&str> = series.trends.iter().map(|t| t.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        for trend in &series.trends {
            assert_eq!(trend.weights.len(), series.dates.len());
            assert!(trend.weights.iter().all(|w| w.is_finite()));
        }
    }

    #[test]
    fn test_duplicate_date_keeps_latest_created() {
        let samples = vec![
            sample_at("A", day(2), 81.0, at(30)),
            sample_at("A", day(2), 80.0, at(5)),
            sample_at("A", day(1), 82.0, at(0)),
        ];
        let series = build_interpolated_series(&samples, None, None);

        assert_close(series.weight_on("A", day(2)).unwrap(), 81.0);
        assert_eq!(series.real_points.len(), 2);
    }

    #[test]
    fn test_user_and_window_filters() {
        let samples = vec![
            sample("A", day(1), 100.0),
            sample("A", day(20), 95.0),
            sample("B", day(5), 70.0),
            sample("C", day(25), 60.0),
        ];
        let users = select(&["A", "C"]);
        let window = DateWindow::new(day(2), day(24));
        let series = build_interpolated_series(&samples, Some(&users), Some(window));

        assert_eq!(series.trends.len(), 1);
        assert_eq!(series.trends[0].username, "A");
        assert_eq!(series.dates, vec![day(20)]);
        assert!(series.weight_on("C", day(20)).is_none());
    }

    #[test]
    fn test_empty_selection_yields_empty_series() {
        let samples = vec![sample("A", day(1), 100.0)];
        let nobody = select(&["Z"]);
        let series = build_interpolated_series(&samples, Some(&nobody), None);

        assert!(series.is_empty());
        assert!(series.dates.is_empty());
        assert!(series.real_points.is_empty());
        assert!(build_interpolated_series(&[], None, None).is_empty());
    }

    #[test]
    fn test_loss_ranking_example() {
        let samples = vec![sample("A", day(1), 100.0), sample("A", day(10), 90.0)];
        let ranking = compute_loss_ranking(&samples, None).unwrap();

        let entry = &ranking.by_absolute[0];
        assert_eq!(entry.absolute_loss, 10.0);
        assert_eq!(entry.relative_loss_percent, 10.0);
        assert_eq!(entry.start_weight, 100.0);
        assert_eq!(entry.latest_weight, 90.0);
    }

    #[test]
    fn test_loss_uses_date_order_not_insertion_order() {
        let base = at(0);
        let samples = vec![
            sample_at("A", day(10), 90.0, base),
            sample_at("A", day(1), 100.0, base + Duration::days(3)),
        ];
        let ranking = compute_loss_ranking(&samples, None).unwrap();
        assert_eq!(ranking.by_absolute[0].absolute_loss, 10.0);
    }

    #[test]
    fn test_rankings_truncated_and_sorted() {
        let samples = vec![
            sample("anna", day(1), 100.0),
            sample("anna", day(5), 95.0),
            sample("ben", day(1), 120.0),
            sample("ben", day(5), 112.0),
            sample("cleo", day(1), 60.0),
            sample("cleo", day(5), 55.0),
            sample("dan", day(1), 80.0),
            sample("dan", day(5), 81.0),
        ];
        let ranking = compute_loss_ranking(&samples, None).unwrap();

        assert_eq!(ranking.by_absolute.len(), RANKING_SIZE);
        assert_eq!(ranking.by_relative.len(), RANKING_SIZE);
        let abs: Vec<&str> = ranking.by_absolute.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(abs, vec!["ben", "anna", "cleo"]);
        let rel: Vec<&str> = ranking.by_relative.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(rel, vec!["cleo", "ben", "anna"]);
        for pair in ranking.by_absolute.windows(2) {
            assert!(pair[0].absolute_loss >= pair[1].absolute_loss);
        }
    }

    #[test]
    fn test_ties_keep_alphabetical_order() {
        let samples = vec![
            sample("zoe", day(1), 90.0),
            sample("zoe", day(2), 88.0),
            sample("adam", day(1), 90.0),
            sample("adam", day(2), 88.0),
        ];
        let ranking = compute_loss_ranking(&samples, None).unwrap();
        let abs: Vec<&str> = ranking.by_absolute.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(abs, vec!["adam", "zoe"]);
    }

    #[test]
    fn test_relative_ties_keep_alphabetical_order() {
        // 10% each, from different starting weights
        let samples = vec![
            sample("yara", day(1), 120.0),
            sample("yara", day(3), 108.0),
            sample("bea", day(1), 80.0),
            sample("bea", day(3), 72.0),
            sample("kim", day(1), 100.0),
            sample("kim", day(3), 98.0),
        ];
        let ranking = compute_loss_ranking(&samples, None).unwrap();

        let rel: Vec<&str> = ranking.by_relative.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(rel, vec!["bea", "yara", "kim"]);
        assert_eq!(ranking.by_relative[0].relative_loss_percent, 10.0);
        assert_eq!(ranking.by_relative[1].relative_loss_percent, 10.0);

        let abs: Vec<&str> = ranking.by_absolute.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(abs, vec!["yara", "bea", "kim"]);
    }

    #[test]
    fn test_single_sample_user_has_zero_loss() {
        let samples = vec![sample("solo", day(4), 77.0)];
        let ranking = compute_loss_ranking(&samples, None).unwrap();

        assert_eq!(ranking.by_absolute.len(), 1);
        assert_eq!(ranking.by_absolute[0].absolute_loss, 0.0);
        assert_eq!(ranking.by_relative[0].relative_loss_percent, 0.0);
    }

    #[test]
    fn test_ranking_respects_window() {
        let samples = vec![
            sample("A", day(1), 100.0),
            sample("A", day(10), 95.0),
            sample("A", day(20), 90.0),
            sample("B", day(2), 70.0),
        ];
        let window = DateWindow::new(day(10), day(20));
        let ranking = compute_loss_ranking(&samples, Some(window)).unwrap();

        assert_eq!(ranking.by_absolute.len(), 1);
        assert_eq!(ranking.by_absolute[0].start_weight, 95.0);
        assert_eq!(ranking.by_absolute[0].absolute_loss, 5.0);
    }

    #[test]
    fn test_values_rounded_to_one_decimal() {
        let samples = vec![sample("A", day(1), 83.37), sample("A", day(2), 80.0)];
        let ranking = compute_loss_ranking(&samples, None).unwrap();
        let entry = &ranking.by_absolute[0];

        assert_eq!(entry.start_weight, 83.4);
        assert_eq!(entry.absolute_loss, 3.4);
        assert_eq!(entry.relative_loss_percent, 4.0);
    }

    #[test]
    fn test_zero_start_weight_is_reported() {
        let samples = vec![sample("A", day(1), 0.0), sample("A", day(2), 80.0)];
        let err = compute_loss_ranking(&samples, None).unwrap_err();
        assert!(matches!(err, AggregateError::DegenerateStartWeight { .. }));
    }

    #[test]
    fn test_empty_input_ranks_nobody() {
        let ranking = compute_loss_ranking(&[], None).unwrap();
        assert_eq!(ranking, LossRanking::default());
    }
}
