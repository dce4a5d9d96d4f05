use std::collections::{BTreeMap, BTreeSet, HashMap};

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppResult;
use crate::services::aggregator::{
    build_interpolated_series, compute_loss_ranking, InterpolatedSeries, LossRanking,
};
use crate::services::color::{assign_display_color, DisplayColor};
use crate::services::window::{resolve_window, sample_bounds, DateWindow, QuickRange};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub range: QuickRange,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    /// Comma-separated usernames; absent or empty selects everyone.
    pub users: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub range: QuickRange,
}

#[derive(Debug, Serialize)]
pub struct WeightChartResponse {
    pub has_data: bool,
    pub window: Option<DateWindow>,
    pub available_users: Vec<String>,
    pub colors: BTreeMap<String, DisplayColor>,
    #[serde(flatten)]
    pub series: InterpolatedSeries,
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub has_data: bool,
    pub window: Option<DateWindow>,
    #[serde(flatten)]
    pub ranking: LossRanking,
}

fn parse_user_filter(raw: Option<&str>) -> Option<BTreeSet<String>> {
    let users: BTreeSet<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect();
    if users.is_empty() {
        None
    } else {
        Some(users)
    }
}

pub async fn weight_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> AppResult<Json<WeightChartResponse>> {
    let samples = db::weights::fetch_all_samples(&state.db).await?;
    let stored_colors: HashMap<String, Option<String>> = db::users::fetch_all_user_colors(&state.db)
        .await?
        .into_iter()
        .map(|uc| (uc.username, uc.color))
        .collect();

    let window = resolve_window(sample_bounds(&samples), query.range, query.start, query.end);
    let selected = parse_user_filter(query.users.as_deref());
    let series = build_interpolated_series(&samples, selected.as_ref(), window);

    let available_users: Vec<String> = samples
        .iter()
        .map(|s| s.username.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut rng = rand::thread_rng();
    let colors = series
        .trends
        .iter()
        .map(|trend| {
            let stored = stored_colors.get(&trend.username).and_then(|c| c.as_deref());
            (trend.username.clone(), assign_display_color(stored, &mut rng))
        })
        .collect();

    tracing::debug!(
        samples = samples.len(),
        users = series.trends.len(),
        days = series.dates.len(),
        "Weight chart computed"
    );

    Ok(Json(WeightChartResponse {
        has_data: !series.is_empty(),
        window,
        available_users,
        colors,
        series,
    }))
}

pub async fn rankings(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> AppResult<Json<RankingResponse>> {
    let samples = db::weights::fetch_all_samples(&state.db).await?;
    let window = resolve_window(sample_bounds(&samples), query.range, query.start, query.end);
    let ranking = compute_loss_ranking(&samples, window)?;

    Ok(Json(RankingResponse {
        has_data: !ranking.by_absolute.is_empty(),
        window,
        ranking,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_filter_parsing() {
        assert_eq!(parse_user_filter(None), None);
        assert_eq!(parse_user_filter(Some(" , ")), None);
        let users = parse_user_filter(Some("bob, alice,,bob")).unwrap();
        assert_eq!(users.into_iter().collect::<Vec<_>>(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_chart_query_from_url() {
        let uri: axum::http::Uri = "/api/charts/weights?users=alice&range=week&start=2024-03-01"
            .parse()
            .unwrap();
        let Query(query) = Query::<ChartQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.users.as_deref(), Some("alice"));
        assert_eq!(query.range, QuickRange::Week);
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(query.end, None);
    }

    #[test]
    fn test_window_query_defaults_to_all() {
        let uri: axum::http::Uri = "/api/rankings".parse().unwrap();
        let Query(query) = Query::<WindowQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.range, QuickRange::All);
        assert!(query.start.is_none());
    }
}
