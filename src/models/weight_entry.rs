use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// How far back an entry may be dated.
pub const MAX_ENTRY_AGE_YEARS: u32 = 10;

/// Suggested form value for users that have not recorded anything yet.
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// One of the caller's own entries, newest first in listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeightEntry {
    pub id: Uuid,
    #[sqlx(rename = "entry_date")]
    pub date: NaiveDate,
    pub weight: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A global (user, date, weight) observation feeding charts and rankings.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WeightSample {
    pub username: String,
    #[sqlx(rename = "entry_date")]
    pub date: NaiveDate,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWeightRequest {
    #[validate(range(
        min = 20.0,
        max = 300.0,
        message = "Weight must be between 20 and 300 kg"
    ))]
    pub weight: f64,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

impl CreateWeightRequest {
    /// Resolves the entry date against `today`: absent means today, future
    /// dates and dates older than [`MAX_ENTRY_AGE_YEARS`] are rejected.
    pub fn entry_date(&self, today: NaiveDate) -> AppResult<NaiveDate> {
        let Some(date) = self.date else {
            return Ok(today);
        };
        if date > today {
            return Err(AppError::Validation("Entry date cannot be in the future".into()));
        }
        let earliest = today
            .checked_sub_months(Months::new(12 * MAX_ENTRY_AGE_YEARS))
            .unwrap_or(NaiveDate::MIN);
        if date < earliest {
            return Err(AppError::Validation(format!(
                "Entry date cannot be more than {} years in the past",
                MAX_ENTRY_AGE_YEARS
            )));
        }
        Ok(date)
    }

    /// Blank notes are stored as absent.
    pub fn normalized_note(&self) -> Option<String> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize)]
pub struct LatestWeight {
    pub weight: f64,
    pub date: Option<NaiveDate>,
    pub recorded: bool,
}

impl LatestWeight {
    pub fn from_entry(entry: Option<WeightEntry>) -> Self {
        match entry {
            Some(e) => Self {
                weight: e.weight,
                date: Some(e.date),
                recorded: true,
            },
            None => Self {
                weight: DEFAULT_WEIGHT_KG,
                date: None,
                recorded: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(weight: f64, note: Option<&str>) -> CreateWeightRequest {
        CreateWeightRequest {
            weight,
            date: None,
            note: note.map(str::to_string),
        }
    }

    fn dated(date: &str) -> CreateWeightRequest {
        CreateWeightRequest {
            date: Some(date.parse().unwrap()),
            ..request(80.0, None)
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weight_bounds_enforced() {
        assert!(request(20.0, None).validate().is_ok());
        assert!(request(300.0, None).validate().is_ok());
        assert!(request(19.9, None).validate().is_err());
        assert!(request(300.1, None).validate().is_err());
    }

    #[test]
    fn test_entry_date_defaults_to_today() {
        let today = ymd(2024, 3, 15);
        assert_eq!(request(80.0, None).entry_date(today).unwrap(), today);
    }

    #[test]
    fn test_entry_date_accepts_both_edges() {
        let today = ymd(2024, 3, 15);
        assert_eq!(dated("2024-03-15").entry_date(today).unwrap(), today);
        assert_eq!(dated("2014-03-15").entry_date(today).unwrap(), ymd(2014, 3, 15));
    }

    #[test]
    fn test_entry_date_rejects_future() {
        let today = ymd(2024, 3, 15);
        assert!(matches!(
            dated("2024-03-16").entry_date(today),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_entry_date_rejects_distant_past() {
        let today = ymd(2024, 3, 15);
        assert!(matches!(
            dated("2014-03-14").entry_date(today),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            dated("0001-01-01").entry_date(today),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_long_note_rejected() {
        let note = "x".repeat(501);
        assert!(request(80.0, Some(&note)).validate().is_err());
    }

    #[test]
    fn test_blank_note_normalized_away() {
        assert_eq!(request(80.0, Some("   ")).normalized_note(), None);
        assert_eq!(
            request(80.0, Some(" after run ")).normalized_note(),
            Some("after run".to_string())
        );
    }

    #[test]
    fn test_latest_weight_falls_back_to_default() {
        let latest = LatestWeight::from_entry(None);
        assert_eq!(latest.weight, DEFAULT_WEIGHT_KG);
        assert!(!latest.recorded);
        assert!(latest.date.is_none());
    }
}
