use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_PAGE_SIZE, ERR_INVALID_DATE, ERR_LIMIT_RANGE, ERR_PAGE_RANGE, MAX_PAGE_SIZE,
};
use crate::error::{AppError, Result};
use crate::models::WorkoutFilter;

/// Raw query parameters for workout listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListWorkoutsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// Validate pagination parameters and build the store-facing filter.
///
/// `limit` must land in 1..=30 (default 10), `page` must be at least 1
/// (default 1); `offset = (page - 1) * limit`. Date bounds are RFC3339 and
/// applied inclusively to the creation timestamp.
pub fn build_workout_filter(query: &ListWorkoutsQuery) -> Result<WorkoutFilter> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::InvalidInput(ERR_LIMIT_RANGE.to_string()));
    }

    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::InvalidInput(ERR_PAGE_RANGE.to_string()));
    }

    Ok(WorkoutFilter {
        start_date: parse_date(query.start_date.as_deref())?,
        end_date: parse_date(query.end_date.as_deref())?,
        limit,
        offset: (page - 1) * limit,
    })
}

fn parse_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| AppError::InvalidInput(ERR_INVALID_DATE.to_string())),
    }
}

/// Validate a set-log entry before it reaches the orchestrator. The record
/// tracker assumes a positive weight; everything else only needs to be
/// non-negative.
pub fn validate_set_entry(sets: i32, reps: i32, weight: f64, duration: i32, distance: f64) -> Result<()> {
    if sets < 1 {
        return Err(AppError::InvalidInput("sets must be at least 1".into()));
    }
    if reps < 0 {
        return Err(AppError::InvalidInput("reps must not be negative".into()));
    }
    if !(weight > 0.0) {
        return Err(AppError::InvalidInput("weight must be positive".into()));
    }
    if duration < 0 || distance < 0.0 {
        return Err(AppError::InvalidInput(
            "duration and distance must not be negative".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let filter = build_workout_filter(&ListWorkoutsQuery::default()).unwrap();
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.offset, 0);
        assert!(filter.start_date.is_none());
    }

    #[test]
    fn page_two_offsets_by_limit() {
        let query = ListWorkoutsQuery {
            page: Some(2),
            limit: Some(10),
            ..Default::default()
        };
        let filter = build_workout_filter(&query).unwrap();
        assert_eq!(filter.offset, 10);
    }

    #[test]
    fn limit_bounds_enforced() {
        for limit in [0, 31, -5] {
            let query = ListWorkoutsQuery {
                limit: Some(limit),
                ..Default::default()
            };
            assert!(build_workout_filter(&query).is_err(), "limit {limit}");
        }
        let query = ListWorkoutsQuery {
            limit: Some(30),
            ..Default::default()
        };
        assert!(build_workout_filter(&query).is_ok());
    }

    #[test]
    fn page_must_be_positive() {
        let query = ListWorkoutsQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(build_workout_filter(&query).is_err());
    }

    #[test]
    fn date_bounds_parse_rfc3339() {
        let query = ListWorkoutsQuery {
            start_date: Some("2026-01-01T00:00:00Z".to_string()),
            end_date: Some("not-a-date".to_string()),
            ..Default::default()
        };
        assert!(build_workout_filter(&query).is_err());

        let query = ListWorkoutsQuery {
            start_date: Some("2026-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let filter = build_workout_filter(&query).unwrap();
        assert!(filter.start_date.is_some());
    }

    #[test]
    fn set_entries_need_positive_weight() {
        assert!(validate_set_entry(3, 5, 100.0, 0, 0.0).is_ok());
        assert!(validate_set_entry(3, 5, 0.0, 0, 0.0).is_err());
        assert!(validate_set_entry(3, 5, -1.0, 0, 0.0).is_err());
        assert!(validate_set_entry(0, 5, 100.0, 0, 0.0).is_err());
        assert!(validate_set_entry(3, -1, 100.0, 0, 0.0).is_err());
    }
}
