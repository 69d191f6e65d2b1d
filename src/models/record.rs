use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Personal record row: the best (highest estimated one-rep-max) set ever
/// logged for a (user, exercise) pair. At most one row exists per pair,
/// enforced by a unique constraint; improvements update it in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PersonalRecord {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub weight: f64,
    pub reps: i32,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Candidate record written when a logged set beats (or first establishes)
/// the stored best.
#[derive(Debug, Clone)]
pub struct NewPersonalRecord {
    pub user_id: i64,
    pub exercise_id: i64,
    pub weight: f64,
    pub reps: i32,
    pub date: DateTime<Utc>,
}
