use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::PersonalRecord;
use crate::store::Store;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PersonalRecordDto {
    pub exercise_id: i64,
    pub weight: f64,
    pub reps: i32,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<PersonalRecord> for PersonalRecordDto {
    fn from(r: PersonalRecord) -> Self {
        PersonalRecordDto {
            exercise_id: r.exercise_id,
            weight: r.weight,
            reps: r.reps,
            date: r.date,
            notes: r.notes,
        }
    }
}

/// The authenticated user's personal records, newest first.
pub async fn list_personal_records<S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PersonalRecordDto>>> {
    let records = state.workouts.list_personal_records(user.user_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
