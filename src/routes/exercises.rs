use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::Exercise;
use crate::store::Store;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListExercisesQuery {
    #[serde(rename = "type")]
    pub exercise_type: Option<String>,
}

/// Browse the exercise catalog, optionally filtered by type
/// (strength/cardio/mobility).
pub async fn list_exercises<S: Store>(
    State(state): State<AppState<S>>,
    Query(query): Query<ListExercisesQuery>,
) -> Result<Json<Vec<Exercise>>> {
    let exercises = state
        .workouts
        .list_exercises(query.exercise_type.as_deref())
        .await?;
    Ok(Json(exercises))
}
