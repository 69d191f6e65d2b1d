use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{Exercise, NewWorkout, NewWorkoutExercise, Workout, WorkoutDetail};
use crate::routes::validation::{build_workout_filter, validate_set_entry, ListWorkoutsQuery};
use crate::store::Store;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub date: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct CreateWorkoutResponse {
    pub workout_id: i64,
}

/// Workout header as exposed over the API; the owner is implied by the
/// token, so `user_id` stays server-side.
#[derive(Debug, Serialize)]
pub struct WorkoutDto {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub name: String,
    pub notes: String,
}

impl From<Workout> for WorkoutDto {
    fn from(w: Workout) -> Self {
        WorkoutDto {
            id: w.id,
            date: w.date,
            name: w.name,
            notes: w.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoggedExerciseDto {
    pub exercise_id: i64,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
    pub duration: i32,
    pub distance: f64,
    pub exercise: Exercise,
}

#[derive(Debug, Serialize)]
pub struct WorkoutDetailResponse {
    pub workout: WorkoutDto,
    pub exercises: Vec<LoggedExerciseDto>,
}

impl From<WorkoutDetail> for WorkoutDetailResponse {
    fn from(detail: WorkoutDetail) -> Self {
        WorkoutDetailResponse {
            workout: detail.workout.into(),
            exercises: detail
                .exercises
                .into_iter()
                .map(|le| LoggedExerciseDto {
                    exercise_id: le.entry.exercise_id,
                    sets: le.entry.sets,
                    reps: le.entry.reps,
                    weight: le.entry.weight,
                    duration: le.entry.duration,
                    distance: le.entry.distance,
                    exercise: le.exercise,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddExerciseRequest {
    pub exercise_id: i64,
    pub sets: i32,
    #[serde(default)]
    pub reps: i32,
    pub weight: f64,
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub distance: f64,
}

#[derive(Debug, Serialize)]
pub struct AddExerciseResponse {
    pub workout_exercise_id: i64,
}

/// Create a workout for the authenticated user.
pub async fn create_workout<S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<CreateWorkoutResponse>)> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".into()));
    }

    let workout_id = state
        .workouts
        .create_workout(NewWorkout {
            user_id: user.user_id,
            date: payload.date,
            name: payload.name,
            notes: payload.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreateWorkoutResponse { workout_id })))
}

/// List the authenticated user's workouts, newest first.
pub async fn list_workouts<S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListWorkoutsQuery>,
) -> Result<Json<Vec<WorkoutDto>>> {
    let filter = build_workout_filter(&query)?;
    let workouts = state.workouts.list_workouts(user.user_id, filter).await?;
    Ok(Json(workouts.into_iter().map(Into::into).collect()))
}

/// Fetch one workout with everything logged under it.
///
/// A workout owned by someone else answers 404; its existence is not
/// revealed.
pub async fn get_workout<S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<i64>,
) -> Result<Json<WorkoutDetailResponse>> {
    let detail = state.workouts.get_workout(user.user_id, workout_id).await?;
    Ok(Json(detail.into()))
}

/// Log a set under a workout. Also re-evaluates the personal record for the
/// exercise — the insert and the record pass commit or roll back together.
pub async fn add_exercise_to_workout<S: Store>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Path(workout_id): Path<i64>,
    Json(payload): Json<AddExerciseRequest>,
) -> Result<(StatusCode, Json<AddExerciseResponse>)> {
    validate_set_entry(
        payload.sets,
        payload.reps,
        payload.weight,
        payload.duration,
        payload.distance,
    )?;

    let workout_exercise_id = state
        .workouts
        .add_exercise_to_workout(
            user.user_id,
            NewWorkoutExercise {
                workout_id,
                exercise_id: payload.exercise_id,
                sets: payload.sets,
                reps: payload.reps,
                weight: payload.weight,
                duration: payload.duration,
                distance: payload.distance,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddExerciseResponse {
            workout_exercise_id,
        }),
    ))
}
