use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Exercise;

/// Workout header row. Owned by exactly one user; read-only after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub name: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating a workout.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub name: String,
    pub notes: String,
}

/// One logged performance of an exercise within a workout. Written exactly
/// once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutExercise {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
    pub duration: i32,
    pub distance: f64,
}

/// Parameters for logging a set within a workout.
#[derive(Debug, Clone)]
pub struct NewWorkoutExercise {
    pub workout_id: i64,
    pub exercise_id: i64,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
    pub duration: i32,
    pub distance: f64,
}

/// A set log joined with its catalog entry, for display.
#[derive(Debug, Clone, Serialize)]
pub struct LoggedExercise {
    pub entry: WorkoutExercise,
    pub exercise: Exercise,
}

/// A workout header together with everything logged under it.
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutDetail {
    pub workout: Workout,
    pub exercises: Vec<LoggedExercise>,
}

/// Validated list filter. Built by the boundary layer (see
/// `routes::validation`); the store consumes it as-is.
#[derive(Debug, Clone, Default)]
pub struct WorkoutFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}
