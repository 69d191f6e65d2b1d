//! Persistence capability.
//!
//! [`Store`] is the single seam between business logic and storage: every
//! operation takes an explicit transaction handle (`&mut Self::Tx`), so a
//! callee always runs inside whatever transaction its caller opened. Only
//! [`crate::service::TxManager`] begins, commits, or rolls back.
//!
//! Two implementations: [`PgStore`] against PostgreSQL, and [`MemoryStore`],
//! an in-process fake with real all-or-nothing commit semantics that the
//! tests substitute for the database.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Exercise, LoggedExercise, NewPersonalRecord, NewUser, NewWorkout, NewWorkoutExercise,
    PersonalRecord, User, Workout, WorkoutFilter,
};

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Transaction handle passed through every operation.
    type Tx: Send;

    /// Begin a read-committed transaction.
    async fn begin(&self) -> Result<Self::Tx>;
    async fn commit(&self, tx: Self::Tx) -> Result<()>;
    async fn rollback(&self, tx: Self::Tx) -> Result<()>;

    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<()>;

    // --- users ---

    async fn insert_user(&self, tx: &mut Self::Tx, user: &NewUser) -> Result<i64>;
    async fn user_by_email(&self, tx: &mut Self::Tx, email: &str) -> Result<Option<User>>;

    // --- workouts ---

    async fn insert_workout(&self, tx: &mut Self::Tx, workout: &NewWorkout) -> Result<i64>;

    /// Fetch a workout by id, scoped to its owner. `None` when the workout
    /// is absent or belongs to a different user; the ownership check lives
    /// in the query predicate.
    async fn workout_by_id(
        &self,
        tx: &mut Self::Tx,
        workout_id: i64,
        user_id: i64,
    ) -> Result<Option<Workout>>;

    /// List a user's workouts, date descending, with inclusive created_at
    /// bounds and limit/offset from the validated filter.
    async fn list_workouts(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        filter: &WorkoutFilter,
    ) -> Result<Vec<Workout>>;

    async fn user_owns_workout(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        workout_id: i64,
    ) -> Result<bool>;

    async fn insert_workout_exercise(
        &self,
        tx: &mut Self::Tx,
        entry: &NewWorkoutExercise,
    ) -> Result<i64>;

    /// Set logs for a workout, each joined with its catalog entry.
    async fn exercises_by_workout(
        &self,
        tx: &mut Self::Tx,
        workout_id: i64,
    ) -> Result<Vec<LoggedExercise>>;

    // --- exercise catalog ---

    async fn list_exercises(
        &self,
        tx: &mut Self::Tx,
        exercise_type: Option<&str>,
    ) -> Result<Vec<Exercise>>;

    // --- personal records ---

    /// Fetch the stored best for (user, exercise), locking the row against
    /// concurrent writers for the remainder of the transaction. `None` means
    /// no set was ever logged for the pair — an expected branch, not an
    /// error.
    async fn personal_record_for_update(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Option<PersonalRecord>>;

    /// Insert a first-ever record. Returns `None` when a concurrent writer
    /// created the row first (unique-constraint conflict), in which case the
    /// caller re-reads and compares against the winner.
    async fn try_insert_personal_record(
        &self,
        tx: &mut Self::Tx,
        record: &NewPersonalRecord,
    ) -> Result<Option<i64>>;

    /// Overwrite the stored best for (user, exercise) in place.
    async fn update_personal_record(
        &self,
        tx: &mut Self::Tx,
        record: &NewPersonalRecord,
    ) -> Result<()>;

    /// All of a user's records, date descending.
    async fn list_personal_records(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
    ) -> Result<Vec<PersonalRecord>>;
}
