//! PostgreSQL implementation of the [`Store`] contract.
//!
//! Every operation is a single parameterized statement executed on the
//! caller's transaction handle. No business logic lives here; the one
//! concurrency-sensitive query (`personal_record_for_update`) takes a row
//! lock so the record tracker's read-compare-write runs serialized per
//! (user, exercise) pair.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, Result};
use crate::models::{
    Exercise, LoggedExercise, NewPersonalRecord, NewUser, NewWorkout, NewWorkoutExercise,
    PersonalRecord, User, Workout, WorkoutExercise, WorkoutFilter,
};
use crate::store::Store;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Flat projection of a set log joined with its catalog row.
#[derive(sqlx::FromRow)]
struct LoggedExerciseRow {
    id: i64,
    workout_id: i64,
    exercise_id: i64,
    sets: i32,
    reps: i32,
    weight: f64,
    duration: i32,
    distance: f64,
    exercise_name: String,
    exercise_type: String,
    muscle_group: String,
    description: String,
}

impl From<LoggedExerciseRow> for LoggedExercise {
    fn from(row: LoggedExerciseRow) -> Self {
        LoggedExercise {
            entry: WorkoutExercise {
                id: row.id,
                workout_id: row.workout_id,
                exercise_id: row.exercise_id,
                sets: row.sets,
                reps: row.reps,
                weight: row.weight,
                duration: row.duration,
                distance: row.distance,
            },
            exercise: Exercise {
                id: row.exercise_id,
                name: row.exercise_name,
                exercise_type: row.exercise_type,
                muscle_group: row.muscle_group,
                description: row.description,
            },
        }
    }
}

#[async_trait]
impl Store for PgStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx> {
        let mut tx = self.pool.begin().await?;
        // The envelope supports exactly one isolation level; make it
        // explicit rather than inheriting the server default.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<()> {
        tx.rollback().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, tx: &mut Self::Tx, user: &NewUser) -> Result<i64> {
        let res = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut **tx)
        .await;

        match res {
            Ok(id) => Ok(id),
            // The unique email index backstops the service-level existence
            // check against concurrent registrations.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::UserAlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn user_by_email(&self, tx: &mut Self::Tx, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(user)
    }

    async fn insert_workout(&self, tx: &mut Self::Tx, workout: &NewWorkout) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO workouts (user_id, date, name, notes) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(workout.user_id)
        .bind(workout.date)
        .bind(&workout.name)
        .bind(&workout.notes)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    async fn workout_by_id(
        &self,
        tx: &mut Self::Tx,
        workout_id: i64,
        user_id: i64,
    ) -> Result<Option<Workout>> {
        let workout = sqlx::query_as::<_, Workout>(
            "SELECT id, user_id, date, name, notes, created_at, updated_at \
             FROM workouts WHERE id = $1 AND user_id = $2",
        )
        .bind(workout_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(workout)
    }

    async fn list_workouts(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        filter: &WorkoutFilter,
    ) -> Result<Vec<Workout>> {
        let workouts = sqlx::query_as::<_, Workout>(
            "SELECT id, user_id, date, name, notes, created_at, updated_at \
             FROM workouts \
             WHERE user_id = $1 \
               AND ($2::timestamptz IS NULL OR created_at >= $2) \
               AND ($3::timestamptz IS NULL OR created_at <= $3) \
             ORDER BY date DESC \
             LIMIT $4 OFFSET $5",
        )
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&mut **tx)
        .await?;
        Ok(workouts)
    }

    async fn user_owns_workout(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        workout_id: i64,
    ) -> Result<bool> {
        let owns = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM workouts WHERE id = $1 AND user_id = $2)",
        )
        .bind(workout_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(owns)
    }

    async fn insert_workout_exercise(
        &self,
        tx: &mut Self::Tx,
        entry: &NewWorkoutExercise,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO workout_exercises \
             (workout_id, exercise_id, sets, reps, weight, duration, distance) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(entry.workout_id)
        .bind(entry.exercise_id)
        .bind(entry.sets)
        .bind(entry.reps)
        .bind(entry.weight)
        .bind(entry.duration)
        .bind(entry.distance)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    async fn exercises_by_workout(
        &self,
        tx: &mut Self::Tx,
        workout_id: i64,
    ) -> Result<Vec<LoggedExercise>> {
        let rows = sqlx::query_as::<_, LoggedExerciseRow>(
            "SELECT we.id, we.workout_id, we.exercise_id, we.sets, we.reps, \
                    we.weight, we.duration, we.distance, \
                    e.name AS exercise_name, e.type AS exercise_type, \
                    e.muscle_group, e.description \
             FROM workout_exercises we \
             JOIN exercises e ON e.id = we.exercise_id \
             WHERE we.workout_id = $1 \
             ORDER BY we.id",
        )
        .bind(workout_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_exercises(
        &self,
        tx: &mut Self::Tx,
        exercise_type: Option<&str>,
    ) -> Result<Vec<Exercise>> {
        let exercises = sqlx::query_as::<_, Exercise>(
            "SELECT id, name, type, muscle_group, description \
             FROM exercises \
             WHERE ($1::text IS NULL OR type = $1) \
             ORDER BY name",
        )
        .bind(exercise_type)
        .fetch_all(&mut **tx)
        .await?;
        Ok(exercises)
    }

    async fn personal_record_for_update(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Option<PersonalRecord>> {
        // FOR UPDATE serializes concurrent read-compare-write sequences on
        // the same pair; without it two writers could both read the stale
        // best and the higher overwrite could be lost.
        let record = sqlx::query_as::<_, PersonalRecord>(
            "SELECT id, user_id, exercise_id, weight, reps, date, notes \
             FROM personal_records \
             WHERE user_id = $1 AND exercise_id = $2 \
             FOR UPDATE",
        )
        .bind(user_id)
        .bind(exercise_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(record)
    }

    async fn try_insert_personal_record(
        &self,
        tx: &mut Self::Tx,
        record: &NewPersonalRecord,
    ) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO personal_records (user_id, exercise_id, weight, reps, date) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, exercise_id) DO NOTHING \
             RETURNING id",
        )
        .bind(record.user_id)
        .bind(record.exercise_id)
        .bind(record.weight)
        .bind(record.reps)
        .bind(record.date)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(id)
    }

    async fn update_personal_record(
        &self,
        tx: &mut Self::Tx,
        record: &NewPersonalRecord,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE personal_records \
             SET weight = $3, reps = $4, date = $5 \
             WHERE user_id = $1 AND exercise_id = $2",
        )
        .bind(record.user_id)
        .bind(record.exercise_id)
        .bind(record.weight)
        .bind(record.reps)
        .bind(record.date)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn list_personal_records(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
    ) -> Result<Vec<PersonalRecord>> {
        let records = sqlx::query_as::<_, PersonalRecord>(
            "SELECT id, user_id, exercise_id, weight, reps, date, notes \
             FROM personal_records \
             WHERE user_id = $1 \
             ORDER BY date DESC",
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(records)
    }
}
