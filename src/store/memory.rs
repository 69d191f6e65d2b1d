//! In-memory implementation of the [`Store`] contract.
//!
//! `begin` snapshots the whole state, operations mutate the snapshot, and
//! `commit` swaps it back in; `rollback` just drops it. That gives the same
//! all-or-nothing visibility as a database transaction, which is exactly
//! what the atomicity tests need. Not intended for concurrent writers —
//! commits are last-writer-wins.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{
    Exercise, LoggedExercise, NewPersonalRecord, NewUser, NewWorkout, NewWorkoutExercise,
    PersonalRecord, User, Workout, WorkoutExercise, WorkoutFilter,
};
use crate::store::Store;

#[derive(Debug, Clone, Default)]
struct State {
    next_id: i64,
    users: Vec<User>,
    workouts: Vec<Workout>,
    workout_exercises: Vec<WorkoutExercise>,
    exercises: Vec<Exercise>,
    records: HashMap<(i64, i64), PersonalRecord>,
}

impl State {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Transaction handle: a private copy of the store state.
pub struct MemoryTx {
    staged: State,
}

pub struct MemoryStore {
    state: Mutex<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// A store pre-populated with a small exercise catalog, mirroring the
    /// seed migration.
    pub fn with_catalog() -> Self {
        let mut state = State::default();
        for (name, exercise_type, muscle_group) in [
            ("Back Squat", "strength", "legs"),
            ("Bench Press", "strength", "chest"),
            ("Deadlift", "strength", "back"),
            ("Running", "cardio", "legs"),
        ] {
            let id = state.alloc_id();
            state.exercises.push(Exercise {
                id,
                name: name.to_string(),
                exercise_type: exercise_type.to_string(),
                muscle_group: muscle_group.to_string(),
                description: String::new(),
            });
        }
        Self {
            state: Mutex::new(state),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx> {
        let staged = self.state.lock().await.clone();
        Ok(MemoryTx { staged })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<()> {
        *self.state.lock().await = tx.staged;
        Ok(())
    }

    async fn rollback(&self, _tx: Self::Tx) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_user(&self, tx: &mut Self::Tx, user: &NewUser) -> Result<i64> {
        if tx.staged.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::UserAlreadyExists);
        }
        let id = tx.staged.alloc_id();
        tx.staged.users.push(User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
            updated_at: None,
        });
        Ok(id)
    }

    async fn user_by_email(&self, tx: &mut Self::Tx, email: &str) -> Result<Option<User>> {
        Ok(tx.staged.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_workout(&self, tx: &mut Self::Tx, workout: &NewWorkout) -> Result<i64> {
        let id = tx.staged.alloc_id();
        tx.staged.workouts.push(Workout {
            id,
            user_id: workout.user_id,
            date: workout.date,
            name: workout.name.clone(),
            notes: workout.notes.clone(),
            created_at: Utc::now(),
            updated_at: None,
        });
        Ok(id)
    }

    async fn workout_by_id(
        &self,
        tx: &mut Self::Tx,
        workout_id: i64,
        user_id: i64,
    ) -> Result<Option<Workout>> {
        Ok(tx
            .staged
            .workouts
            .iter()
            .find(|w| w.id == workout_id && w.user_id == user_id)
            .cloned())
    }

    async fn list_workouts(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        filter: &WorkoutFilter,
    ) -> Result<Vec<Workout>> {
        let mut workouts: Vec<Workout> = tx
            .staged
            .workouts
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter(|w| filter.start_date.map_or(true, |s| w.created_at >= s))
            .filter(|w| filter.end_date.map_or(true, |e| w.created_at <= e))
            .cloned()
            .collect();
        workouts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(workouts
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn user_owns_workout(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        workout_id: i64,
    ) -> Result<bool> {
        Ok(tx
            .staged
            .workouts
            .iter()
            .any(|w| w.id == workout_id && w.user_id == user_id))
    }

    async fn insert_workout_exercise(
        &self,
        tx: &mut Self::Tx,
        entry: &NewWorkoutExercise,
    ) -> Result<i64> {
        let id = tx.staged.alloc_id();
        tx.staged.workout_exercises.push(WorkoutExercise {
            id,
            workout_id: entry.workout_id,
            exercise_id: entry.exercise_id,
            sets: entry.sets,
            reps: entry.reps,
            weight: entry.weight,
            duration: entry.duration,
            distance: entry.distance,
        });
        Ok(id)
    }

    async fn exercises_by_workout(
        &self,
        tx: &mut Self::Tx,
        workout_id: i64,
    ) -> Result<Vec<LoggedExercise>> {
        let mut logged = Vec::new();
        for entry in tx
            .staged
            .workout_exercises
            .iter()
            .filter(|we| we.workout_id == workout_id)
        {
            let exercise = tx
                .staged
                .exercises
                .iter()
                .find(|e| e.id == entry.exercise_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::Transaction(format!(
                        "workout exercise {} references unknown exercise {}",
                        entry.id, entry.exercise_id
                    ))
                })?;
            logged.push(LoggedExercise {
                entry: entry.clone(),
                exercise,
            });
        }
        Ok(logged)
    }

    async fn list_exercises(
        &self,
        tx: &mut Self::Tx,
        exercise_type: Option<&str>,
    ) -> Result<Vec<Exercise>> {
        let mut exercises: Vec<Exercise> = tx
            .staged
            .exercises
            .iter()
            .filter(|e| exercise_type.map_or(true, |t| e.exercise_type == t))
            .cloned()
            .collect();
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }

    async fn personal_record_for_update(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Option<PersonalRecord>> {
        Ok(tx.staged.records.get(&(user_id, exercise_id)).cloned())
    }

    async fn try_insert_personal_record(
        &self,
        tx: &mut Self::Tx,
        record: &NewPersonalRecord,
    ) -> Result<Option<i64>> {
        let key = (record.user_id, record.exercise_id);
        if tx.staged.records.contains_key(&key) {
            return Ok(None);
        }
        let id = tx.staged.alloc_id();
        tx.staged.records.insert(
            key,
            PersonalRecord {
                id,
                user_id: record.user_id,
                exercise_id: record.exercise_id,
                weight: record.weight,
                reps: record.reps,
                date: record.date,
                notes: None,
            },
        );
        Ok(Some(id))
    }

    async fn update_personal_record(
        &self,
        tx: &mut Self::Tx,
        record: &NewPersonalRecord,
    ) -> Result<()> {
        let key = (record.user_id, record.exercise_id);
        if let Some(existing) = tx.staged.records.get_mut(&key) {
            existing.weight = record.weight;
            existing.reps = record.reps;
            existing.date = record.date;
        }
        Ok(())
    }

    async fn list_personal_records(
        &self,
        tx: &mut Self::Tx,
        user_id: i64,
    ) -> Result<Vec<PersonalRecord>> {
        let mut records: Vec<PersonalRecord> = tx
            .staged
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}
