//! Workout orchestration: creation, listing, read-assembly, and the
//! transactional append of a logged set.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{
    Exercise, NewWorkout, NewWorkoutExercise, PersonalRecord, Workout, WorkoutDetail,
    WorkoutFilter,
};
use crate::service::{RecordTracker, TxManager};
use crate::store::Store;

pub struct WorkoutService<S: Store> {
    store: Arc<S>,
    tx: TxManager<S>,
    records: RecordTracker<S>,
}

impl<S: Store> Clone for WorkoutService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tx: self.tx.clone(),
            records: self.records.clone(),
        }
    }
}

impl<S: Store> WorkoutService<S> {
    pub fn new(store: Arc<S>, tx: TxManager<S>, records: RecordTracker<S>) -> Self {
        Self { store, tx, records }
    }

    pub async fn create_workout(&self, workout: NewWorkout) -> Result<i64> {
        self.tx
            .read_committed(|mut tx| async move {
                let result = self.store.insert_workout(&mut tx, &workout).await;
                (tx, result)
            })
            .await
    }

    pub async fn list_workouts(&self, user_id: i64, filter: WorkoutFilter) -> Result<Vec<Workout>> {
        self.tx
            .read_committed(|mut tx| async move {
                let result = self.store.list_workouts(&mut tx, user_id, &filter).await;
                (tx, result)
            })
            .await
    }

    /// Read-assemble a workout header plus its logged exercises as one
    /// consistent snapshot. Ownership is enforced by the lookup predicate: a
    /// workout that exists under another user is indistinguishable from one
    /// that does not exist.
    pub async fn get_workout(&self, user_id: i64, workout_id: i64) -> Result<WorkoutDetail> {
        self.tx
            .read_committed(|mut tx| async move {
                let result = self.assemble_workout(&mut tx, user_id, workout_id).await;
                (tx, result)
            })
            .await
    }

    async fn assemble_workout(
        &self,
        tx: &mut S::Tx,
        user_id: i64,
        workout_id: i64,
    ) -> Result<WorkoutDetail> {
        let workout = self
            .store
            .workout_by_id(tx, workout_id, user_id)
            .await?
            .ok_or(AppError::WorkoutNotFound)?;
        let exercises = self.store.exercises_by_workout(tx, workout_id).await?;
        Ok(WorkoutDetail { workout, exercises })
    }

    /// Atomically verify ownership, insert the set log, and re-evaluate the
    /// personal record. Any failure rolls back the whole unit: never a set
    /// log without its record-tracking pass, and never the reverse.
    pub async fn add_exercise_to_workout(
        &self,
        user_id: i64,
        entry: NewWorkoutExercise,
    ) -> Result<i64> {
        self.tx
            .read_committed(|mut tx| async move {
                let result = self.append_exercise(&mut tx, user_id, &entry).await;
                (tx, result)
            })
            .await
    }

    async fn append_exercise(
        &self,
        tx: &mut S::Tx,
        user_id: i64,
        entry: &NewWorkoutExercise,
    ) -> Result<i64> {
        // Same transaction as the insert below, so the workout cannot be
        // reassigned or deleted between check and use.
        if !self
            .store
            .user_owns_workout(tx, user_id, entry.workout_id)
            .await?
        {
            tracing::warn!(
                user_id,
                workout_id = entry.workout_id,
                "append to missing or foreign workout"
            );
            return Err(AppError::WorkoutNotFound);
        }

        let id = self.store.insert_workout_exercise(tx, entry).await?;

        self.records
            .record_set(tx, user_id, entry.exercise_id, entry.weight, entry.reps)
            .await?;

        Ok(id)
    }

    pub async fn list_personal_records(&self, user_id: i64) -> Result<Vec<PersonalRecord>> {
        self.tx
            .read_committed(|mut tx| async move {
                let result = self.store.list_personal_records(&mut tx, user_id).await;
                (tx, result)
            })
            .await
    }

    pub async fn list_exercises(&self, exercise_type: Option<&str>) -> Result<Vec<Exercise>> {
        self.tx
            .read_committed(|mut tx| async move {
                let result = self.store.list_exercises(&mut tx, exercise_type).await;
                (tx, result)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::records::estimated_one_rep_max;
    use crate::store::{MemoryStore, Store};
    use chrono::Utc;

    fn service() -> (Arc<MemoryStore>, WorkoutService<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_catalog());
        let tx = TxManager::new(Arc::clone(&store));
        let records = RecordTracker::new(Arc::clone(&store), tx.clone());
        let service = WorkoutService::new(Arc::clone(&store), tx, records);
        (store, service)
    }

    fn entry(workout_id: i64, exercise_id: i64, weight: f64, reps: i32) -> NewWorkoutExercise {
        NewWorkoutExercise {
            workout_id,
            exercise_id,
            sets: 3,
            reps,
            weight,
            duration: 0,
            distance: 0.0,
        }
    }

    async fn create_workout_for(service: &WorkoutService<MemoryStore>, user_id: i64) -> i64 {
        service
            .create_workout(NewWorkout {
                user_id,
                date: Utc::now(),
                name: "push day".to_string(),
                notes: String::new(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn get_workout_assembles_exercises() {
        let (_store, service) = service();
        let workout_id = create_workout_for(&service, 1).await;
        service
            .add_exercise_to_workout(1, entry(workout_id, 1, 100.0, 5))
            .await
            .unwrap();
        service
            .add_exercise_to_workout(1, entry(workout_id, 2, 80.0, 8))
            .await
            .unwrap();

        let detail = service.get_workout(1, workout_id).await.unwrap();
        assert_eq!(detail.workout.id, workout_id);
        assert_eq!(detail.exercises.len(), 2);
        assert_eq!(detail.exercises[0].exercise.name, "Back Squat");
    }

    #[tokio::test]
    async fn get_workout_hides_foreign_workouts() {
        let (_store, service) = service();
        let workout_id = create_workout_for(&service, 1).await;

        let err = service.get_workout(2, workout_id).await.unwrap_err();
        assert!(matches!(err, AppError::WorkoutNotFound));
    }

    #[tokio::test]
    async fn append_to_foreign_workout_writes_nothing() {
        let (_store, service) = service();
        let workout_id = create_workout_for(&service, 1).await;

        let err = service
            .add_exercise_to_workout(2, entry(workout_id, 1, 100.0, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::WorkoutNotFound));

        // No set log and no record for the rejected caller.
        let owner_view = service.get_workout(1, workout_id).await.unwrap();
        assert!(owner_view.exercises.is_empty());
        assert!(service.list_personal_records(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_updates_personal_record() {
        let (_store, service) = service();
        let workout_id = create_workout_for(&service, 1).await;

        service
            .add_exercise_to_workout(1, entry(workout_id, 1, 100.0, 5))
            .await
            .unwrap();
        service
            .add_exercise_to_workout(1, entry(workout_id, 1, 110.0, 3))
            .await
            .unwrap();
        service
            .add_exercise_to_workout(1, entry(workout_id, 1, 90.0, 5))
            .await
            .unwrap();

        let records = service.list_personal_records(1).await.unwrap();
        assert_eq!(records.len(), 1, "at most one record per pair");
        assert_eq!(records[0].weight, 110.0);
        assert_eq!(records[0].reps, 3);
        // The stored best matches the max e1RM over every logged set.
        let best = estimated_one_rep_max(records[0].weight, records[0].reps);
        for (w, r) in [(100.0, 5), (110.0, 3), (90.0, 5)] {
            assert!(best >= estimated_one_rep_max(w, r));
        }
    }

    #[tokio::test]
    async fn list_workouts_orders_by_date_descending() {
        let (_store, service) = service();
        for day in 1..=3 {
            service
                .create_workout(NewWorkout {
                    user_id: 1,
                    date: Utc::now() - chrono::Duration::days(day),
                    name: format!("day -{day}"),
                    notes: String::new(),
                })
                .await
                .unwrap();
        }

        let filter = WorkoutFilter {
            limit: 10,
            offset: 0,
            ..Default::default()
        };
        let workouts = service.list_workouts(1, filter).await.unwrap();
        assert_eq!(workouts.len(), 3);
        assert!(workouts.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[tokio::test]
    async fn list_workouts_applies_limit_and_offset() {
        let (store, service) = service();
        for day in 0..5 {
            service
                .create_workout(NewWorkout {
                    user_id: 1,
                    date: Utc::now() - chrono::Duration::days(day),
                    name: format!("w{day}"),
                    notes: String::new(),
                })
                .await
                .unwrap();
        }

        let filter = WorkoutFilter {
            limit: 2,
            offset: 2,
            ..Default::default()
        };
        let page = service.list_workouts(1, filter).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "w2");

        // Sanity: the store still holds all five.
        let mut tx = store.begin().await.unwrap();
        let all = store
            .list_workouts(
                &mut tx,
                1,
                &WorkoutFilter {
                    limit: 100,
                    offset: 0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store.rollback(tx).await.unwrap();
        assert_eq!(all.len(), 5);
    }
}
