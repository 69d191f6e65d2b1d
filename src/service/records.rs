//! Personal-record tracking.
//!
//! Every logged set is compared against the stored best for its
//! (user, exercise) pair using the Epley estimated one-rep-max, which makes
//! lifts at different rep counts comparable: 100kg x 5 (e1RM 116.67) loses
//! to 110kg x 3 (e1RM 121).
//!
//! The read is row-locked and first inserts go through a conflict-tolerant
//! insert, so two concurrent sets for the same pair serialize instead of
//! racing read-then-write and silently dropping the higher lift.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::NewPersonalRecord;
use crate::service::TxManager;
use crate::store::Store;

/// Epley estimated one-rep-max: `weight * (1 + reps/30)`.
pub fn estimated_one_rep_max(weight: f64, reps: i32) -> f64 {
    weight * (1.0 + f64::from(reps) / 30.0)
}

pub struct RecordTracker<S: Store> {
    store: Arc<S>,
    tx: TxManager<S>,
}

impl<S: Store> Clone for RecordTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tx: self.tx.clone(),
        }
    }
}

impl<S: Store> RecordTracker<S> {
    pub fn new(store: Arc<S>, tx: TxManager<S>) -> Self {
        Self { store, tx }
    }

    /// Re-evaluate the personal record for (user, exercise) against a fresh
    /// set, inside the caller's transaction.
    ///
    /// No stored record: the set is unconditionally the first best and is
    /// inserted. Stored record present: it is overwritten in place only when
    /// the new estimated max is strictly higher; otherwise nothing is
    /// written at all. Exactly one insert, one update, or no write.
    pub async fn record_set(
        &self,
        tx: &mut S::Tx,
        user_id: i64,
        exercise_id: i64,
        weight: f64,
        reps: i32,
    ) -> Result<()> {
        let candidate = NewPersonalRecord {
            user_id,
            exercise_id,
            weight,
            reps,
            date: Utc::now(),
        };

        let current = self
            .store
            .personal_record_for_update(tx, user_id, exercise_id)
            .await?;

        let current = match current {
            Some(record) => record,
            None => {
                if self
                    .store
                    .try_insert_personal_record(tx, &candidate)
                    .await?
                    .is_some()
                {
                    tracing::info!(
                        user_id,
                        exercise_id,
                        weight,
                        reps,
                        "first personal record for pair"
                    );
                    return Ok(());
                }
                // Lost the first-insert race to a concurrent writer; the
                // re-read sees their committed row (and locks it), so fall
                // through and compare against the winner.
                self.store
                    .personal_record_for_update(tx, user_id, exercise_id)
                    .await?
                    .ok_or_else(|| {
                        crate::error::AppError::Transaction(
                            "personal record vanished after insert conflict".to_string(),
                        )
                    })?
            }
        };

        let new_max = estimated_one_rep_max(weight, reps);
        let current_max = estimated_one_rep_max(current.weight, current.reps);

        if new_max > current_max {
            self.store.update_personal_record(tx, &candidate).await?;
            tracing::info!(
                user_id,
                exercise_id,
                weight,
                reps,
                new_max,
                current_max,
                "personal record improved"
            );
        }

        Ok(())
    }

    /// Public entry point: runs [`Self::record_set`] in its own
    /// read-committed transaction.
    pub async fn update_personal_record(
        &self,
        user_id: i64,
        exercise_id: i64,
        weight: f64,
        reps: i32,
    ) -> Result<()> {
        self.tx
            .read_committed(|mut tx| async move {
                let result = self
                    .record_set(&mut tx, user_id, exercise_id, weight, reps)
                    .await;
                (tx, result)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tracker() -> (Arc<MemoryStore>, RecordTracker<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let tx = TxManager::new(Arc::clone(&store));
        let tracker = RecordTracker::new(Arc::clone(&store), tx.clone());
        (store, tracker)
    }

    async fn stored_record(store: &Arc<MemoryStore>, user_id: i64, exercise_id: i64) -> (f64, i32) {
        let mut tx = store.begin().await.unwrap();
        let record = store
            .personal_record_for_update(&mut tx, user_id, exercise_id)
            .await
            .unwrap()
            .expect("record should exist");
        store.rollback(tx).await.unwrap();
        (record.weight, record.reps)
    }

    #[test]
    fn epley_formula() {
        assert!((estimated_one_rep_max(100.0, 5) - 116.666_666).abs() < 1e-4);
        assert!((estimated_one_rep_max(110.0, 3) - 121.0).abs() < 1e-9);
        assert!((estimated_one_rep_max(90.0, 5) - 105.0).abs() < 1e-9);
        // Zero reps degenerates to the raw weight.
        assert!((estimated_one_rep_max(120.0, 0) - 120.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn first_set_creates_record() {
        let (store, tracker) = tracker();
        tracker.update_personal_record(1, 5, 100.0, 5).await.unwrap();
        assert_eq!(stored_record(&store, 1, 5).await, (100.0, 5));
    }

    #[tokio::test]
    async fn stronger_set_replaces_record() {
        let (store, tracker) = tracker();
        tracker.update_personal_record(1, 5, 100.0, 5).await.unwrap();
        // e1RM 121 > 116.67 even though the raw weight is at fewer reps.
        tracker.update_personal_record(1, 5, 110.0, 3).await.unwrap();
        assert_eq!(stored_record(&store, 1, 5).await, (110.0, 3));
    }

    #[tokio::test]
    async fn weaker_set_leaves_record_untouched() {
        let (store, tracker) = tracker();
        tracker.update_personal_record(1, 5, 100.0, 5).await.unwrap();
        tracker.update_personal_record(1, 5, 110.0, 3).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let before = store
            .personal_record_for_update(&mut tx, 1, 5)
            .await
            .unwrap()
            .unwrap();
        store.rollback(tx).await.unwrap();

        // e1RM 105 < 121: no write at all, date included.
        tracker.update_personal_record(1, 5, 90.0, 5).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let after = store
            .personal_record_for_update(&mut tx, 1, 5)
            .await
            .unwrap()
            .unwrap();
        store.rollback(tx).await.unwrap();

        assert_eq!(after.weight, before.weight);
        assert_eq!(after.reps, before.reps);
        assert_eq!(after.date, before.date);
    }

    #[tokio::test]
    async fn equal_estimated_max_is_not_an_improvement() {
        let (store, tracker) = tracker();
        tracker.update_personal_record(1, 5, 100.0, 5).await.unwrap();
        tracker.update_personal_record(1, 5, 100.0, 5).await.unwrap();
        assert_eq!(stored_record(&store, 1, 5).await, (100.0, 5));
    }

    #[tokio::test]
    async fn records_are_tracked_per_pair() {
        let (store, tracker) = tracker();
        tracker.update_personal_record(1, 5, 100.0, 5).await.unwrap();
        tracker.update_personal_record(1, 6, 60.0, 8).await.unwrap();
        tracker.update_personal_record(2, 5, 140.0, 1).await.unwrap();

        assert_eq!(stored_record(&store, 1, 5).await, (100.0, 5));
        assert_eq!(stored_record(&store, 1, 6).await, (60.0, 8));
        assert_eq!(stored_record(&store, 2, 5).await, (140.0, 1));
    }
}
