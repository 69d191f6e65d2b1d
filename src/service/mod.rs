pub mod auth;
pub mod records;
pub mod tx;
pub mod workouts;

pub use auth::{AuthService, LoginOutcome};
pub use records::{estimated_one_rep_max, RecordTracker};
pub use tx::TxManager;
pub use workouts::WorkoutService;
