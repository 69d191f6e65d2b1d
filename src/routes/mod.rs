pub mod auth;
pub mod exercises;
pub mod health;
pub mod records;
pub mod validation;
pub mod workouts;

pub use auth::{login, register};
pub use exercises::list_exercises;
pub use health::health_check;
pub use records::list_personal_records;
pub use workouts::{add_exercise_to_workout, create_workout, get_workout, list_workouts};
