pub mod exercise;
pub mod record;
pub mod user;
pub mod workout;

pub use exercise::Exercise;
pub use record::{NewPersonalRecord, PersonalRecord};
pub use user::{NewUser, User};
pub use workout::{
    LoggedExercise, NewWorkout, NewWorkoutExercise, Workout, WorkoutDetail, WorkoutExercise,
    WorkoutFilter,
};
