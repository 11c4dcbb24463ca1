pub mod tokens;
pub mod users;
pub mod workouts;
