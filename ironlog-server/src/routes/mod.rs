pub mod health;
pub mod login;
pub mod sessions;
pub mod sets;
pub mod workouts;
