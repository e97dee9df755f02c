//! The narrow persistence interface the HTTP layer talks to.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::models::{NewUser, User, Workout, WorkoutSession, WorkoutSet};
use crate::db::operations::{self, Result};

/// Lists come back newest-first and are empty rather than an error when
/// nothing matches. Writes that take an owner id only touch rows owned by it.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> Result<User>;
    async fn find_user_by_email(&self, email: &str) -> Result<User>;

    async fn create_session(&self, user_id: i64) -> Result<WorkoutSession>;
    async fn list_sessions(&self, user_id: i64) -> Result<Vec<WorkoutSession>>;

    async fn create_workout(
        &self,
        session_id: i64,
        workout_name: &str,
        user_id: i64,
    ) -> Result<Workout>;
    async fn list_workouts(&self, session_id: i64) -> Result<Vec<Workout>>;
    async fn find_previous_workout_id(
        &self,
        workout_name: &str,
        user_id: i64,
    ) -> Result<Option<i64>>;

    async fn create_set(
        &self,
        workout_id: i64,
        user_id: i64,
        number_of_reps: i64,
        weight: f64,
    ) -> Result<WorkoutSet>;
    async fn list_sets(&self, workout_id: i64) -> Result<Vec<WorkoutSet>>;
}

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        operations::create_user(&self.pool, user).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        operations::find_user_by_email(&self.pool, email).await
    }

    async fn create_session(&self, user_id: i64) -> Result<WorkoutSession> {
        operations::create_session(&self.pool, user_id).await
    }

    async fn list_sessions(&self, user_id: i64) -> Result<Vec<WorkoutSession>> {
        operations::list_sessions(&self.pool, user_id).await
    }

    async fn create_workout(
        &self,
        session_id: i64,
        workout_name: &str,
        user_id: i64,
    ) -> Result<Workout> {
        operations::create_workout(&self.pool, session_id, workout_name, user_id).await
    }

    async fn list_workouts(&self, session_id: i64) -> Result<Vec<Workout>> {
        operations::list_workouts(&self.pool, session_id).await
    }

    async fn find_previous_workout_id(
        &self,
        workout_name: &str,
        user_id: i64,
    ) -> Result<Option<i64>> {
        operations::find_previous_workout_id(&self.pool, workout_name, user_id).await
    }

    async fn create_set(
        &self,
        workout_id: i64,
        user_id: i64,
        number_of_reps: i64,
        weight: f64,
    ) -> Result<WorkoutSet> {
        operations::create_set(&self.pool, workout_id, user_id, number_of_reps, weight).await
    }

    async fn list_sets(&self, workout_id: i64) -> Result<Vec<WorkoutSet>> {
        operations::list_sets(&self.pool, workout_id).await
    }
}
