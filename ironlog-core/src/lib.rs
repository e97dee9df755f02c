pub mod auth;
pub mod config;
pub mod db;
pub mod error;

pub use config::Config;
pub use error::{AuthError, StoreError};
