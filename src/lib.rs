pub mod access;
pub mod config;
pub mod db;
pub mod error;
pub mod locator;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod proto;
pub mod routes;
pub mod search;
pub mod services;
pub mod storage;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{AppError, AppResult};
