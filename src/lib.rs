//! SushiDB console library exports

pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod pages;
pub mod poll;
pub mod query;
pub mod resource;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ConsoleError, Result};
