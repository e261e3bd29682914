pub mod api;
pub mod auth;
pub mod config;
pub mod domains;
pub mod error;
pub mod interfaces;
pub mod jobs;
pub mod pagination;
pub mod providers;
pub mod repos;
pub mod scheduler;
pub mod services;

pub use crate::config::Config;
pub use crate::error::{PlaticaError, Result};
pub use crate::pagination::{Window, WindowArgs};
