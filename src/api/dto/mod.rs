//! Data Transfer Objects for HTTP requests and responses.

pub mod fallback;
pub mod health;
