//! HTTP layer for request/response handling.
//!
//! This layer translates HTTP requests into domain operations and formats
//! responses.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for query and response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing middleware

pub mod dto;
pub mod handlers;
pub mod middleware;
