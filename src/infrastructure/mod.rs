//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for the KV store and slug persistence.
//!
//! # Modules
//!
//! - [`kv`] - KV transports (in-memory, HTTP, Redis) with retry and backoff
//! - [`persistence`] - Slug repository on top of a KV transport

pub mod kv;
pub mod persistence;
