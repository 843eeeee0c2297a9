//! Repository trait definitions for the domain layer.
//!
//! The storage interface is a capability abstraction: the resolver and the
//! metrics worker depend only on [`SlugRepository`], implemented in
//! `crate::infrastructure::persistence` on top of a KV transport.
//!
//! Mock implementations are generated via `mockall` for unit tests.

pub mod slug_repository;

pub use slug_repository::SlugRepository;

#[cfg(test)]
pub use slug_repository::MockSlugRepository;
