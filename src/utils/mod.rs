//! Small helpers shared by the storage and request layers.
//!
//! - [`slug`] - slug normalization and format validation
//! - [`url_check`] - destination URL checks and display names
//! - [`hash`] - FNV-1a hashing for dedupe fingerprints
//! - [`id`] - destination id generation
//! - [`flag`] - coercion of loosely typed `enabled` flags

pub mod flag;
pub mod hash;
pub mod id;
pub mod slug;
pub mod url_check;
