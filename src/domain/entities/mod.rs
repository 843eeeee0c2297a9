//! Core domain entities representing the redirect data model.
//!
//! # Entity Types
//!
//! - [`SlugRecord`] - A short code with its ordered destinations
//! - [`DestinationRecord`] - A named group of interchangeable target URLs
//! - [`RedirectConfig`] - The narrowed projection read on the redirect path
//! - [`Slot`] - One selectable `(destination, url)` pair
//! - [`Resolution`] - The redirect decision for a request
//!
//! Creation inputs (`NewSlug`, `NewDestination`, `DestinationEdit`) are kept
//! separate from stored records.

pub mod destination;
pub mod redirect_config;
pub mod resolution;
pub mod slug;

pub use destination::{DestinationEdit, DestinationRecord, DestinationWithClicks, NewDestination};
pub use redirect_config::{RedirectConfig, RedirectDestination, Slot};
pub use resolution::{FallbackReason, Resolution};
pub use slug::{NewSlug, SlugDetails, SlugRecord, SlugSummary};
