//! HTTP request handlers.
//!
//! Each handler module corresponds to one public endpoint.

pub mod fallback;
pub mod health;
pub mod redirect;

pub use fallback::fallback_handler;
pub use health::health_handler;
pub use redirect::redirect_handler;
