//! HTTP layer for the redirect service: the two tracking endpoints,
//! request extractors, cookie handling and the content-resolution
//! collaborator client.

pub mod content;
pub mod cookies;
pub mod extractors;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, RedirectConfig};
