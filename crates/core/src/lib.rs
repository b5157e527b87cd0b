//! Core types and redirect-decision logic for the gotrack service.

pub mod botsig;
pub mod destination;
pub mod error;
pub mod ip;
pub mod params;
pub mod select;
pub mod slug;
pub mod types;

pub use destination::DestinationPolicy;
pub use error::{Error, Result};
pub use types::*;
