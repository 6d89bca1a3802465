//! Microblog Shared Library
//!
//! Wire types, validation rules and domain errors shared between the
//! backend and any client of the API.

pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
