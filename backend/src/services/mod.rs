//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the authentication primitives.

pub mod post;
pub mod user;

pub use post::PostService;
pub use user::UserService;
