pub mod auth;

pub use auth::{admin_only_middleware, caller_identity_middleware, CustomerClaims};
