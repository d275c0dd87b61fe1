//! Auth module: registration, login and token verification over the store.

pub mod domain;
pub mod service;

pub use service::{AuthService, AuthSettings};
