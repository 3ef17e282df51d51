//! # Tokengate Shared Library
//!
//! Authentication core shared by the Tokengate API server: principals, the
//! token codec, password hashing, credential authentication and the user
//! store seam.
//!
//! ## Module Organization
//!
//! - `auth`: Authentication and authorization primitives
//! - `models`: User records and the user store

pub mod auth;
pub mod models;

/// Current version of the Tokengate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
