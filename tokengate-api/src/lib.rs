//! # Tokengate API Server Library
//!
//! Stateless JWT gate in front of an Axum application: a login stage that
//! trades credentials for a signed token, a verification stage that checks
//! the token on every other request, and a failure translator that turns
//! every security failure into one sanitized response plus one audit record.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Failure taxonomy and response parking
//! - `middleware`: The security pipeline stages
//! - `routes`: API route handlers
//! - `telemetry`: Tracing subscriber setup

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod telemetry;
