//! # Drinks server
//! This crate hosts the HTTP server for the drinks menu. It is responsible for:
//! * Serving the public menu, and the full recipes to callers that are allowed to see them.
//! * Verifying bearer tokens issued by a third-party identity provider against its published signing keys.
//! * Checking that a token carries the permission a route requires before the menu is changed.
//!
//! Storage lives in the `drink_engine` crate.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! See [routes](routes/index.html) for the list of routes and the permissions they require.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;
