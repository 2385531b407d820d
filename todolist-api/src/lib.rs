//! # Todolist API Server Library
//!
//! HTTP surface of the todolist backend. The domain lives in
//! `todolist-shared`; this crate maps it onto routes.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and auth layers
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors that reject with the API error body
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
