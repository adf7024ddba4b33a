//! # Todolist API Server Library
//!
//! HTTP surface of the todolist service: bearer authentication, route
//! handlers and error mapping over the shared access layer.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body extractor with API error rejections
//! - `routes`: API route handlers
//! - `startup`: Store selection and startup seeding

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod startup;
