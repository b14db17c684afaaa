//! Recipe platform REST service
//!
//! Handlers live in [`routes`], orchestration in [`services`], and all SQL
//! behind the [`repositories`]. The binary in `main.rs` wires these onto a
//! pool and serves them.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
