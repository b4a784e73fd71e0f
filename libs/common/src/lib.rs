//! Common library for the clipdeck application
//!
//! This crate provides shared functionality used across the clipdeck
//! workspace, including service configuration, database connectivity and
//! the application-wide error taxonomy.

pub mod config;
pub mod database;
pub mod error;
