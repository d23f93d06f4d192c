//! # Workflows Module
//!
//! High-level entry points that drive the generators end to end.
//!
//! - **Seeding Workflow** ([`seed`]) - Places every species of a
//!   [`SystemConfig`](crate::engine::config::SystemConfig) in order and returns
//!   the assembled [`Configuration`](crate::core::models::configuration::Configuration).

pub mod seed;
