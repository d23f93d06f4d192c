//! # chainseed Core Library
//!
//! Generates overlap-free initial configurations (isolated points and
//! self-avoiding bonded chains) inside a periodic cubic simulation cell, for
//! seeding molecular simulations.
//!
//! ## Architecture
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`PeriodicBox`,
//!   `Configuration`), minimum-image geometry and file I/O.
//!
//! - **[`engine`]: The Generators.** Overlap testing, direction sampling, uniform
//!   point placement and chain growth. Every sampling routine takes an explicit
//!   random number generator, so results are reproducible for a fixed seed.
//!
//! - **[`workflows`]: The Public API.** Seeds a complete multi-species system
//!   from a [`engine::config::SystemConfig`].
//!
//! The four primitive operations are re-exported at the crate root:
//! [`wrap`], [`generate_points`], [`sample_direction`] and [`build_chain`].

pub mod core;
pub mod engine;
pub mod workflows;

pub use crate::core::models::cell::{PeriodicBox, Position};
pub use crate::core::utils::geometry::wrap;
pub use crate::engine::chain::{ChainParams, build_chain};
pub use crate::engine::error::GenerationError;
pub use crate::engine::placement::generate_points;
pub use crate::engine::utils::sampling::sample_direction;
