//! Data models for periodic cells and generated configurations.
//!
//! [`cell`] holds the validated cubic box every generator works in, and
//! [`configuration`] holds the molecules produced by a full seeding run along
//! with the invariant checker used to verify them.

pub mod cell;
pub mod configuration;
