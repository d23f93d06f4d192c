//! Provides input/output functionality for generated configurations.
//!
//! Configurations are stored as extended XYZ files, which carry the periodic
//! lattice and per-atom molecule indices in the comment line so that a file
//! can be read back and validated.

pub mod traits;
pub mod xyz;
