//! # Core Module
//!
//! Fundamental building blocks shared by the generators and the workflows.
//!
//! - **Models** ([`models`]) - The periodic cell and assembled configurations
//! - **Geometry** ([`utils`]) - Minimum-image displacement and distance
//! - **File I/O** ([`io`]) - Reading and writing configurations as extended XYZ

pub mod io;
pub mod models;
pub mod utils;
