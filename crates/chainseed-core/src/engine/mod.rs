//! # Engine Module
//!
//! The coordinate generators. Everything in here is single-threaded and purely
//! computational, and every sampling routine draws from a caller-supplied
//! random number generator.
//!
//! - **Overlap Testing** ([`overlap`]) - Minimum-image proximity checks against existing points
//! - **Sampling** ([`utils`]) - Isotropic directions and uniform positions in the cell
//! - **Point Placement** ([`placement`]) - Mutually overlap-free points with a per-slot attempt budget
//! - **Chain Growth** ([`chain`]) - Self-avoiding bonded chains with local retries and whole-chain restarts
//! - **Configuration** ([`config`]) - Parameters of a multi-species seeding run
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Generation failures

pub mod chain;
pub mod config;
pub mod error;
pub mod overlap;
pub mod placement;
pub mod progress;
pub mod utils;
