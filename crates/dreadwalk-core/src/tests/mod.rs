//! Crate-level determinism and integration tests.
//!
//! Unit tests live beside their modules; these suites drive whole frames
//! through [`Simulation`](crate::simulation::Simulation):
//! - **Determinism tests**: identical scenes and input give identical frames
//! - **Integration tests**: shooting, walking, jumping and pursuit end to end
//! - **Helper functions**: scene setup and state queries
//!
//! # Test Structure
//!
//! - `determinism.rs`: Replay and restart checks, plus property tests over input
//! - `integration.rs`: End-to-end frame scenarios
//! - `helpers.rs`: Test setup utilities and factory functions

mod helpers;

// Re-export for convenience
pub use helpers::*;
