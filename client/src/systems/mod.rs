//! Client-side game systems
//!
//! Organized into submodules for maintainability.

mod simulation;
mod vehicle;
mod world;

// Re-export everything for easy access from main.rs
pub use simulation::*;
pub use vehicle::*;
pub use world::*;
