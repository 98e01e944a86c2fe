//! Window-free core of the driving demo: physics world, car, terrain collider,
//! chase camera and the per-frame simulation tick.
//!
//! The client crate owns everything Bevy-rendering related and feeds this crate
//! with key states and asset load results.

pub mod camera;
pub mod config;
pub mod input;
pub mod physics;
pub mod simulation;
pub mod terrain;
pub mod vehicle;

pub use camera::{aspect_ratio, chase_camera_pose, CameraPose};
pub use config::{ConfigSource, SimConfig, CONFIG_FILE};
pub use input::{DriveIntents, KeyBindings, KeyStates};
pub use physics::{BodyHandle, ContactMaterial, MaterialId, PhysicsWorld};
pub use simulation::{Simulation, StepMode, TickInput, TickReport, FIXED_TIMESTEP};
pub use terrain::{TerrainEvent, TerrainPlacement, TerrainState};
pub use vehicle::{Car, CarDef, CarVisual, WheelPosition, WheelVisual};
