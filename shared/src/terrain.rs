//! Terrain collider.
//!
//! The terrain is a decorative glTF scene loaded asynchronously by the client.
//! Physics only sees a static box covering the scene's footprint, added once
//! the load completes.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::physics::{BodyDesc, BodyHandle, BodyKind, BodyShape, MaterialId, PhysicsWorld};

/// Default terrain scene, relative to the asset folder.
pub const TERRAIN_ASSET_PATH: &str = "Free_Terrain_003.glb#Scene0";
pub const TERRAIN_SCALE: Vec3 = Vec3::new(16.0, 8.0, 16.0);
pub const TERRAIN_POSITION: Vec3 = Vec3::new(0.0, -1.0, 0.0);
/// Half height of the collider slab, independent of the scene's Y scale.
pub const TERRAIN_HALF_HEIGHT: f32 = 1.0;

/// Where the terrain scene is placed and how big it is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainPlacement {
    pub scale: Vec3,
    pub position: Vec3,
}

impl Default for TerrainPlacement {
    fn default() -> Self {
        Self {
            scale: TERRAIN_SCALE,
            position: TERRAIN_POSITION,
        }
    }
}

impl TerrainPlacement {
    /// Placement of a scene already spawned with `transform`.
    pub fn from_scene(transform: &Transform) -> Self {
        Self {
            scale: transform.scale,
            position: transform.translation,
        }
    }

    /// Transform to spawn the terrain scene with.
    pub fn scene_transform(&self) -> Transform {
        Transform::from_translation(self.position).with_scale(self.scale)
    }

    pub fn collider_half_extents(&self) -> Vec3 {
        Vec3::new(self.scale.x / 2.0, TERRAIN_HALF_HEIGHT, self.scale.z / 2.0)
    }

    /// Register the static footprint box with the world.
    pub fn add_to_world(&self, world: &mut PhysicsWorld) -> BodyHandle {
        world.add_body(BodyDesc {
            kind: BodyKind::Fixed,
            mass: 0.0,
            shape: BodyShape::Cuboid {
                half_extents: self.collider_half_extents(),
            },
            position: self.position,
            material: MaterialId::DEFAULT,
        })
    }
}

/// Outcome of the asynchronous terrain load.
#[derive(Clone, Debug, PartialEq)]
pub enum TerrainEvent {
    Ready(TerrainPlacement),
    Failed(String),
}

/// Terrain lifecycle as seen by the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TerrainState {
    #[default]
    Pending,
    Ready(BodyHandle),
    Failed,
}

impl TerrainState {
    pub fn body(&self) -> Option<BodyHandle> {
        match self {
            TerrainState::Ready(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Fold a load outcome into the world. Terrain is created at most once.
    pub fn integrate(&mut self, event: &TerrainEvent, world: &mut PhysicsWorld) {
        match (*self, event) {
            (TerrainState::Ready(_), TerrainEvent::Ready(_)) => {
                warn!("Terrain already present, ignoring second load result");
            }
            (_, TerrainEvent::Ready(placement)) => {
                let handle = placement.add_to_world(world);
                info!(
                    "Terrain collider added at {:?} with half extents {:?}",
                    placement.position,
                    placement.collider_half_extents()
                );
                *self = TerrainState::Ready(handle);
            }
            (TerrainState::Ready(_), TerrainEvent::Failed(reason)) => {
                warn!("Ignoring terrain failure after terrain was added: {}", reason);
            }
            (_, TerrainEvent::Failed(reason)) => {
                error!("Error loading terrain model: {}", reason);
                *self = TerrainState::Failed;
            }
        }
    }
}
