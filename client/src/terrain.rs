//! Terrain asset loading
//!
//! The terrain scene loads in the background. Once its load state settles the
//! scene is spawned (on success) and the outcome is handed to the simulation,
//! which adds the collider on its next tick. Failures are only logged.
//!
//! Updated for Bevy 0.17

use bevy::asset::RecursiveDependencyLoadState;
use bevy::prelude::*;
use drive_shared::{TerrainEvent, TerrainPlacement};

use crate::systems::{DemoConfig, DrivingSim};

/// Marker for the spawned terrain scene
#[derive(Component)]
pub struct TerrainScene;

/// In-flight terrain load. Removed once the outcome is known.
#[derive(Resource)]
pub struct TerrainLoad {
    pub handle: Handle<Scene>,
}

/// Plugin for terrain loading
pub struct TerrainPlugin;

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, start_terrain_load);
        app.add_systems(
            Update,
            poll_terrain_load.run_if(resource_exists::<TerrainLoad>),
        );
    }
}

fn start_terrain_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<DemoConfig>,
) {
    let path = config.0.terrain_asset.clone();
    info!("Loading terrain scene {}", path);
    let handle: Handle<Scene> = asset_server.load(path);
    commands.insert_resource(TerrainLoad { handle });
}

fn poll_terrain_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    load: Res<TerrainLoad>,
    config: Res<DemoConfig>,
    mut sim: ResMut<DrivingSim>,
) {
    let event = match asset_server.get_recursive_dependency_load_state(&load.handle) {
        Some(RecursiveDependencyLoadState::Loaded) => {
            let transform = config.0.terrain.scene_transform();
            commands.spawn((TerrainScene, SceneRoot(load.handle.clone()), transform));
            info!("Terrain scene loaded");
            // The collider covers the scene as spawned
            TerrainEvent::Ready(TerrainPlacement::from_scene(&transform))
        }
        Some(RecursiveDependencyLoadState::Failed(err)) => TerrainEvent::Failed(err.to_string()),
        // Still loading
        _ => return,
    };

    sim.0.queue_terrain_event(event);
    commands.remove_resource::<TerrainLoad>();
}
