//! Chase camera
//!
//! Updated for Bevy 0.17

use bevy::prelude::*;
use bevy::window::WindowResized;
use drive_shared::aspect_ratio;

use crate::systems::{DemoConfig, DrivingSim};

/// Marker for the chase camera
#[derive(Component)]
pub struct ChaseCamera;

/// Spawn the perspective camera at the simulation's initial chase pose
pub fn spawn_camera(mut commands: Commands, config: Res<DemoConfig>, sim: Res<DrivingSim>) {
    let config = &config.0;
    commands.spawn((
        ChaseCamera,
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: config.camera_fov_degrees.to_radians(),
            near: config.camera_near,
            far: config.camera_far,
            aspect_ratio: aspect_ratio(config.window_width as f32, config.window_height as f32),
            ..default()
        }),
        sim.0.camera().transform(),
    ));
}

/// Snap the camera to the pose computed by this frame's tick.
/// The car transform it follows is already synced, so no smoothing.
pub fn update_camera(
    sim: Res<DrivingSim>,
    mut camera_query: Query<&mut Transform, With<ChaseCamera>>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };
    *camera_transform = sim.0.camera().transform();
}

/// Recompute the projection's aspect ratio when the window changes size.
/// Bevy resizes the surface itself.
pub fn handle_window_resize(
    mut resize_events: MessageReader<WindowResized>,
    mut camera_query: Query<&mut Projection, With<ChaseCamera>>,
) {
    let Some(resized) = resize_events.read().last() else {
        return;
    };

    let Ok(mut projection) = camera_query.single_mut() else {
        return;
    };

    let Projection::Perspective(ref mut persp) = *projection else {
        return;
    };

    persp.aspect_ratio = aspect_ratio(resized.width, resized.height);
    debug!(
        "Window resized to {}x{}, aspect {:.3}",
        resized.width, resized.height, persp.aspect_ratio
    );
}
