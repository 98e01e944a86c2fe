//! World systems
//!
//! Lighting and the sky colour. The terrain itself is handled by the terrain
//! plugin.

use bevy::prelude::*;

/// Spawn the static lighting
pub fn spawn_world(mut commands: Commands) {
    // Flat white ambient, the scene has no other light source
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 1000.0,
        affects_lightmapped_meshes: true,
    });

    commands.insert_resource(ClearColor(Color::srgb(0.53, 0.72, 0.9)));

    // Soft key light so the boxes read as 3D
    commands.spawn((
        DirectionalLight {
            illuminance: 3000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.7, 0.3, 0.0)),
    ));
}
