//! Car visuals
//!
//! Spawns the car meshes and copies the simulation's car visual state onto them
//! every frame.
//!
//! The chassis and wheel entities are top-level and take their body poses
//! directly. The group entity carries the heading: the cabin and the heading
//! marker are its children, so they turn with the car while steering.

use bevy::prelude::*;
use drive_shared::WheelPosition;

use super::DrivingSim;

// =============================================================================
// COMPONENTS
// =============================================================================

/// The car's transform group (position follows the chassis, yaw is the heading)
#[derive(Component)]
pub struct CarGroup;

/// Cabin on top of the chassis, child of the group (turns with the heading)
#[derive(Component)]
pub struct CarCabin;

/// Chassis mesh, paired with the chassis body
#[derive(Component)]
pub struct ChassisVisual;

/// Wheel entity, paired with one wheel body
#[derive(Component, Clone, Copy)]
pub struct WheelVisualSlot(pub WheelPosition);

/// Child of a wheel entity that carries the cosmetic spin
#[derive(Component, Clone, Copy)]
pub struct WheelSpin(pub WheelPosition);

// =============================================================================
// SPAWNING
// =============================================================================

/// Spawn the chassis, wheels and heading group at the car's initial visual pose
pub fn spawn_car_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    sim: Res<DrivingSim>,
) {
    let car = sim.0.car();
    let def = car.def();
    let visual = car.visual();

    // Red body, black tyres
    let body_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.0, 0.0),
        perceptual_roughness: 0.6,
        ..default()
    });
    let tyre_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.0, 0.0, 0.0),
        perceptual_roughness: 0.9,
        ..default()
    });
    let marker_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.85, 0.2),
        emissive: bevy::color::LinearRgba::new(2.0, 1.6, 0.3, 1.0),
        ..default()
    });

    let cabin_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.75, 0.05, 0.05),
        perceptual_roughness: 0.3,
        ..default()
    });

    // === GROUP + CABIN + HEADING MARKER ===
    let half = def.chassis_half_extents;
    let cabin_size = Vec3::new(half.x * 1.6, 0.5, half.z);
    let cabin = meshes.add(Cuboid::from_size(cabin_size));
    let marker = meshes.add(Cone {
        radius: 0.2,
        height: 0.6,
    });
    commands
        .spawn((
            CarGroup,
            visual.group,
            Visibility::Inherited,
        ))
        .with_children(|parent| {
            // Sits on the roof, set back from the nose
            parent.spawn((
                CarCabin,
                Mesh3d(cabin),
                MeshMaterial3d(cabin_material),
                Transform::from_xyz(0.0, half.y + cabin_size.y * 0.5, half.z * 0.25),
            ));
            // Points along -Z (the drive direction at zero heading)
            parent.spawn((
                Mesh3d(marker),
                MeshMaterial3d(marker_material.clone()),
                Transform::from_xyz(0.0, half.y + 0.6, -half.z)
                    .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
            ));
        });

    // === CHASSIS ===
    // Sized like the collider so what you see is what collides
    let chassis_mesh = meshes.add(Cuboid::from_size(half * 2.0));
    commands.spawn((
        ChassisVisual,
        Mesh3d(chassis_mesh),
        MeshMaterial3d(body_material),
        visual.chassis,
    ));

    // === WHEELS ===
    let tyre = meshes.add(Cylinder::new(def.wheel_radius, def.wheel_height));
    let hub = meshes.add(Cuboid::new(0.08, def.wheel_height * 1.02, 0.08));
    for position in WheelPosition::ALL {
        let wheel = visual.wheels[position.index()];
        commands
            .spawn((
                WheelVisualSlot(position),
                wheel.transform,
                Visibility::Inherited,
            ))
            .with_children(|parent| {
                parent
                    .spawn((
                        WheelSpin(position),
                        Mesh3d(tyre.clone()),
                        MeshMaterial3d(tyre_material.clone()),
                        Transform::from_rotation(Quat::from_rotation_y(wheel.spin)),
                    ))
                    .with_children(|tyre_parent| {
                        // Off-centre marker so the spin is visible
                        tyre_parent.spawn((
                            Mesh3d(hub.clone()),
                            MeshMaterial3d(marker_material.clone()),
                            Transform::from_xyz(def.wheel_radius * 0.7, 0.0, 0.0),
                        ));
                    });
            });
    }

    info!("Car visuals spawned");
}

// =============================================================================
// TRANSFORM SYNC
// =============================================================================

/// Copy the car's visual state (already synced from physics this frame) onto
/// the render entities. All parts are written in the same system.
pub fn sync_car_transforms(
    sim: Res<DrivingSim>,
    mut groups: Query<&mut Transform, (With<CarGroup>, Without<ChassisVisual>, Without<WheelVisualSlot>, Without<WheelSpin>)>,
    mut chassis: Query<&mut Transform, (With<ChassisVisual>, Without<CarGroup>, Without<WheelVisualSlot>, Without<WheelSpin>)>,
    mut wheels: Query<(&WheelVisualSlot, &mut Transform), (Without<CarGroup>, Without<ChassisVisual>, Without<WheelSpin>)>,
    mut spins: Query<(&WheelSpin, &mut Transform), (Without<CarGroup>, Without<ChassisVisual>, Without<WheelVisualSlot>)>,
) {
    let visual = sim.0.car().visual();

    for mut transform in groups.iter_mut() {
        *transform = visual.group;
    }

    for mut transform in chassis.iter_mut() {
        *transform = visual.chassis;
    }

    for (slot, mut transform) in wheels.iter_mut() {
        *transform = visual.wheels[slot.0.index()].transform;
    }

    for (spin, mut transform) in spins.iter_mut() {
        transform.rotation = Quat::from_rotation_y(visual.wheels[spin.0.index()].spin);
    }
}
