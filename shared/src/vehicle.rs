//! The player car.
//!
//! A car has two representations that are kept side by side:
//! - a visual group (chassis mesh + four wheel meshes) that the renderer draws
//! - five physics bodies (chassis box + four wheel cylinders) registered with the
//!   shared [`PhysicsWorld`]
//!
//! The wheels are free bodies. They are not jointed to the chassis and are synced
//! to their own visuals independently.
//!
//! Steering only changes `heading`, which drives the visual group yaw and the
//! direction of the driving force. It is never written back into the chassis
//! body, so the body's simulated orientation and the heading drift apart as
//! soon as the body starts tumbling.

use bevy::prelude::*;

use crate::physics::{BodyDesc, BodyHandle, BodyKind, BodyShape, ContactMaterial, PhysicsWorld};

// =============================================================================
// CAR TUNING CONSTANTS
// =============================================================================

pub mod car {
    pub const CHASSIS_HALF_EXTENTS: (f32, f32, f32) = (1.0, 0.5, 2.0);
    pub const CHASSIS_MASS: f32 = 1.0;
    /// Chassis mesh offset inside the visual group.
    pub const CHASSIS_VISUAL_OFFSET: (f32, f32, f32) = (0.0, 0.5, 0.0);

    pub const WHEEL_RADIUS: f32 = 0.25;
    pub const WHEEL_HEIGHT: f32 = 0.5;
    pub const WHEEL_MASS: f32 = 1.0;
    /// Front-left, front-right, rear-left, rear-right.
    pub const WHEEL_OFFSETS: [(f32, f32, f32); 4] = [
        (-0.8, 0.25, 0.5),
        (0.8, 0.25, 0.5),
        (-0.8, 0.25, -0.5),
        (0.8, 0.25, -0.5),
    ];

    pub const DRIVE_FORCE: f32 = 50_000.0;
    /// Where the drive force acts, relative to the chassis position (world axes).
    pub const FORCE_POINT_OFFSET: (f32, f32, f32) = (0.0, -0.2, -0.5);

    /// Radians of heading change per turn call.
    pub const TURN_STEP: f32 = 0.05;
    /// Cosmetic wheel spin per drive call, scaled by the speed scalar.
    pub const WHEEL_SPIN_FACTOR: f32 = 5.0;

    pub const CHASSIS_MATERIAL: &str = "car material";
    pub const WHEEL_MATERIAL: &str = "wheel material";
    pub const CHASSIS_WHEEL_FRICTION: f32 = 0.3;
    pub const CHASSIS_WHEEL_RESTITUTION: f32 = 0.1;
}

/// Tuning values for the car.
#[derive(Clone, Copy, Debug)]
pub struct CarDef {
    pub chassis_half_extents: Vec3,
    pub chassis_mass: f32,
    pub chassis_visual_offset: Vec3,
    pub wheel_radius: f32,
    pub wheel_height: f32,
    pub wheel_mass: f32,
    pub wheel_offsets: [Vec3; 4],
    /// When false the wheel bodies are created at `wheel_offsets` in world space
    /// instead of relative to the spawn position.
    pub wheel_bodies_follow_spawn: bool,
    pub drive_force: f32,
    pub force_point_offset: Vec3,
    pub turn_step: f32,
    pub wheel_spin_factor: f32,
    pub chassis_wheel_contact: ContactMaterial,
}

impl Default for CarDef {
    fn default() -> Self {
        let v = |(x, y, z): (f32, f32, f32)| Vec3::new(x, y, z);
        Self {
            chassis_half_extents: v(car::CHASSIS_HALF_EXTENTS),
            chassis_mass: car::CHASSIS_MASS,
            chassis_visual_offset: v(car::CHASSIS_VISUAL_OFFSET),
            wheel_radius: car::WHEEL_RADIUS,
            wheel_height: car::WHEEL_HEIGHT,
            wheel_mass: car::WHEEL_MASS,
            wheel_offsets: car::WHEEL_OFFSETS.map(v),
            wheel_bodies_follow_spawn: false,
            drive_force: car::DRIVE_FORCE,
            force_point_offset: v(car::FORCE_POINT_OFFSET),
            turn_step: car::TURN_STEP,
            wheel_spin_factor: car::WHEEL_SPIN_FACTOR,
            chassis_wheel_contact: ContactMaterial {
                friction: car::CHASSIS_WHEEL_FRICTION,
                restitution: car::CHASSIS_WHEEL_RESTITUTION,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelPosition {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One wheel mesh: its synced transform plus a cosmetic spin angle (radians
/// about the axle) that the renderer applies on top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelVisual {
    pub transform: Transform,
    pub spin: f32,
}

/// What the renderer draws for the car.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarVisual {
    /// Group origin. Position follows the chassis body; yaw is the heading.
    pub group: Transform,
    pub chassis: Transform,
    pub wheels: [WheelVisual; 4],
}

/// Force handed to the physics world by one drive call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppliedForce {
    pub force: Vec3,
    pub point: Vec3,
}

pub struct Car {
    def: CarDef,
    visual: CarVisual,
    chassis: BodyHandle,
    wheels: [BodyHandle; 4],
    heading: f32,
    /// Only scales the cosmetic wheel spin; motion comes from forces.
    pub speed: f32,
}

impl Car {
    /// Build the visual group and register the five bodies plus the
    /// chassis/wheel contact material with `world`.
    pub fn spawn(world: &mut PhysicsWorld, spawn: Vec3, def: CarDef) -> Self {
        let chassis_material = world.register_material(car::CHASSIS_MATERIAL);
        let wheel_material = world.register_material(car::WHEEL_MATERIAL);

        let wheel_visuals = def.wheel_offsets.map(|offset| WheelVisual {
            transform: Transform::from_translation(spawn + offset),
            spin: 0.0,
        });

        let wheels = def.wheel_offsets.map(|offset| {
            let position = if def.wheel_bodies_follow_spawn {
                spawn + offset
            } else {
                offset
            };
            world.add_body(BodyDesc {
                kind: BodyKind::Dynamic,
                mass: def.wheel_mass,
                shape: BodyShape::Cylinder {
                    radius: def.wheel_radius,
                    height: def.wheel_height,
                },
                position,
                material: wheel_material,
            })
        });

        let chassis = world.add_body(BodyDesc {
            kind: BodyKind::Dynamic,
            mass: def.chassis_mass,
            shape: BodyShape::Cuboid {
                half_extents: def.chassis_half_extents,
            },
            position: spawn,
            material: chassis_material,
        });

        world.add_contact_material(chassis_material, wheel_material, def.chassis_wheel_contact);

        info!("Car spawned at {:?}", spawn);

        Self {
            def,
            visual: CarVisual {
                group: Transform::from_translation(spawn),
                chassis: Transform::from_translation(spawn + def.chassis_visual_offset),
                wheels: wheel_visuals,
            },
            chassis,
            wheels,
            heading: 0.0,
            speed: 0.0,
        }
    }

    pub fn def(&self) -> &CarDef {
        &self.def
    }

    pub fn visual(&self) -> &CarVisual {
        &self.visual
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn chassis_body(&self) -> BodyHandle {
        self.chassis
    }

    pub fn wheel_bodies(&self) -> [BodyHandle; 4] {
        self.wheels
    }

    /// Apply one frame of drive force along the heading (or against it when
    /// `forward` is false) and nudge the cosmetic wheel spin.
    pub fn apply_driving_force(&mut self, world: &mut PhysicsWorld, forward: bool) -> AppliedForce {
        let direction = if forward { 1.0 } else { -1.0 };
        let magnitude = self.def.drive_force;
        let force = Vec3::new(
            -self.heading.sin() * magnitude * direction,
            0.0,
            -self.heading.cos() * magnitude * direction,
        );

        let chassis_position = world
            .body_pose(self.chassis)
            .map(|pose| pose.translation)
            .unwrap_or(self.visual.group.translation);
        let point = chassis_position + self.def.force_point_offset;

        world.apply_force_at_point(self.chassis, force, point);

        for wheel in self.visual.wheels.iter_mut() {
            wheel.spin -= self.speed * self.def.wheel_spin_factor;
        }

        AppliedForce { force, point }
    }

    /// Turn by `direction * turn_step` radians (left is positive). Only the
    /// visual group is rotated.
    pub fn apply_turn(&mut self, direction: f32) {
        self.heading += direction * self.def.turn_step;
        self.visual.group.rotation = Quat::from_rotation_y(self.heading);
    }

    /// Copy every body's pose onto its visual. Nothing is written unless all
    /// five poses are available.
    pub fn sync_visual_from_physics(&mut self, world: &PhysicsWorld) {
        let Some(chassis) = world.body_pose(self.chassis) else {
            warn!("sync_visual_from_physics: chassis body missing");
            return;
        };

        let mut wheels = [Transform::IDENTITY; 4];
        for (pose, handle) in wheels.iter_mut().zip(self.wheels) {
            let Some(body_pose) = world.body_pose(handle) else {
                warn!("sync_visual_from_physics: wheel body missing");
                return;
            };
            *pose = body_pose;
        }

        self.visual.group.translation = chassis.translation;
        self.visual.chassis = chassis;
        for (visual, pose) in self.visual.wheels.iter_mut().zip(wheels) {
            visual.transform = pose;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn spawn_car() -> (PhysicsWorld, Car) {
        let mut world = PhysicsWorld::default();
        let car = Car::spawn(&mut world, Vec3::new(0.0, 1000.0, 0.0), CarDef::default());
        (world, car)
    }

    #[test]
    fn test_spawn_registers_five_bodies_and_contact_material() {
        let (mut world, car) = spawn_car();

        assert_eq!(world.body_count(), 5);
        let chassis = world.register_material(car::CHASSIS_MATERIAL);
        let wheel = world.register_material(car::WHEEL_MATERIAL);
        assert_eq!(
            world.contact_material(chassis, wheel),
            Some(ContactMaterial {
                friction: 0.3,
                restitution: 0.1
            })
        );
        assert_eq!(car.heading(), 0.0);
    }

    #[test]
    fn test_spawn_lays_out_visuals_around_group() {
        let (_, car) = spawn_car();
        let visual = car.visual();
        let spawn = Vec3::new(0.0, 1000.0, 0.0);

        assert_eq!(visual.group.translation, spawn);
        assert_eq!(visual.chassis.translation, spawn + Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(
            visual.wheels[WheelPosition::FrontLeft.index()].transform.translation,
            spawn + Vec3::new(-0.8, 0.25, 0.5)
        );
        assert_eq!(
            visual.wheels[WheelPosition::RearRight.index()].transform.translation,
            spawn + Vec3::new(0.8, 0.25, -0.5)
        );
    }

    #[test]
    fn test_wheel_bodies_can_follow_spawn() {
        let mut world = PhysicsWorld::default();
        let def = CarDef {
            wheel_bodies_follow_spawn: true,
            ..CarDef::default()
        };
        let spawn = Vec3::new(10.0, 5.0, 0.0);
        let car = Car::spawn(&mut world, spawn, def);

        let fl = world.body_pose(car.wheel_bodies()[0]).unwrap();
        assert_eq!(fl.translation, spawn + Vec3::new(-0.8, 0.25, 0.5));
    }

    #[test]
    fn test_heading_is_sum_of_turns() {
        let (_, mut car) = spawn_car();
        let turns = [1.0, 1.0, -1.0, 2.5, -0.5, 1.0, 1.0, 1.0];

        let mut expected = 0.0_f32;
        for direction in turns {
            car.apply_turn(direction);
            expected += direction * 0.05;
            assert_eq!(car.heading(), expected);
            assert_eq!(car.visual().group.rotation, Quat::from_rotation_y(expected));
        }
    }

    #[test]
    fn test_heading_does_not_wrap() {
        let (_, mut car) = spawn_car();
        for _ in 0..200 {
            car.apply_turn(1.0);
        }
        assert!(car.heading() > std::f32::consts::TAU);
    }

    #[test]
    fn test_forward_and_backward_forces_are_negations() {
        let (mut world, mut car) = spawn_car();
        car.apply_turn(3.0);

        let forward = car.apply_driving_force(&mut world, true);
        let backward = car.apply_driving_force(&mut world, false);

        assert_eq!(forward.force, -backward.force);
        assert_eq!(forward.point, backward.point);
        assert_eq!(forward.force.y, 0.0);
        assert!((forward.force.length() - 50_000.0).abs() < 0.1);
    }

    #[test]
    fn test_force_point_is_offset_in_world_space() {
        let (mut world, mut car) = spawn_car();
        car.apply_turn(10.0);

        let applied = car.apply_driving_force(&mut world, true);

        assert_eq!(applied.point, Vec3::new(0.0, 1000.0 - 0.2, -0.5));
    }

    #[test]
    fn test_zero_heading_drives_toward_negative_z() {
        let (mut world, mut car) = spawn_car();
        let applied = car.apply_driving_force(&mut world, true);

        assert_eq!(applied.force, Vec3::new(-0.0, 0.0, -50_000.0));
        assert_eq!(world.pending_force(car.chassis_body()), Some(applied.force));
    }

    #[test]
    fn test_drive_spins_wheels_by_speed() {
        let (mut world, mut car) = spawn_car();
        car.speed = 0.1;

        car.apply_driving_force(&mut world, true);
        car.apply_driving_force(&mut world, false);

        for wheel in car.visual().wheels {
            assert!((wheel.spin - (-1.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_turning_leaves_chassis_orientation_alone() {
        let (mut world, mut car) = spawn_car();
        let before = world.body_pose(car.chassis_body()).unwrap().rotation;

        for _ in 0..25 {
            car.apply_turn(1.0);
        }
        assert_eq!(world.body_pose(car.chassis_body()).unwrap().rotation, before);

        for _ in 0..10 {
            car.apply_turn(-1.0);
            world.step(DT);
        }
        let after = world.body_pose(car.chassis_body()).unwrap().rotation;
        assert!(after.angle_between(Quat::IDENTITY) < 1e-5);
        assert!((car.heading() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_sync_copies_every_body_pose() {
        let (mut world, mut car) = spawn_car();
        car.apply_turn(1.0);

        for _ in 0..5 {
            car.apply_driving_force(&mut world, true);
            world.step(DT);
            world.clear_forces();
            car.sync_visual_from_physics(&world);

            let visual = car.visual();
            let chassis = world.body_pose(car.chassis_body()).unwrap();
            assert_eq!(visual.chassis.translation, chassis.translation);
            assert_eq!(visual.chassis.rotation, chassis.rotation);
            assert_eq!(visual.group.translation, chassis.translation);
            assert_eq!(visual.group.rotation, Quat::from_rotation_y(car.heading()));

            for (wheel, handle) in visual.wheels.iter().zip(car.wheel_bodies()) {
                let pose = world.body_pose(handle).unwrap();
                assert_eq!(wheel.transform.translation, pose.translation);
                assert_eq!(wheel.transform.rotation, pose.rotation);
            }
        }
    }
}
