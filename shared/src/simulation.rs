//! Per-frame simulation.
//!
//! All frame state lives in [`Simulation`]; one call to [`Simulation::tick`] is
//! one rendered frame:
//! 1. integrate a finished terrain load, if one arrived since the last tick
//! 2. apply drive/turn intents to the car
//! 3. step physics (one fixed step per frame by default)
//! 4. sync the car's visuals from physics
//! 5. place the chase camera

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::{chase_camera_pose, CameraPose};
use crate::config::SimConfig;
use crate::input::{DriveIntents, TURN_LEFT, TURN_RIGHT};
use crate::physics::PhysicsWorld;
use crate::terrain::{TerrainEvent, TerrainState};
use crate::vehicle::{AppliedForce, Car, CarDef};

/// Physics step in seconds.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Upper bound on steps per frame in accumulated mode.
pub const MAX_SUBSTEPS: u32 = 5;

/// How physics time relates to frame time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepMode {
    /// Exactly one fixed step per rendered frame. Physics speed follows frame rate.
    #[default]
    PerFrame,
    /// Accumulate real frame time and run as many fixed steps as fit.
    Accumulated,
}

/// Decides how many fixed steps each frame runs.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    mode: StepMode,
    dt: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl FrameClock {
    pub fn new(mode: StepMode, dt: f32, max_substeps: u32) -> Self {
        Self {
            mode,
            dt,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn steps_for_frame(&mut self, frame_delta: f32) -> u32 {
        match self.mode {
            StepMode::PerFrame => 1,
            StepMode::Accumulated => {
                self.accumulator += frame_delta.max(0.0);
                let mut steps = 0;
                while self.accumulator >= self.dt && steps < self.max_substeps {
                    self.accumulator -= self.dt;
                    steps += 1;
                }
                // Drop the backlog after a long stall instead of spiralling.
                if steps == self.max_substeps {
                    self.accumulator = self.accumulator.min(self.dt);
                }
                steps
            }
        }
    }
}

/// Input for one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickInput {
    pub intents: DriveIntents,
    /// Real seconds since the previous frame. Only used in accumulated mode.
    pub frame_delta: f32,
}

impl TickInput {
    pub fn with_intents(intents: DriveIntents) -> Self {
        Self {
            intents,
            frame_delta: FIXED_TIMESTEP,
        }
    }
}

/// What a tick did.
#[derive(Clone, Debug)]
pub struct TickReport {
    pub steps: u32,
    pub forces: Vec<AppliedForce>,
    pub camera: CameraPose,
}

pub struct Simulation {
    world: PhysicsWorld,
    car: Car,
    terrain: TerrainState,
    pending_terrain: Option<TerrainEvent>,
    clock: FrameClock,
    camera_offset: Vec3,
    camera: CameraPose,
    frame: u64,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Self {
        let mut world = PhysicsWorld::new(config.gravity);
        let mut car = Car::spawn(&mut world, config.spawn_position, CarDef::default());
        car.speed = config.initial_speed;

        let camera = chase_camera_pose(car.visual().group.translation, car.heading(), config.camera_offset);

        info!(
            "Simulation ready: gravity {:?}, step {:.4}s ({:?})",
            config.gravity, config.timestep, config.step_mode
        );

        Self {
            world,
            car,
            terrain: TerrainState::default(),
            pending_terrain: None,
            clock: FrameClock::new(config.step_mode, config.timestep, config.max_substeps),
            camera_offset: config.camera_offset,
            camera,
            frame: 0,
        }
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn terrain(&self) -> TerrainState {
        self.terrain
    }

    pub fn camera(&self) -> CameraPose {
        self.camera
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Hand over the outcome of the terrain load. It is folded in at the start
    /// of the next tick.
    pub fn queue_terrain_event(&mut self, event: TerrainEvent) {
        if self.pending_terrain.replace(event).is_some() {
            warn!("Terrain event replaced before it was integrated");
        }
    }

    pub fn tick(&mut self, input: &TickInput) -> TickReport {
        if let Some(event) = self.pending_terrain.take() {
            self.terrain.integrate(&event, &mut self.world);
        }

        let mut forces = Vec::new();
        let intents = input.intents;
        if intents.accelerate {
            forces.push(self.car.apply_driving_force(&mut self.world, true));
        }
        if intents.brake {
            forces.push(self.car.apply_driving_force(&mut self.world, false));
        }
        if intents.turn_left {
            self.car.apply_turn(TURN_LEFT);
        }
        if intents.turn_right {
            self.car.apply_turn(TURN_RIGHT);
        }

        let steps = self.clock.steps_for_frame(input.frame_delta);
        for _ in 0..steps {
            self.world.step(self.clock.dt());
        }
        // Forces cover one frame. With zero steps they carry to the next one.
        if steps > 0 {
            self.world.clear_forces();
        }

        self.car.sync_visual_from_physics(&self.world);

        self.camera = chase_camera_pose(
            self.car.visual().group.translation,
            self.car.heading(),
            self.camera_offset,
        );

        self.frame += 1;

        TickReport {
            steps,
            forces,
            camera: self.camera,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainPlacement;

    fn chassis_position(sim: &Simulation) -> Vec3 {
        sim.world()
            .body_pose(sim.car().chassis_body())
            .unwrap()
            .translation
    }

    #[test]
    fn test_per_frame_clock_ignores_wall_time() {
        let mut clock = FrameClock::new(StepMode::PerFrame, FIXED_TIMESTEP, MAX_SUBSTEPS);
        assert_eq!(clock.steps_for_frame(0.0), 1);
        assert_eq!(clock.steps_for_frame(0.5), 1);
        assert_eq!(clock.steps_for_frame(1.0 / 240.0), 1);
    }

    #[test]
    fn test_accumulated_clock() {
        let mut clock = FrameClock::new(StepMode::Accumulated, 0.01, 5);

        assert_eq!(clock.steps_for_frame(0.004), 0);
        assert_eq!(clock.steps_for_frame(0.008), 1);
        assert_eq!(clock.steps_for_frame(0.025), 2);
        // Long stall is capped.
        assert_eq!(clock.steps_for_frame(1.0), 5);
        assert!(clock.steps_for_frame(0.0) <= 1);
    }

    #[test]
    fn test_forward_drive_end_to_end() {
        let mut sim = Simulation::new(&SimConfig::default());
        let spawn = chassis_position(&sim);
        assert_eq!(spawn, Vec3::new(0.0, 1000.0, 0.0));

        let input = TickInput::with_intents(DriveIntents::accelerate());
        let mut last_distance = 0.0;
        let mut last_height = spawn.y;

        for frame in 0..30 {
            let report = sim.tick(&input);
            assert_eq!(report.steps, 1);

            let position = chassis_position(&sim);
            let displacement = position - spawn;
            let distance = Vec2::new(displacement.x, displacement.z).length();

            if frame == 0 {
                assert!(displacement.z < 0.0);
                assert!(displacement.x.abs() < 1e-4);
            }
            assert!(distance > last_distance, "frame {frame}: {distance} <= {last_distance}");
            assert!(position.y < last_height, "frame {frame}: height did not decrease");

            last_distance = distance;
            last_height = position.y;
        }
    }

    #[test]
    fn test_terrain_failure_keeps_simulation_running() {
        let mut sim = Simulation::new(&SimConfig::default());
        sim.queue_terrain_event(TerrainEvent::Failed("missing asset".into()));

        let input = TickInput::with_intents(DriveIntents {
            accelerate: true,
            turn_left: true,
            ..DriveIntents::NONE
        });
        for _ in 0..10 {
            sim.tick(&input);
        }

        assert_eq!(sim.terrain(), TerrainState::Failed);
        assert_eq!(sim.world().body_count(), 5);
        assert_eq!(sim.frame(), 10);
        assert!(chassis_position(&sim).z < 0.0);
        assert!((sim.car().heading() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_terrain_is_added_on_next_tick() {
        let mut sim = Simulation::new(&SimConfig::default());
        sim.queue_terrain_event(TerrainEvent::Ready(TerrainPlacement::default()));
        assert_eq!(sim.terrain(), TerrainState::Pending);

        sim.tick(&TickInput::default());
        assert!(sim.terrain().body().is_some());
        assert_eq!(sim.world().body_count(), 6);

        for _ in 0..60 {
            sim.tick(&TickInput::default());
        }

        // Wheels spawn at the origin and rest on top of the slab (y = 0).
        for wheel in sim.car().visual().wheels {
            let y = wheel.transform.translation.y;
            assert!((y - 0.25).abs() < 0.05, "wheel at y = {y}");
        }
    }

    #[test]
    fn test_opposite_intents_cancel() {
        let mut sim = Simulation::new(&SimConfig::default());
        let input = TickInput::with_intents(DriveIntents {
            accelerate: true,
            brake: true,
            turn_left: true,
            turn_right: true,
        });

        let report = sim.tick(&input);

        assert_eq!(report.forces.len(), 2);
        assert_eq!(report.forces[0].force, -report.forces[1].force);
        assert_eq!(sim.car().heading(), 0.0);
        let position = chassis_position(&sim);
        assert!(position.x.abs() < 1e-4 && position.z.abs() < 1e-4);
    }

    #[test]
    fn test_camera_follows_car() {
        let mut sim = Simulation::new(&SimConfig::default());
        let input = TickInput::with_intents(DriveIntents {
            accelerate: true,
            turn_right: true,
            ..DriveIntents::NONE
        });

        for _ in 0..5 {
            let report = sim.tick(&input);
            let car = sim.car();
            let expected = chase_camera_pose(
                car.visual().group.translation,
                car.heading(),
                SimConfig::default().camera_offset,
            );
            assert_eq!(report.camera, expected);
            assert_eq!(report.camera.target, chassis_position(&sim));
        }
    }

    #[test]
    fn test_visuals_match_physics_after_every_tick() {
        let mut sim = Simulation::new(&SimConfig::default());
        sim.queue_terrain_event(TerrainEvent::Ready(TerrainPlacement::default()));
        let input = TickInput::with_intents(DriveIntents {
            accelerate: true,
            turn_left: true,
            ..DriveIntents::NONE
        });

        for _ in 0..20 {
            sim.tick(&input);
            let car = sim.car();
            let chassis = sim.world().body_pose(car.chassis_body()).unwrap();
            assert_eq!(car.visual().chassis, chassis);
            for (wheel, handle) in car.visual().wheels.iter().zip(car.wheel_bodies()) {
                assert_eq!(wheel.transform, sim.world().body_pose(handle).unwrap());
            }
        }
    }

    #[test]
    fn test_accumulated_mode_can_skip_steps() {
        let config = SimConfig {
            step_mode: StepMode::Accumulated,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(&config);

        let report = sim.tick(&TickInput {
            intents: DriveIntents::NONE,
            frame_delta: FIXED_TIMESTEP * 0.25,
        });
        assert_eq!(report.steps, 0);
        assert_eq!(chassis_position(&sim), Vec3::new(0.0, 1000.0, 0.0));

        let report = sim.tick(&TickInput {
            intents: DriveIntents::NONE,
            frame_delta: FIXED_TIMESTEP * 2.0,
        });
        assert_eq!(report.steps, 2);
        assert!(chassis_position(&sim).y < 1000.0);
    }
}
