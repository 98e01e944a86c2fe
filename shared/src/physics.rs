//! Rigid-body physics world.
//!
//! Thin wrapper around a Rapier pipeline that is stepped explicitly by the
//! simulation (one fixed step per frame). Bodies are only ever added, never
//! removed.
//!
//! Pairwise contact materials are resolved in a solver-contact hook: every
//! collider carries its material id in `user_data`, and when both sides of a
//! contact have a registered pairing the contact's friction/restitution are
//! overwritten with it.

use std::collections::HashMap;

use bevy::prelude::{debug, Quat, Transform, Vec3};
use bevy_rapier3d::rapier::prelude::*;

/// Default gravity (m/s^2, negative Y).
pub const GRAVITY: f32 = -9.82;

/// Friction used for contacts between materials with no registered pairing.
pub const DEFAULT_FRICTION: f32 = 0.3;

/// Restitution used for contacts between materials with no registered pairing.
pub const DEFAULT_RESTITUTION: f32 = 0.0;

/// Handle to a body registered with a [`PhysicsWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Interned physics material name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u32);

impl MaterialId {
    /// Material of bodies registered without one.
    pub const DEFAULT: MaterialId = MaterialId(0);

    fn from_user_data(user_data: u128) -> Self {
        MaterialId(user_data as u32)
    }
}

/// Friction/restitution pairing between two materials.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

/// Collision shape of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyShape {
    Cuboid { half_extents: Vec3 },
    /// Y-aligned cylinder.
    Cylinder { radius: f32, height: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    /// Zero-mass, never moves.
    Fixed,
}

/// Everything needed to register a body.
#[derive(Clone, Copy, Debug)]
pub struct BodyDesc {
    pub kind: BodyKind,
    /// Ignored for fixed bodies.
    pub mass: f32,
    pub shape: BodyShape,
    pub position: Vec3,
    pub material: MaterialId,
}

/// Pairwise contact material table, consulted by the solver hook.
#[derive(Default)]
struct ContactMaterialTable {
    pairs: HashMap<(MaterialId, MaterialId), ContactMaterial>,
}

impl ContactMaterialTable {
    fn key(a: MaterialId, b: MaterialId) -> (MaterialId, MaterialId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn insert(&mut self, a: MaterialId, b: MaterialId, material: ContactMaterial) {
        self.pairs.insert(Self::key(a, b), material);
    }

    fn get(&self, a: MaterialId, b: MaterialId) -> Option<ContactMaterial> {
        self.pairs.get(&Self::key(a, b)).copied()
    }
}

impl PhysicsHooks for ContactMaterialTable {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let a = MaterialId::from_user_data(context.colliders[context.collider1].user_data);
        let b = MaterialId::from_user_data(context.colliders[context.collider2].user_data);

        let Some(material) = self.get(a, b) else {
            return;
        };

        for contact in context.solver_contacts.iter_mut() {
            contact.friction = material.friction;
            contact.restitution = material.restitution;
        }
    }
}

/// The physics simulation context: gravity, bodies, and contact materials.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    contact_materials: ContactMaterialTable,
    material_names: Vec<String>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, GRAVITY, 0.0))
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: to_vector(gravity),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            contact_materials: ContactMaterialTable::default(),
            // Slot 0 is the implicit default material.
            material_names: vec![String::new()],
        }
    }

    pub fn gravity(&self) -> Vec3 {
        to_vec3(&self.gravity)
    }

    /// Look up a material by name, registering it on first use.
    pub fn register_material(&mut self, name: &str) -> MaterialId {
        if let Some(index) = self.material_names.iter().position(|n| n == name) {
            return MaterialId(index as u32);
        }
        self.material_names.push(name.to_string());
        MaterialId((self.material_names.len() - 1) as u32)
    }

    pub fn material_name(&self, id: MaterialId) -> Option<&str> {
        self.material_names.get(id.0 as usize).map(String::as_str)
    }

    /// Register (or replace) the friction/restitution used when `a` touches `b`.
    pub fn add_contact_material(&mut self, a: MaterialId, b: MaterialId, material: ContactMaterial) {
        debug!(
            "Contact material {:?} <-> {:?}: friction {}, restitution {}",
            self.material_name(a),
            self.material_name(b),
            material.friction,
            material.restitution
        );
        self.contact_materials.insert(a, b, material);
    }

    pub fn contact_material(&self, a: MaterialId, b: MaterialId) -> Option<ContactMaterial> {
        self.contact_materials.get(a, b)
    }

    /// Create a body with a single collider and register it with the world.
    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        };
        let handle = self
            .bodies
            .insert(builder.translation(to_vector(desc.position)).build());

        let collider = match desc.shape {
            BodyShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            BodyShape::Cylinder { radius, height } => ColliderBuilder::cylinder(height * 0.5, radius),
        };
        let mut collider = collider
            .friction(DEFAULT_FRICTION)
            .restitution(DEFAULT_RESTITUTION)
            .user_data(desc.material.0 as u128)
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS);
        if desc.kind == BodyKind::Dynamic {
            collider = collider.mass(desc.mass);
        }

        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);

        BodyHandle(handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Add a world-space force acting at a world-space point.
    ///
    /// The force acts on every step until [`PhysicsWorld::clear_forces`].
    pub fn apply_force_at_point(&mut self, handle: BodyHandle, force: Vec3, point: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.add_force_at_point(to_vector(force), to_point(point), true);
        }
    }

    /// Forces accumulated on a body and not yet cleared.
    pub fn pending_force(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle.0).map(|body| to_vec3(&body.user_force()))
    }

    pub fn clear_forces(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
            body.reset_torques(false);
        }
    }

    /// Advance the simulation by exactly `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &self.contact_materials,
            &(),
        );
    }

    /// Current position and orientation of a body.
    pub fn body_pose(&self, handle: BodyHandle) -> Option<Transform> {
        let body = self.bodies.get(handle.0)?;
        let rotation = body.rotation();
        Some(
            Transform::from_translation(to_vec3(body.translation())).with_rotation(Quat::from_xyzw(
                rotation.coords.x,
                rotation.coords.y,
                rotation.coords.z,
                rotation.coords.w,
            )),
        )
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle.0).map(|body| to_vec3(body.linvel()))
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}
