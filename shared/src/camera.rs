//! Chase camera math.

use bevy::prelude::*;

/// Offset from the car, rotated by its heading.
pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 3.0, -5.0);

pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Where the camera sits and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Camera transform looking from `eye` at `target` with +Y up.
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye).looking_at(self.target, Vec3::Y)
    }
}

/// Place the camera at `offset` (rotated about +Y by `heading`) from `anchor`,
/// aimed at `anchor`.
pub fn chase_camera_pose(anchor: Vec3, heading: f32, offset: Vec3) -> CameraPose {
    CameraPose {
        eye: anchor + Quat::from_rotation_y(heading) * offset,
        target: anchor,
    }
}

/// Aspect ratio of a render surface. A collapsed (minimised) surface yields 1.0.
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if height <= 0.0 || width <= 0.0 {
        1.0
    } else {
        width / height
    }
}
