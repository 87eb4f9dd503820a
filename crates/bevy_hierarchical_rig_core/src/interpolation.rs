use bevy::{
    math::{Quat, Vec3},
    transform::components::Transform,
};

use crate::pose::RigPose;

pub trait InterpolateLinear {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self;
}

impl InterpolateLinear for Vec3 {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.lerp(*other, f)
    }
}

impl InterpolateLinear for Quat {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.slerp(*other, f)
    }
}

impl InterpolateLinear for Transform {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        Transform {
            translation: self.translation.interpolate_linear(&other.translation, f),
            rotation: self.rotation.interpolate_linear(&other.rotation, f),
            scale: self.scale.interpolate_linear(&other.scale, f),
        }
    }
}

/// Interpolates two poses over the same hierarchy node-by-node. Panics if the
/// poses have different lengths.
impl InterpolateLinear for RigPose {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        assert_eq!(self.len(), other.len());
        let mut result = self.clone();
        for (id, _) in self.locals().iter().enumerate() {
            let id = crate::hierarchy::NodeId::new(id);
            result.set_local(id, self.local(id).interpolate_linear(&other.local(id), f));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_midpoint() {
        let a = Transform::from_translation(Vec3::ZERO);
        let b = Transform::from_translation(Vec3::X * 2.0);
        let mid = a.interpolate_linear(&b, 0.5);
        assert!((mid.translation - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn quat_endpoints() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_y(1.0);
        assert!(a.interpolate_linear(&b, 0.0).angle_between(a) < 1e-6);
        assert!(a.interpolate_linear(&b, 1.0).angle_between(b) < 1e-6);
    }
}
