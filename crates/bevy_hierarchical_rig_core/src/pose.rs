use bevy::{
    math::{Quat, Vec3},
    reflect::Reflect,
    transform::components::Transform,
};
use serde::{Deserialize, Serialize};

use crate::hierarchy::{NodeId, RigHierarchy};

/// Partial local-transform override for a single node.
///
/// Channels left as `None` keep whatever the underlying pose already has.
#[derive(Reflect, Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodePose {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}

impl NodePose {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation: Some(translation),
            ..Default::default()
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    pub fn to_transform_with_base(&self, mut base: Transform) -> Transform {
        if let Some(translation) = self.translation {
            base.translation = translation;
        }
        if let Some(rotation) = self.rotation {
            base.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            base.scale = scale;
        }
        base
    }
}

/// Per-node local transforms for one evaluation frame, indexed by [`NodeId`].
#[derive(Reflect, Clone, Debug, Default)]
pub struct RigPose {
    locals: Vec<Transform>,
}

impl RigPose {
    /// A pose matching the hierarchy's reference pose.
    pub fn from_reference(hierarchy: &RigHierarchy) -> Self {
        Self {
            locals: hierarchy.iter().map(|(_, node)| node.local_transform).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    pub fn local(&self, id: NodeId) -> Transform {
        self.locals[id.index()]
    }

    pub fn set_local(&mut self, id: NodeId, transform: Transform) {
        self.locals[id.index()] = transform;
    }

    pub fn apply(&mut self, id: NodeId, node_pose: &NodePose) {
        let base = self.locals[id.index()];
        self.locals[id.index()] = node_pose.to_transform_with_base(base);
    }

    pub fn locals(&self) -> &[Transform] {
        &self.locals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::transform::components::Transform;

    #[test]
    fn node_pose_overrides_only_set_channels() {
        let base = Transform::from_translation(Vec3::X).with_scale(Vec3::splat(2.0));
        let pose = NodePose::from_rotation(Quat::from_rotation_z(1.0));
        let merged = pose.to_transform_with_base(base);
        assert_eq!(merged.translation, Vec3::X);
        assert_eq!(merged.scale, Vec3::splat(2.0));
        assert!(merged.rotation.angle_between(Quat::from_rotation_z(1.0)) < 1e-6);
    }

    #[test]
    fn reference_pose_matches_hierarchy() {
        let mut hierarchy = RigHierarchy::default();
        let root = hierarchy
            .add_node("root", None, Transform::from_translation(Vec3::Y))
            .unwrap();
        let pose = RigPose::from_reference(&hierarchy);
        assert_eq!(pose.len(), 1);
        assert_eq!(pose.local(root).translation, Vec3::Y);
    }
}
