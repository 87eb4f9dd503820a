use bevy::transform::components::Transform;

use crate::{
    hierarchy::{NodeId, RigHierarchy},
    pose::RigPose,
};

// Implements Copy because it's just immutable references
#[derive(Clone, Copy)]
pub struct SpaceConversionContext<'a> {
    pub hierarchy: &'a RigHierarchy,
    pub pose: &'a RigPose,
}

impl SpaceConversionContext<'_> {
    /// Global (rig-space) transform of a node under the current pose, walking
    /// the parent chain.
    pub fn global_transform_of(&self, id: NodeId) -> Transform {
        let mut transform = self.pose.local(id);
        let mut current = self.hierarchy.parent(id);
        while let Some(parent) = current {
            transform = self.pose.local(parent) * transform;
            current = self.hierarchy.parent(parent);
        }
        transform
    }

    /// Converts a global transform into the local space of `parent` (i.e. the
    /// space the local transform of a child of `parent` lives in). `None`
    /// means rig space, which is a no-op.
    pub fn global_to_local(&self, transform: Transform, parent: Option<NodeId>) -> Transform {
        match parent {
            Some(parent) => {
                let parent_global = self.global_transform_of(parent);
                Transform::from_matrix(parent_global.to_matrix().inverse()) * transform
            }
            None => transform,
        }
    }

    /// Converts a transform expressed in the local space of `parent` into rig
    /// space.
    pub fn local_to_global(&self, transform: Transform, parent: Option<NodeId>) -> Transform {
        match parent {
            Some(parent) => self.global_transform_of(parent) * transform,
            None => transform,
        }
    }
}
