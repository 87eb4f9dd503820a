use bevy::{
    asset::{AssetId, Handle},
    ecs::component::Component,
    math::{Quat, Vec3},
    reflect::Reflect,
};

use crate::{
    definition::RigDefinition,
    evaluation::{RigCommand, RigEvaluator},
    pose::{NodePose, RigPose},
};

/// Drives one rig instance on an entity.
///
/// The player owns the evaluator for its [`RigDefinition`] asset and a queue
/// of commands applied on the next evaluation. The output pose is written to
/// named descendant entities by
/// [`apply_rig_to_targets`](crate::systems::apply_rig_to_targets).
#[derive(Component, Reflect)]
pub struct HierarchicalRigPlayer {
    pub rig: Handle<RigDefinition>,
    #[reflect(ignore)]
    pub(crate) evaluator: Option<RigEvaluator>,
    #[reflect(ignore)]
    pub(crate) pose: Option<RigPose>,
    #[reflect(ignore)]
    pub(crate) commands: Vec<RigCommand>,
    #[reflect(ignore)]
    pub(crate) initialized_for: Option<AssetId<RigDefinition>>,
}

impl HierarchicalRigPlayer {
    pub fn new(rig: Handle<RigDefinition>) -> Self {
        Self {
            rig,
            evaluator: None,
            pose: None,
            commands: Vec::new(),
            initialized_for: None,
        }
    }

    /// Queues a partial local-transform override for a named node (most
    /// commonly an IK target control). Overrides persist until cleared.
    pub fn set_node_pose(&mut self, node: impl Into<String>, pose: NodePose) {
        self.commands.push(RigCommand::SetNodePose {
            node: node.into(),
            pose,
        });
    }

    /// Convenience for moving a control node.
    pub fn set_node_position(&mut self, node: impl Into<String>, position: Vec3) {
        self.set_node_pose(node, NodePose::from_translation(position));
    }

    /// Convenience for rotating a control node.
    pub fn set_node_rotation(&mut self, node: impl Into<String>, rotation: Quat) {
        self.set_node_pose(node, NodePose::from_rotation(rotation));
    }

    pub fn clear_node_pose(&mut self, node: impl Into<String>) {
        self.commands
            .push(RigCommand::ClearNodePose { node: node.into() });
    }

    /// Overrides the weight of the constraint at `index` (definition order).
    pub fn set_constraint_weight(&mut self, index: usize, weight: f32) {
        self.commands
            .push(RigCommand::SetConstraintWeight { index, weight });
    }

    /// Removes a weight override, restoring the authored weight.
    pub fn clear_constraint_weight(&mut self, index: usize) {
        self.commands
            .push(RigCommand::ClearConstraintWeight { index });
    }

    /// Starts a timed IK/FK blend for the named effector.
    pub fn set_effector_enabled(&mut self, effector: impl Into<String>, enabled: bool) {
        self.commands.push(RigCommand::SetEffectorEnabled {
            effector: effector.into(),
            enabled,
        });
    }

    /// Output pose of the last evaluation, if the rig has been initialized.
    pub fn pose(&self) -> Option<&RigPose> {
        self.pose.as_ref()
    }

    pub fn evaluator(&self) -> Option<&RigEvaluator> {
        self.evaluator.as_ref()
    }
}
