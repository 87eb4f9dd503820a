use bevy::{
    app::{App, Plugin, PostUpdate},
    asset::AssetApp,
    ecs::schedule::IntoScheduleConfigs,
    transform::TransformSystems,
};

use crate::{
    constraint::{Constraint, ConstraintKind},
    definition::{IkEffector, RigDefinition, loader::RigDefinitionLoader},
    hierarchy::{NodeId, RigHierarchy, RigNode},
    ik::blend::{IkFkBlend, IkFkBlendState},
    player::HierarchicalRigPlayer,
    pose::{NodePose, RigPose},
    systems::{apply_rig_to_targets, run_rig_players},
};

/// Adds hierarchical rig support to an app.
pub struct HierarchicalRigPlugin;

impl Plugin for HierarchicalRigPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<RigDefinition>()
            .init_asset_loader::<RigDefinitionLoader>()
            .register_asset_reflect::<RigDefinition>();

        app.register_type::<NodeId>()
            .register_type::<RigNode>()
            .register_type::<RigHierarchy>()
            .register_type::<NodePose>()
            .register_type::<RigPose>()
            .register_type::<Constraint>()
            .register_type::<ConstraintKind>()
            .register_type::<IkEffector>()
            .register_type::<IkFkBlend>()
            .register_type::<IkFkBlendState>()
            .register_type::<HierarchicalRigPlayer>();

        app.add_systems(
            PostUpdate,
            (run_rig_players, apply_rig_to_targets)
                .chain()
                .before(TransformSystems::Propagate),
        );
    }
}
