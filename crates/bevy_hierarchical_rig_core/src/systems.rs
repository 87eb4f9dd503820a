use bevy::{
    asset::Assets,
    ecs::{
        entity::Entity,
        hierarchy::Children,
        name::Name,
        system::{Query, Res},
    },
    log::warn,
    platform::collections::HashMap,
    time::Time,
    transform::components::Transform,
};

use crate::{definition::RigDefinition, player::HierarchicalRigPlayer};

/// Runs the evaluation phases for every rig player whose definition asset is
/// loaded. Evaluators are (re)initialized lazily when the asset first
/// arrives or the handle changes; evaluation errors are logged, not fatal.
pub fn run_rig_players(
    time: Res<Time>,
    rigs: Res<Assets<RigDefinition>>,
    mut players: Query<&mut HierarchicalRigPlayer>,
) {
    for mut player in &mut players {
        let player = &mut *player;
        if player.initialized_for != Some(player.rig.id()) {
            let Some(definition) = rigs.get(&player.rig) else {
                // Asset not loaded yet, keep queued commands for later.
                continue;
            };
            match crate::evaluation::RigEvaluator::initialize(definition) {
                Ok(evaluator) => {
                    player.evaluator = Some(evaluator);
                    player.initialized_for = Some(player.rig.id());
                }
                Err(err) => {
                    warn!("Failed to initialize rig evaluator: {err}");
                    player.initialized_for = Some(player.rig.id());
                    player.evaluator = None;
                    player.commands.clear();
                    continue;
                }
            }
        }
        let Some(evaluator) = player.evaluator.as_mut() else {
            player.commands.clear();
            continue;
        };

        let commands = std::mem::take(&mut player.commands);
        if let Err(err) = evaluator.pre_evaluate(commands, time.delta_secs()) {
            warn!("Ignored invalid rig command: {err}");
        }

        let mut pose = evaluator.reference_pose();
        evaluator.evaluate(&mut pose);
        evaluator.post_evaluate(&pose);
        player.pose = Some(pose);
    }
}

/// Copies the evaluated pose onto descendant entities whose [`Name`] matches
/// a rig node, the same way skeletal animation targets are addressed.
pub fn apply_rig_to_targets(
    players: Query<(Entity, &HierarchicalRigPlayer)>,
    children: Query<&Children>,
    names: Query<&Name>,
    mut transforms: Query<&mut Transform>,
) {
    for (root, player) in &players {
        let (Some(evaluator), Some(pose)) = (player.evaluator(), player.pose()) else {
            continue;
        };

        // PERF: the name lookup could be cached on the player
        let mut by_name: HashMap<&str, Entity> = HashMap::default();
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if let Ok(name) = names.get(current) {
                by_name.entry(name.as_str()).or_insert(current);
            }
            if let Ok(current_children) = children.get(current) {
                for &child in current_children {
                    pending.push(child);
                }
            }
        }

        for (id, node) in evaluator.hierarchy().iter() {
            let Some(&entity) = by_name.get(node.name.as_str()) else {
                continue;
            };
            if let Ok(mut transform) = transforms.get_mut(entity) {
                *transform = pose.local(id);
            }
        }
    }
}
