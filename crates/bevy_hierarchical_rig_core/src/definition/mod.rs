pub mod loader;
pub mod serial;

use bevy::{asset::Asset, ecs::name::Name, reflect::Reflect};

use crate::{
    constraint::Constraint,
    errors::{RigError, RigResult},
    hierarchy::{NodeId, RigHierarchy},
};

/// A complete rig: hierarchy, constraints and IK effectors.
///
/// Authored as `*.rig.ron` assets (see [`serial::RigDefinitionSerial`]) or
/// built in code; validated by [`RigDefinition::validate`] and consumed by
/// [`RigEvaluator::initialize`](crate::evaluation::RigEvaluator::initialize).
#[derive(Asset, Reflect, Clone, Debug, Default)]
pub struct RigDefinition {
    pub hierarchy: RigHierarchy,
    pub constraints: Vec<Constraint>,
    pub effectors: Vec<IkEffector>,
}

/// Two-bone (limb) IK effector. The chain is the end node's parent and
/// grandparent; target and pole are control nodes of the same hierarchy.
#[derive(Reflect, Clone, Debug)]
pub struct TwoBoneIk {
    pub name: Name,
    pub end_node: NodeId,
    pub target_node: NodeId,
    pub pole_node: Option<NodeId>,
    pub blend_duration: f32,
    pub enabled: bool,
}

impl TwoBoneIk {
    /// Resolves the solved chain as `[root, mid, end]`.
    pub fn chain(&self, hierarchy: &RigHierarchy) -> RigResult<[NodeId; 3]> {
        let end = self.end_node;
        let chain_err = || RigError::ChainTooShort {
            effector: self.name.to_string(),
            end: hierarchy.name(end).to_string(),
        };
        let mid = hierarchy.parent(end).ok_or_else(chain_err)?;
        let root = hierarchy.parent(mid).ok_or_else(chain_err)?;
        Ok([root, mid, end])
    }
}

/// Spline (spine) IK effector: a connected chain redistributed along a curve
/// fitted through control nodes.
#[derive(Reflect, Clone, Debug)]
pub struct SplineIk {
    pub name: Name,
    /// Root-first chain of nodes; each entry must be the parent of the next.
    pub chain: Vec<NodeId>,
    /// Nodes whose global positions become the spline control points.
    pub control_nodes: Vec<NodeId>,
    /// Twist (radians) about the bone axis at the chain root.
    pub root_twist: f32,
    /// Twist (radians) about the bone axis at the chain tip.
    pub tip_twist: f32,
    pub blend_duration: f32,
    pub enabled: bool,
}

#[derive(Reflect, Clone, Debug)]
pub enum IkEffector {
    TwoBone(TwoBoneIk),
    Spline(SplineIk),
}

impl IkEffector {
    pub fn name(&self) -> &Name {
        match self {
            IkEffector::TwoBone(e) => &e.name,
            IkEffector::Spline(e) => &e.name,
        }
    }

    pub fn blend_duration(&self) -> f32 {
        match self {
            IkEffector::TwoBone(e) => e.blend_duration,
            IkEffector::Spline(e) => e.blend_duration,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            IkEffector::TwoBone(e) => e.enabled,
            IkEffector::Spline(e) => e.enabled,
        }
    }

    /// Nodes this effector reads as solver inputs (targets, poles, spline
    /// controls).
    pub fn source_nodes(&self) -> Vec<NodeId> {
        match self {
            IkEffector::TwoBone(e) => {
                let mut sources = vec![e.target_node];
                sources.extend(e.pole_node);
                sources
            }
            IkEffector::Spline(e) => e.control_nodes.clone(),
        }
    }

    /// Nodes whose transforms this effector overwrites.
    pub fn driven_nodes(&self, hierarchy: &RigHierarchy) -> Vec<NodeId> {
        match self {
            IkEffector::TwoBone(e) => e
                .chain(hierarchy)
                .map(|chain| chain.to_vec())
                .unwrap_or_else(|_| vec![e.end_node]),
            IkEffector::Spline(e) => e.chain.clone(),
        }
    }

    pub fn validate(&self, hierarchy: &RigHierarchy) -> RigResult<()> {
        match self {
            IkEffector::TwoBone(e) => {
                e.chain(hierarchy)?;
            }
            IkEffector::Spline(e) => {
                if e.chain.len() < 3 {
                    return Err(RigError::InvalidChain {
                        effector: e.name.to_string(),
                        reason: format!("needs at least 3 chain nodes, got {}", e.chain.len()),
                    });
                }
                for pair in e.chain.windows(2) {
                    if hierarchy.parent(pair[1]) != Some(pair[0]) {
                        return Err(RigError::InvalidChain {
                            effector: e.name.to_string(),
                            reason: format!(
                                "{:?} is not the parent of {:?}",
                                hierarchy.name(pair[0]).as_str(),
                                hierarchy.name(pair[1]).as_str()
                            ),
                        });
                    }
                }
                if e.control_nodes.len() < 2 {
                    return Err(RigError::NotEnoughControlPoints {
                        effector: e.name.to_string(),
                        got: e.control_nodes.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl RigDefinition {
    /// Checks that constraints and effectors are structurally sound for the
    /// hierarchy. Dependency cycles are detected separately when the
    /// evaluation order is built.
    pub fn validate(&self) -> RigResult<()> {
        for constraint in &self.constraints {
            if constraint.node == constraint.source {
                return Err(RigError::SelfConstraint(
                    self.hierarchy.name(constraint.node).to_string(),
                ));
            }
        }
        for effector in &self.effectors {
            effector.validate(&self.hierarchy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::{math::Vec3, transform::components::Transform};

    /// A spine of `n` connected nodes plus two parentless control nodes.
    fn spine(n: usize) -> (RigDefinition, Vec<NodeId>, Vec<NodeId>) {
        let mut definition = RigDefinition::default();
        let mut chain = Vec::new();
        let mut parent = None;
        for i in 0..n {
            let id = definition
                .hierarchy
                .add_node(
                    format!("spine_{i}"),
                    parent,
                    Transform::from_translation(Vec3::Y),
                )
                .unwrap();
            chain.push(id);
            parent = Some(id);
        }
        let controls = (0..2)
            .map(|i| {
                definition
                    .hierarchy
                    .add_node(format!("ctrl_{i}"), None, Transform::IDENTITY)
                    .unwrap()
            })
            .collect();
        (definition, chain, controls)
    }

    fn spline(chain: Vec<NodeId>, controls: Vec<NodeId>) -> IkEffector {
        IkEffector::Spline(SplineIk {
            name: "spine_ik".into(),
            chain,
            control_nodes: controls,
            root_twist: 0.0,
            tip_twist: 0.0,
            blend_duration: 0.0,
            enabled: true,
        })
    }

    #[test]
    fn spline_chain_shorter_than_three_is_rejected() {
        let (mut definition, chain, controls) = spine(3);
        definition
            .effectors
            .push(spline(chain[..2].to_vec(), controls));
        let err = definition.validate().unwrap_err();
        assert!(matches!(err, RigError::InvalidChain { .. }));
    }

    #[test]
    fn disconnected_spline_chain_is_rejected() {
        let (mut definition, mut chain, controls) = spine(4);
        // Skipping a node breaks the parent links between entries.
        chain.remove(1);
        definition.effectors.push(spline(chain, controls));
        let err = definition.validate().unwrap_err();
        assert!(matches!(err, RigError::InvalidChain { .. }));
    }

    #[test]
    fn spline_with_one_control_is_rejected() {
        let (mut definition, chain, controls) = spine(3);
        definition
            .effectors
            .push(spline(chain, controls[..1].to_vec()));
        let err = definition.validate().unwrap_err();
        assert_eq!(
            err,
            RigError::NotEnoughControlPoints {
                effector: "spine_ik".to_string(),
                got: 1,
            }
        );
    }
}
