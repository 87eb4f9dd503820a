use bevy::{
    ecs::name::Name,
    math::{Quat, Vec3},
    transform::components::Transform,
};
use serde::{Deserialize, Serialize};

use super::{IkEffector, RigDefinition, SplineIk, TwoBoneIk};
use crate::{
    constraint::{Constraint, ConstraintKind},
    errors::{RigError, RigResult},
    hierarchy::{NodeId, RigHierarchy},
};

/// Serialized form of a rig definition (`*.rig.ron`).
///
/// Nodes must be listed parent-first; all cross references are by node name
/// and resolved during [`RigDefinition::from_serial`].
#[derive(Serialize, Deserialize)]
pub struct RigDefinitionSerial {
    pub nodes: Vec<RigNodeSerial>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSerial>,
    #[serde(default)]
    pub effectors: Vec<IkEffectorSerial>,
}

#[derive(Serialize, Deserialize)]
pub struct RigNodeSerial {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Serialize, Deserialize)]
pub struct ConstraintSerial {
    pub node: String,
    pub source: String,
    pub kind: ConstraintKind,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

#[derive(Serialize, Deserialize)]
pub enum IkEffectorSerial {
    TwoBone(TwoBoneIkSerial),
    Spline(SplineIkSerial),
}

#[derive(Serialize, Deserialize)]
pub struct TwoBoneIkSerial {
    pub name: String,
    pub end: String,
    pub target: String,
    #[serde(default)]
    pub pole: Option<String>,
    #[serde(default)]
    pub blend_duration: f32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Serialize, Deserialize)]
pub struct SplineIkSerial {
    pub name: String,
    pub chain: Vec<String>,
    pub controls: Vec<String>,
    #[serde(default)]
    pub root_twist: f32,
    #[serde(default)]
    pub tip_twist: f32,
    #[serde(default)]
    pub blend_duration: f32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl RigDefinition {
    pub fn from_serial(serial: RigDefinitionSerial) -> RigResult<Self> {
        let mut hierarchy = RigHierarchy::default();
        for node in &serial.nodes {
            let parent = node
                .parent
                .as_deref()
                .map(|parent| {
                    hierarchy
                        .node_id(parent)
                        .ok_or_else(|| RigError::MissingParent {
                            child: node.name.clone(),
                        })
                })
                .transpose()?;
            hierarchy.add_node(
                node.name.clone(),
                parent,
                Transform {
                    translation: node.translation,
                    rotation: node.rotation,
                    scale: node.scale,
                },
            )?;
        }

        let resolve = |name: &str| -> RigResult<NodeId> {
            hierarchy
                .node_id(name)
                .ok_or_else(|| RigError::UnknownNode(name.to_string()))
        };

        let constraints = serial
            .constraints
            .iter()
            .map(|c| {
                Ok(Constraint {
                    node: resolve(&c.node)?,
                    source: resolve(&c.source)?,
                    kind: c.kind,
                    weight: c.weight,
                })
            })
            .collect::<Result<Vec<_>, RigError>>()?;

        let effectors = serial
            .effectors
            .iter()
            .map(|effector| {
                Ok(match effector {
                    IkEffectorSerial::TwoBone(e) => IkEffector::TwoBone(TwoBoneIk {
                        name: Name::new(e.name.clone()),
                        end_node: resolve(&e.end)?,
                        target_node: resolve(&e.target)?,
                        pole_node: e.pole.as_deref().map(|pole| resolve(pole)).transpose()?,
                        blend_duration: e.blend_duration,
                        enabled: e.enabled,
                    }),
                    IkEffectorSerial::Spline(e) => IkEffector::Spline(SplineIk {
                        name: Name::new(e.name.clone()),
                        chain: e.chain.iter().map(|n| resolve(n)).collect::<Result<_, _>>()?,
                        control_nodes: e
                            .controls
                            .iter()
                            .map(|n| resolve(n))
                            .collect::<Result<_, _>>()?,
                        root_twist: e.root_twist,
                        tip_twist: e.tip_twist,
                        blend_duration: e.blend_duration,
                        enabled: e.enabled,
                    }),
                })
            })
            .collect::<Result<Vec<_>, RigError>>()?;

        let definition = RigDefinition {
            hierarchy,
            constraints,
            effectors,
        };
        definition.validate()?;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARM_RIG: &str = r#"(
        nodes: [
            (name: "shoulder"),
            (name: "elbow", parent: Some("shoulder"), translation: (0.0, 1.0, 0.0)),
            (name: "hand", parent: Some("elbow"), translation: (0.0, 1.0, 0.0)),
            (name: "hand_ctrl", translation: (1.0, 1.0, 0.0)),
        ],
        constraints: [
            (node: "hand", source: "hand_ctrl", kind: Rotation, weight: 0.5),
        ],
        effectors: [
            TwoBone((name: "arm_ik", end: "hand", target: "hand_ctrl")),
        ],
    )"#;

    #[test]
    fn parses_and_resolves_names() {
        let serial: RigDefinitionSerial = ron::de::from_str(ARM_RIG).unwrap();
        let definition = RigDefinition::from_serial(serial).unwrap();
        assert_eq!(definition.hierarchy.len(), 4);
        assert_eq!(definition.constraints.len(), 1);
        assert_eq!(definition.effectors.len(), 1);

        let hand = definition.hierarchy.node_id("hand").unwrap();
        assert_eq!(definition.constraints[0].node, hand);
        assert!(definition.effectors[0].enabled());
        assert_eq!(definition.effectors[0].blend_duration(), 0.0);
    }

    #[test]
    fn unknown_reference_fails() {
        let serial: RigDefinitionSerial = ron::de::from_str(
            r#"(
                nodes: [(name: "a")],
                constraints: [(node: "a", source: "nope", kind: Parent)],
            )"#,
        )
        .unwrap();
        let err = RigDefinition::from_serial(serial).unwrap_err();
        assert_eq!(err, RigError::UnknownNode("nope".to_string()));
    }

    #[test]
    fn unknown_parent_fails() {
        let serial: RigDefinitionSerial =
            ron::de::from_str(r#"(nodes: [(name: "a", parent: Some("ghost"))])"#).unwrap();
        let err = RigDefinition::from_serial(serial).unwrap_err();
        assert!(matches!(err, RigError::MissingParent { .. }));
    }

    #[test]
    fn chain_too_short_fails_validation() {
        let serial: RigDefinitionSerial = ron::de::from_str(
            r#"(
                nodes: [(name: "root"), (name: "end", parent: Some("root")), (name: "ctrl")],
                effectors: [TwoBone((name: "ik", end: "end", target: "ctrl"))],
            )"#,
        )
        .unwrap();
        let err = RigDefinition::from_serial(serial).unwrap_err();
        assert!(matches!(err, RigError::ChainTooShort { .. }));
    }
}
