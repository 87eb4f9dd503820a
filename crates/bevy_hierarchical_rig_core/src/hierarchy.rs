use bevy::{ecs::name::Name, platform::collections::HashMap, reflect::Reflect, transform::components::Transform};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{RigError, RigResult};

/// Stable index of a node within its [`RigHierarchy`].
///
/// Ids are only meaningful for the hierarchy that produced them; they are
/// assigned in insertion order and never reused.
#[derive(
    Reflect, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// A single named node: parent link plus reference-pose local transform.
#[derive(Reflect, Clone, Debug)]
pub struct RigNode {
    pub name: Name,
    pub parent: Option<NodeId>,
    /// Local transform of the node in the rig's reference pose.
    pub local_transform: Transform,
}

/// Ordered collection of named nodes with parent links.
///
/// Insertion requires the parent to already exist, so the node array is
/// always a valid parent-before-child order. Multiple roots are allowed.
#[derive(Reflect, Clone, Debug, Default)]
pub struct RigHierarchy {
    nodes: Vec<RigNode>,
    #[reflect(ignore)]
    name_to_id: IndexMap<Name, NodeId>,
    #[reflect(ignore)]
    children_map: HashMap<NodeId, Vec<NodeId>>,
}

impl RigHierarchy {
    /// Appends a node. The parent, if any, must already be part of the
    /// hierarchy and names must be unique.
    pub fn add_node(
        &mut self,
        name: impl Into<Name>,
        parent: Option<NodeId>,
        local_transform: Transform,
    ) -> RigResult<NodeId> {
        let name = name.into();
        if self.name_to_id.contains_key(&name) {
            return Err(RigError::DuplicateNodeName(name.to_string()));
        }
        if let Some(parent) = parent {
            if parent.0 >= self.nodes.len() {
                return Err(RigError::MissingParent {
                    child: name.to_string(),
                });
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(RigNode {
            name: name.clone(),
            parent,
            local_transform,
        });
        self.name_to_id.insert(name, id);
        if let Some(parent) = parent {
            self.children_map.entry(parent).or_default().push(id);
        }

        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &RigNode {
        &self.nodes[id.0]
    }

    pub fn name(&self, id: NodeId) -> &Name {
        &self.nodes[id.0].name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children_map.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Looks up a node id by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.name_to_id.get(&Name::new(name.to_owned())).copied()
    }

    /// Iterates over nodes in insertion (parent-before-child) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &RigNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Local transform of the node in the reference pose.
    pub fn local_transform(&self, id: NodeId) -> Transform {
        self.nodes[id.0].local_transform
    }

    /// Global (rig-space) transform of the node in the reference pose,
    /// computed by walking the parent chain.
    pub fn global_transform(&self, id: NodeId) -> Transform {
        let mut transform = self.nodes[id.0].local_transform;
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            transform = self.nodes[parent.0].local_transform * transform;
            current = self.nodes[parent.0].parent;
        }
        transform
    }

    /// Whether `ancestor` appears on the parent chain of `id` (a node is not
    /// its own ancestor).
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes[parent.0].parent;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    fn three_node_chain() -> (RigHierarchy, NodeId, NodeId, NodeId) {
        let mut hierarchy = RigHierarchy::default();
        let root = hierarchy
            .add_node("root", None, Transform::IDENTITY)
            .unwrap();
        let mid = hierarchy
            .add_node("mid", Some(root), Transform::from_translation(Vec3::Y))
            .unwrap();
        let tip = hierarchy
            .add_node("tip", Some(mid), Transform::from_translation(Vec3::Y))
            .unwrap();
        (hierarchy, root, mid, tip)
    }

    #[test]
    fn nodes_are_inserted_in_order() {
        let (hierarchy, root, mid, tip) = three_node_chain();
        let ids: Vec<_> = hierarchy.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![root, mid, tip]);
        assert_eq!(hierarchy.node_id("mid"), Some(mid));
        assert_eq!(hierarchy.parent(tip), Some(mid));
        assert_eq!(hierarchy.children(root), &[mid]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut hierarchy = RigHierarchy::default();
        hierarchy.add_node("a", None, Transform::IDENTITY).unwrap();
        let err = hierarchy
            .add_node("a", None, Transform::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, RigError::DuplicateNodeName(_)));
    }

    #[test]
    fn reference_globals_accumulate_parent_chain() {
        let (hierarchy, _, _, tip) = three_node_chain();
        let global = hierarchy.global_transform(tip);
        assert!((global.translation - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn ancestor_queries() {
        let (hierarchy, root, mid, tip) = three_node_chain();
        assert!(hierarchy.is_ancestor_of(root, tip));
        assert!(hierarchy.is_ancestor_of(mid, tip));
        assert!(!hierarchy.is_ancestor_of(tip, root));
        assert!(!hierarchy.is_ancestor_of(tip, tip));
    }
}
