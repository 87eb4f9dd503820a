use std::{
    cmp::Reverse,
    collections::BinaryHeap,
};

use bevy::platform::collections::HashSet;

use crate::{
    constraint::Constraint,
    definition::IkEffector,
    errors::{RigError, RigResult},
    hierarchy::{NodeId, RigHierarchy},
};

/// Evaluation ordering for a rig.
///
/// Nodes are topologically sorted so that parents precede children and
/// constraint/IK sources precede the nodes they drive. Ties are broken by
/// node index, which makes the order deterministic for a given definition.
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    order: Vec<NodeId>,
}

impl DependencyGraph {
    pub fn build(
        hierarchy: &RigHierarchy,
        constraints: &[Constraint],
        effectors: &[IkEffector],
    ) -> RigResult<Self> {
        let n = hierarchy.len();
        let mut edges: Vec<HashSet<usize>> = vec![HashSet::default(); n];
        let mut indegree = vec![0usize; n];

        let mut add_edge = |edges: &mut Vec<HashSet<usize>>,
                            indegree: &mut Vec<usize>,
                            from: NodeId,
                            to: NodeId| {
            if edges[from.index()].insert(to.index()) {
                indegree[to.index()] += 1;
            }
        };

        for (id, node) in hierarchy.iter() {
            if let Some(parent) = node.parent {
                add_edge(&mut edges, &mut indegree, parent, id);
            }
        }

        for constraint in constraints {
            if constraint.node == constraint.source {
                return Err(RigError::SelfConstraint(
                    hierarchy.name(constraint.node).to_string(),
                ));
            }
            add_edge(&mut edges, &mut indegree, constraint.source, constraint.node);
        }

        for effector in effectors {
            for source in effector.source_nodes() {
                for driven in effector.driven_nodes(hierarchy) {
                    if source != driven {
                        add_edge(&mut edges, &mut indegree, source, driven);
                    }
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = indegree
            .iter()
            .enumerate()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(Reverse(index)) = ready.pop() {
            order.push(NodeId::new(index));
            for &next in &edges[index] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() != n {
            let cycle = indegree
                .iter()
                .enumerate()
                .filter(|&(_, &deg)| deg > 0)
                .map(|(i, _)| hierarchy.name(NodeId::new(i)).to_string())
                .collect();
            return Err(RigError::ConstraintCycle(cycle));
        }

        Ok(Self { order })
    }

    pub fn order(&self) -> &[NodeId] {
        &self.order
    }
}
