use bevy::{platform::collections::HashMap, transform::components::Transform};

use crate::{
    constraint::Constraint,
    definition::{IkEffector, RigDefinition},
    dependency_graph::DependencyGraph,
    errors::{RigError, RigResult},
    hierarchy::{NodeId, RigHierarchy},
    ik::{blend::IkFkBlend, solve_spline, solve_two_bone},
    interpolation::InterpolateLinear,
    pose::{NodePose, RigPose},
    space_conversion::SpaceConversionContext,
};

/// Per-frame input to the evaluator, addressed by node/effector name.
#[derive(Clone, Debug)]
pub enum RigCommand {
    /// Overrides channels of a node's local transform. Overrides persist
    /// until cleared, so controls keep their last driven position.
    SetNodePose { node: String, pose: NodePose },
    ClearNodePose { node: String },
    /// Overrides the weight of the constraint at `index` (definition order).
    SetConstraintWeight { index: usize, weight: f32 },
    /// Removes a weight override, restoring the authored weight.
    ClearConstraintWeight { index: usize },
    /// Starts a timed IK/FK blend for the named effector.
    SetEffectorEnabled { effector: String, enabled: bool },
}

#[derive(Clone, Debug)]
struct EffectorRuntime {
    config: IkEffector,
    blend: IkFkBlend,
}

/// Evaluation driver for one rig instance.
///
/// Constructing the evaluator is the `Initialize` phase: it builds the
/// dependency order, validates the definition and captures constraint
/// offsets against the reference pose. Each frame then runs
/// [`pre_evaluate`](Self::pre_evaluate), [`evaluate`](Self::evaluate) and
/// [`post_evaluate`](Self::post_evaluate). A definition change requires a
/// fresh evaluator.
#[derive(Clone, Debug)]
pub struct RigEvaluator {
    hierarchy: RigHierarchy,
    constraints: Vec<Constraint>,
    /// Constraint indices per node, in declaration order.
    constraints_of: Vec<Vec<usize>>,
    /// Maintained offsets captured at initialization, one per constraint.
    offsets: Vec<Transform>,
    effectors: Vec<EffectorRuntime>,
    order: Vec<NodeId>,
    /// Scratch buffer of global transforms, refreshed during evaluation.
    globals: Vec<Transform>,
    node_overrides: HashMap<NodeId, NodePose>,
    weight_overrides: HashMap<usize, f32>,
}

impl RigEvaluator {
    /// The `Initialize` phase.
    pub fn initialize(definition: &RigDefinition) -> RigResult<Self> {
        definition.validate()?;
        let graph = DependencyGraph::build(
            &definition.hierarchy,
            &definition.constraints,
            &definition.effectors,
        )?;

        let hierarchy = definition.hierarchy.clone();
        let n = hierarchy.len();

        let mut constraints_of = vec![Vec::new(); n];
        for (index, constraint) in definition.constraints.iter().enumerate() {
            constraints_of[constraint.node.index()].push(index);
        }

        // Capture maintained offsets against the reference pose.
        let offsets = definition
            .constraints
            .iter()
            .map(|constraint| {
                let source_global = hierarchy.global_transform(constraint.source);
                let node_global = hierarchy.global_transform(constraint.node);
                Transform::from_matrix(source_global.to_matrix().inverse()) * node_global
            })
            .collect();

        let effectors = definition
            .effectors
            .iter()
            .map(|config| EffectorRuntime {
                blend: IkFkBlend::new(config.enabled(), config.blend_duration()),
                config: config.clone(),
            })
            .collect();

        Ok(Self {
            constraints: definition.constraints.clone(),
            constraints_of,
            offsets,
            effectors,
            order: graph.order().to_vec(),
            globals: vec![Transform::IDENTITY; n],
            node_overrides: HashMap::default(),
            weight_overrides: HashMap::default(),
            hierarchy,
        })
    }

    pub fn hierarchy(&self) -> &RigHierarchy {
        &self.hierarchy
    }

    /// A fresh pose matching the rig's reference pose, sized for
    /// [`evaluate`](Self::evaluate).
    pub fn reference_pose(&self) -> RigPose {
        RigPose::from_reference(&self.hierarchy)
    }

    /// Global transforms computed by the last evaluation, indexed by node.
    pub fn global_transforms(&self) -> &[Transform] {
        &self.globals
    }

    /// Current IK weight of the named effector.
    pub fn effector_weight(&self, name: &str) -> Option<f32> {
        self.effectors
            .iter()
            .find(|e| e.config.name().as_str() == name)
            .map(|e| e.blend.weight())
    }

    /// The `PreEvaluate` phase: ingests commands and ticks blend state.
    ///
    /// All valid commands are applied even when an invalid one is
    /// encountered; the first error is returned for the caller to report.
    pub fn pre_evaluate(
        &mut self,
        commands: impl IntoIterator<Item = RigCommand>,
        dt: f32,
    ) -> RigResult<()> {
        let mut first_error = None;
        for command in commands {
            if let Err(err) = self.apply_command(command) {
                first_error.get_or_insert(err);
            }
        }
        for effector in &mut self.effectors {
            effector.blend.tick(dt);
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn apply_command(&mut self, command: RigCommand) -> RigResult<()> {
        match command {
            RigCommand::SetNodePose { node, pose } => {
                let id = self.node_id(&node)?;
                self.node_overrides.insert(id, pose);
            }
            RigCommand::ClearNodePose { node } => {
                let id = self.node_id(&node)?;
                self.node_overrides.remove(&id);
            }
            RigCommand::SetConstraintWeight { index, weight } => {
                if index >= self.constraints.len() {
                    return Err(RigError::UnknownConstraint(index));
                }
                self.weight_overrides.insert(index, weight);
            }
            RigCommand::ClearConstraintWeight { index } => {
                if index >= self.constraints.len() {
                    return Err(RigError::UnknownConstraint(index));
                }
                self.weight_overrides.remove(&index);
            }
            RigCommand::SetEffectorEnabled { effector, enabled } => {
                let effector = self
                    .effectors
                    .iter_mut()
                    .find(|e| e.config.name().as_str() == effector)
                    .ok_or(RigError::UnknownEffector(effector))?;
                effector.blend.set_enabled(enabled);
            }
        }
        Ok(())
    }

    fn node_id(&self, name: &str) -> RigResult<NodeId> {
        self.hierarchy
            .node_id(name)
            .ok_or_else(|| RigError::UnknownNode(name.to_string()))
    }

    /// The `Evaluate` phase: applies overrides, walks nodes in dependency
    /// order resolving constraints, then runs IK effectors.
    pub fn evaluate(&mut self, pose: &mut RigPose) {
        for (&id, node_pose) in self.node_overrides.iter() {
            pose.apply(id, node_pose);
        }

        // Constraint pass. Dependency order guarantees a source's global is
        // final before any dependent reads it.
        for i in 0..self.order.len() {
            let id = self.order[i];
            let parent = self.hierarchy.parent(id);
            let parent_global = parent
                .map(|p| self.globals[p.index()])
                .unwrap_or(Transform::IDENTITY);
            let mut global = parent_global * pose.local(id);

            for &index in &self.constraints_of[id.index()] {
                let constraint = &self.constraints[index];
                let weight = self
                    .weight_overrides
                    .get(&index)
                    .copied()
                    .unwrap_or(constraint.weight);
                global = constraint.resolve(
                    global,
                    self.globals[constraint.source.index()],
                    self.offsets[index],
                    weight,
                );
            }

            self.globals[id.index()] = global;
            pose.set_local(
                id,
                match parent {
                    Some(_) => Transform::from_matrix(parent_global.to_matrix().inverse()) * global,
                    None => global,
                },
            );
        }

        // IK pass, on top of the constrained pose.
        for i in 0..self.effectors.len() {
            let weight = self.effectors[i].blend.weight();
            if weight <= 0.0 {
                continue;
            }
            match self.effectors[i].config.clone() {
                IkEffector::TwoBone(e) => self.apply_two_bone(&e, weight, pose),
                IkEffector::Spline(e) => self.apply_spline(&e, weight, pose),
            }
            // Solved nodes may have evaluated descendants; bring every
            // global back in sync before the next effector reads them.
            self.refresh_globals(pose);
        }
    }

    /// The `PostEvaluate` phase: leaves all globals consistent with the
    /// final pose.
    pub fn post_evaluate(&mut self, pose: &RigPose) {
        self.refresh_globals(pose);
    }

    fn refresh_globals(&mut self, pose: &RigPose) {
        // Insertion order is parent-before-child.
        for (id, node) in self.hierarchy.iter() {
            let parent_global = node
                .parent
                .map(|p| self.globals[p.index()])
                .unwrap_or(Transform::IDENTITY);
            self.globals[id.index()] = parent_global * pose.local(id);
        }
    }

    fn apply_two_bone(&mut self, effector: &crate::definition::TwoBoneIk, weight: f32, pose: &mut RigPose) {
        // Validated at initialization.
        let Ok([root, mid, end]) = effector.chain(&self.hierarchy) else {
            return;
        };
        let target_pos = self.globals[effector.target_node.index()].translation;
        let pole_hint = effector
            .pole_node
            .map(|pole| self.globals[pole.index()].translation);

        let (s_root, s_mid, s_end) = solve_two_bone(
            self.globals[root.index()],
            self.globals[mid.index()],
            self.globals[end.index()],
            target_pos,
            pole_hint,
        );

        // The pose is consistent with the cached globals here, so the root
        // can be rebased through its (unsolved) parent chain.
        let root_local = SpaceConversionContext {
            hierarchy: &self.hierarchy,
            pose,
        }
        .global_to_local(s_root, self.hierarchy.parent(root));
        let locals = [
            (root, root_local),
            (mid, Transform::from_matrix(s_root.to_matrix().inverse()) * s_mid),
            (end, Transform::from_matrix(s_mid.to_matrix().inverse()) * s_end),
        ];
        for (id, solved_local) in locals {
            pose.set_local(id, pose.local(id).interpolate_linear(&solved_local, weight));
        }
    }

    fn apply_spline(&mut self, effector: &crate::definition::SplineIk, weight: f32, pose: &mut RigPose) {
        let chain_globals: Vec<Transform> = effector
            .chain
            .iter()
            .map(|id| self.globals[id.index()])
            .collect();
        let control_points: Vec<_> = effector
            .control_nodes
            .iter()
            .map(|id| self.globals[id.index()].translation)
            .collect();

        let Some(solved) = solve_spline(
            &chain_globals,
            &control_points,
            effector.root_twist,
            effector.tip_twist,
        ) else {
            // Degenerate chain or curve, keep the input pose.
            return;
        };

        let mut parent_global = effector
            .chain
            .first()
            .and_then(|&root| self.hierarchy.parent(root))
            .map(|p| self.globals[p.index()])
            .unwrap_or(Transform::IDENTITY);
        for (&id, &solved_global) in effector.chain.iter().zip(solved.iter()) {
            let solved_local =
                Transform::from_matrix(parent_global.to_matrix().inverse()) * solved_global;
            pose.set_local(id, pose.local(id).interpolate_linear(&solved_local, weight));
            parent_global = solved_global;
        }
    }
}
