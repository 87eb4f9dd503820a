//! Hierarchical rig evaluation core.
//!
//! This crate implements a constraint-graph evaluator for skeletal rigs: a
//! hierarchy of named nodes with parent links and local transforms, a set of
//! transform constraints between nodes, and IK effectors (two-bone limbs and
//! spline-driven spines) layered on top with timed IK/FK blending.
//!
//! Rigs are authored as `*.rig.ron` assets (see [`RigDefinition`]) and driven
//! at runtime through the [`HierarchicalRigPlayer`] component, which owns a
//! [`RigEvaluator`] and runs the `initialize → pre_evaluate → evaluate →
//! post_evaluate` phases each frame. Constraint and IK evaluation order is
//! derived by topologically sorting the node dependency graph, so a node is
//! never read as a constraint source before it has itself been evaluated.
//!
//! [`RigDefinition`]: crate::definition::RigDefinition
//! [`HierarchicalRigPlayer`]: crate::player::HierarchicalRigPlayer
//! [`RigEvaluator`]: crate::evaluation::RigEvaluator

pub mod constraint;
pub mod definition;
pub mod dependency_graph;
pub mod errors;
pub mod evaluation;
pub mod hierarchy;
pub mod ik;
pub mod interpolation;
pub mod player;
pub mod plugin;
pub mod pose;
pub mod space_conversion;
pub mod systems;

pub mod prelude {
    use super::*;
    pub use constraint::{Constraint, ConstraintKind};
    pub use definition::{IkEffector, RigDefinition, SplineIk, TwoBoneIk};
    pub use errors::{AssetLoaderError, RigError, RigResult};
    pub use evaluation::{RigCommand, RigEvaluator};
    pub use hierarchy::{NodeId, RigHierarchy, RigNode};
    pub use ik::blend::{IkFkBlend, IkFkBlendState};
    pub use interpolation::InterpolateLinear;
    pub use player::HierarchicalRigPlayer;
    pub use plugin::HierarchicalRigPlugin;
    pub use pose::{NodePose, RigPose};
    pub use space_conversion::SpaceConversionContext;
}
