use bevy::reflect::Reflect;
use thiserror::Error;

/// Possible errors produced when building or evaluating a rig.
#[non_exhaustive]
#[derive(Debug, Error, Reflect, Clone, PartialEq)]
pub enum RigError {
    #[error("A node named {0:?} already exists in the hierarchy")]
    DuplicateNodeName(String),
    #[error("Node {child:?} references a parent that is not part of the hierarchy")]
    MissingParent { child: String },
    #[error("No node named {0:?} exists in the hierarchy")]
    UnknownNode(String),
    #[error("Node {0:?} is constrained to itself")]
    SelfConstraint(String),
    #[error("Constraints form a dependency cycle involving: {0:?}")]
    ConstraintCycle(Vec<String>),
    #[error("Two-bone effector {effector:?} needs end node {end:?} to have a parent and grandparent")]
    ChainTooShort { effector: String, end: String },
    #[error("Spline effector {effector:?} has an invalid chain: {reason}")]
    InvalidChain { effector: String, reason: String },
    #[error("Spline effector {effector:?} needs at least 2 control nodes, got {got}")]
    NotEnoughControlPoints { effector: String, got: usize },
    #[error("Spline effector {effector:?} could not fit a curve through its control points")]
    SplineFit { effector: String },
    #[error("No effector named {0:?} exists in the rig")]
    UnknownEffector(String),
    #[error("No constraint with index {0} exists in the rig")]
    UnknownConstraint(usize),
}

pub type RigResult<T> = Result<T, RigError>;
