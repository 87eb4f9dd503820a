//! # Bevy Hierarchical Rig
//!
//! **Bevy Hierarchical Rig** provides a hierarchical rig evaluation system for
//! [Bevy](https://bevyengine.org/): named node hierarchies, transform constraints,
//! two-bone and spline IK solvers and per-effector IK/FK blending.
//!
//! ## Introduction
//!
//! The library revolves around a single asset type:
//! - [`RigDefinition`], defined in `*.rig.ron` files. A rig definition lists the
//!   nodes of the hierarchy (each with a name, an optional parent and a reference
//!   local transform), the constraints layered on top of it and the IK effectors
//!   that drive parts of it. For example:
//!   ```ron
//!   (
//!       nodes: [
//!           (name: "shoulder"),
//!           (name: "elbow", parent: Some("shoulder"), translation: (2.0, 0.0, 0.0)),
//!           (name: "wrist", parent: Some("elbow"), translation: (2.0, 0.0, 0.0)),
//!           (name: "hand_control", translation: (3.0, 1.0, 0.0)),
//!       ],
//!       effectors: [
//!           TwoBone((
//!               name: "arm_ik",
//!               end: "wrist",
//!               target: "hand_control",
//!           )),
//!       ],
//!   )
//!   ```
//!
//! To evaluate a rig, attach a [`HierarchicalRigPlayer`] holding a handle to the
//! rig definition to an entity and add the [`HierarchicalRigPlugin`] to the app.
//! Every frame, the plugin runs the rig through its evaluation phases and writes
//! the resulting local transforms to the descendant entities whose [`Name`]
//! matches a rig node, before Bevy's transform propagation.
//!
//! Runtime interaction goes through the player's API rather than by mutating the
//! asset, so the same [`RigDefinition`] can be shared by any number of players:
//! ```ignore
//!     //...
//!     player.set_node_position("hand_control", target);
//!     player.set_effector_enabled("arm_ik", true);
//!     //...
//! ```
//!
//! Evaluation order is derived from the hierarchy and the constraint and effector
//! dependencies, so a constraint whose source is itself constrained always reads
//! an already-resolved transform. Cyclic setups are rejected when the rig
//! initializes.
//!
//! [`Name`]: bevy::ecs::name::Name
//! [`RigDefinition`]: crate::prelude::RigDefinition
//! [`HierarchicalRigPlayer`]: crate::prelude::HierarchicalRigPlayer
//! [`HierarchicalRigPlugin`]: crate::prelude::HierarchicalRigPlugin

pub use bevy_hierarchical_rig_core::*;

pub mod prelude {
    pub use bevy_hierarchical_rig_core::prelude::*;
}
