use bevy::{
    math::{Quat, Vec3},
    reflect::Reflect,
    transform::components::Transform,
};
use serde::{Deserialize, Serialize};

use crate::{hierarchy::NodeId, interpolation::InterpolateLinear};

/// What a [`Constraint`] drives on its node.
#[derive(Reflect, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Full transform of the source, with the offset captured at
    /// initialization maintained.
    Parent,
    /// Only the global translation of the source (plus maintained offset).
    Position,
    /// Only the global rotation of the source (plus maintained offset).
    Rotation,
    /// Rotates the node so that `aim_axis` (node space) points at the
    /// source's global position. `up_axis` (node space) is kept as close to
    /// world up as the aim allows, resolving the twist about the aim
    /// direction.
    Aim { aim_axis: Vec3, up_axis: Vec3 },
}

/// A transform constraint between two nodes of the same hierarchy.
///
/// `weight` is the authored default; it can be overridden per-frame through
/// the evaluator. Weights are clamped to `[0, 1]` at resolve time.
#[derive(Reflect, Clone, Debug)]
pub struct Constraint {
    pub node: NodeId,
    pub source: NodeId,
    pub kind: ConstraintKind,
    pub weight: f32,
}

impl Constraint {
    /// Computes the constrained global transform for the node.
    ///
    /// `current` is the node's propagated global transform before this
    /// constraint, `source` the evaluated global transform of the source
    /// node, and `offset` the relative transform captured against the
    /// reference pose at initialization (identity for `Aim`).
    pub fn resolve(
        &self,
        current: Transform,
        source: Transform,
        offset: Transform,
        weight: f32,
    ) -> Transform {
        let weight = weight.clamp(0.0, 1.0);
        if weight <= 0.0 {
            return current;
        }

        let solved = match self.kind {
            ConstraintKind::Parent => source * offset,
            ConstraintKind::Position => Transform {
                translation: (source * offset).translation,
                ..current
            },
            ConstraintKind::Rotation => Transform {
                rotation: (source * offset).rotation,
                ..current
            },
            ConstraintKind::Aim { aim_axis, up_axis } => Transform {
                rotation: aim_rotation(current, source.translation, aim_axis, up_axis),
                ..current
            },
        };

        if weight >= 1.0 {
            solved
        } else {
            current.interpolate_linear(&solved, weight)
        }
    }
}

/// Rotation that points `aim_axis` of the node at `target`, with twist about
/// the aim direction chosen so `up_axis` stays as close to world up as
/// possible. Leaves the rotation unchanged when the target coincides with the
/// node position or the axes are degenerate.
fn aim_rotation(current: Transform, target: Vec3, aim_axis: Vec3, up_axis: Vec3) -> Quat {
    let Some(aim_axis) = aim_axis.try_normalize() else {
        return current.rotation;
    };
    let Some(to_target) = (target - current.translation).try_normalize() else {
        return current.rotation;
    };

    let forward = (current.rotation * aim_axis).normalize();
    let swing = Quat::from_rotation_arc(forward, to_target);
    let aimed = swing * current.rotation;

    let Some(up_axis) = up_axis.try_normalize() else {
        return aimed;
    };
    let maybe_twist = Option::zip(
        (aimed * up_axis).reject_from(to_target).try_normalize(),
        Vec3::Y.reject_from(to_target).try_normalize(),
    );
    let Some((current_up, desired_up)) = maybe_twist else {
        // Aiming straight up or down: twist is unconstrained, keep it.
        return aimed;
    };

    Quat::from_rotation_arc(current_up, desired_up) * aimed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(kind: ConstraintKind) -> Constraint {
        Constraint {
            node: NodeId::new(1),
            source: NodeId::new(0),
            kind,
            weight: 1.0,
        }
    }

    #[test]
    fn parent_constraint_full_weight_follows_source() {
        let c = constraint(ConstraintKind::Parent);
        let source = Transform::from_translation(Vec3::new(3.0, 0.0, 0.0));
        let offset = Transform::from_translation(Vec3::Y);
        let out = c.resolve(Transform::IDENTITY, source, offset, 1.0);
        assert!((out.translation - Vec3::new(3.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn position_constraint_keeps_rotation() {
        let c = constraint(ConstraintKind::Position);
        let current = Transform::from_rotation(Quat::from_rotation_x(1.0));
        let source = Transform::from_translation(Vec3::splat(2.0));
        let out = c.resolve(current, source, Transform::IDENTITY, 1.0);
        assert!((out.translation - Vec3::splat(2.0)).length() < 1e-5);
        assert!(out.rotation.angle_between(current.rotation) < 1e-5);
    }

    #[test]
    fn rotation_constraint_keeps_translation() {
        let c = constraint(ConstraintKind::Rotation);
        let current = Transform::from_translation(Vec3::Y * 3.0);
        let source = Transform::from_rotation(Quat::from_rotation_z(0.7));
        let out = c.resolve(current, source, Transform::IDENTITY, 1.0);
        assert_eq!(out.translation, current.translation);
        assert!(out.rotation.angle_between(source.rotation) < 1e-5);
    }

    #[test]
    fn out_of_range_weights_are_clamped() {
        let c = constraint(ConstraintKind::Position);
        let current = Transform::from_translation(Vec3::NEG_X);
        let source = Transform::from_translation(Vec3::X * 2.0);

        // Above 1 behaves as full weight, below 0 as a no-op.
        let over = c.resolve(current, source, Transform::IDENTITY, 5.0);
        assert!((over.translation - Vec3::X * 2.0).length() < 1e-5);
        let under = c.resolve(current, source, Transform::IDENTITY, -0.5);
        assert_eq!(under.translation, current.translation);
    }

    #[test]
    fn half_weight_blends_translation() {
        let c = constraint(ConstraintKind::Position);
        let source = Transform::from_translation(Vec3::X * 2.0);
        let out = c.resolve(Transform::IDENTITY, source, Transform::IDENTITY, 0.5);
        assert!((out.translation - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn zero_weight_is_noop() {
        let c = constraint(ConstraintKind::Parent);
        let current = Transform::from_translation(Vec3::NEG_Z);
        let out = c.resolve(current, Transform::from_translation(Vec3::X), Transform::IDENTITY, 0.0);
        assert_eq!(out.translation, current.translation);
    }

    #[test]
    fn aim_points_axis_at_target() {
        let c = constraint(ConstraintKind::Aim {
            aim_axis: Vec3::X,
            up_axis: Vec3::Y,
        });
        let current = Transform::from_translation(Vec3::ZERO);
        let source = Transform::from_translation(Vec3::new(0.0, 0.0, 5.0));
        let out = c.resolve(current, source, Transform::IDENTITY, 1.0);
        let aimed = out.rotation * Vec3::X;
        assert!((aimed - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn aim_at_own_position_keeps_rotation() {
        let c = constraint(ConstraintKind::Aim {
            aim_axis: Vec3::X,
            up_axis: Vec3::Y,
        });
        let current = Transform::from_rotation(Quat::from_rotation_y(0.3));
        let out = c.resolve(current, Transform::IDENTITY, Transform::IDENTITY, 1.0);
        assert!(out.rotation.angle_between(current.rotation) < 1e-6);
        assert!(out.rotation.is_finite());
    }
}
