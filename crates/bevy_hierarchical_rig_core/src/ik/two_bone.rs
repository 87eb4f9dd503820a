use bevy::{
    math::{Quat, Vec3},
    transform::components::Transform,
};

// Adapted from https://blog.littlepolygon.com/posts/twobone/
//
// All transforms are in rig (global) space. The solver preserves bone
// lengths; targets beyond reach are clamped to slightly less than full
// extension so the chain never locks out completely straight.

const MAX_LEN_OFFSET: f32 = 0.01;

/// Solves a two-bone chain (`root -> mid -> end`) towards `target_pos`.
///
/// `pole_hint` is an optional global position pulling the bend plane; without
/// it the input pose's bend plane is reused (with an arbitrary but
/// deterministic plane for perfectly straight chains).
///
/// Returns `(root, mid, end)` output transforms. Degenerate chains (end
/// coincident with root, or target at the root) are returned unchanged.
pub fn solve_two_bone(
    root: Transform,
    mid: Transform,
    end: Transform,
    target_pos: Vec3,
    pole_hint: Option<Vec3>,
) -> (Transform, Transform, Transform) {
    // compute joint positions
    let in_end_loc = end.translation;
    let in_mid_loc = mid.translation;
    let in_root_loc = root.translation;

    // compute bone lengths
    let upper_len = in_root_loc.distance(in_mid_loc);
    let lower_len = in_mid_loc.distance(in_end_loc);
    let max_len = (upper_len + lower_len - MAX_LEN_OFFSET).max(MAX_LEN_OFFSET);

    // compute input planar basis vectors
    let Some(to_end) = (in_end_loc - in_root_loc).try_normalize() else {
        return (root, mid, end);
    };
    let in_pole_vec = (in_mid_loc - in_root_loc)
        .reject_from(to_end)
        .try_normalize()
        .unwrap_or_else(|| to_end.any_orthonormal_vector());

    // compute final planar basis vectors
    let to_target_offset = (target_pos - in_root_loc).clamp_length_max(max_len);
    let to_target_dist = to_target_offset.length();
    if to_target_dist <= f32::EPSILON {
        return (root, mid, end);
    }
    let to_target = to_target_offset / to_target_dist;

    let to_target_swing = Quat::from_rotation_arc(to_end, to_target);
    let out_pole_vec = pole_hint
        .and_then(|pole| (pole - in_root_loc).reject_from(to_target).try_normalize())
        .unwrap_or_else(|| to_target_swing * in_pole_vec);

    // apply law of cosines to get middle joint angle
    let denom = 2. * upper_len * to_target_dist;
    let mut cos_angle = 0.;
    if denom > f32::EPSILON {
        cos_angle = ((to_target_dist * to_target_dist + upper_len * upper_len
            - lower_len * lower_len)
            / denom)
            .clamp(-1., 1.);
    }
    let angle = cos_angle.acos();

    // compute final joint positions
    let pole_dist = upper_len * angle.sin();
    let eff_dist = upper_len * cos_angle;
    let out_end_loc = in_root_loc + to_target_offset;
    let out_mid_loc = in_root_loc + eff_dist * to_target + pole_dist * out_pole_vec;

    // compute final rotations
    let in_to_mid = in_mid_loc - in_root_loc;
    let out_to_mid = out_mid_loc - in_root_loc;
    let root_swing = match Option::zip(in_to_mid.try_normalize(), out_to_mid.try_normalize()) {
        Some((from, to)) => Quat::from_rotation_arc(from, to),
        None => Quat::IDENTITY,
    };
    let in_end_loc_with_root_swing = in_root_loc + root_swing * (in_end_loc - in_root_loc);
    let to_in_end = in_end_loc_with_root_swing - out_mid_loc;
    let to_out_end = out_end_loc - out_mid_loc;
    let mid_swing = match Option::zip(to_in_end.try_normalize(), to_out_end.try_normalize()) {
        Some((from, to)) => Quat::from_rotation_arc(from, to) * root_swing,
        None => root_swing,
    };

    // set up output transforms
    let out_root = Transform {
        rotation: root_swing * root.rotation,
        ..root
    };
    let out_mid = Transform {
        translation: out_mid_loc,
        rotation: mid_swing * mid.rotation,
        ..mid
    };
    let out_end = Transform {
        translation: out_end_loc,
        rotation: mid_swing * end.rotation,
        ..end
    };

    (out_root, out_mid, out_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_chain() -> (Transform, Transform, Transform) {
        (
            Transform::from_translation(Vec3::ZERO),
            Transform::from_translation(Vec3::Y),
            Transform::from_translation(Vec3::Y * 2.0),
        )
    }

    #[test]
    fn reachable_target_is_hit() {
        let (root, mid, end) = straight_chain();
        let target = Vec3::new(1.0, 1.0, 0.0);
        let (_, _, out_end) = solve_two_bone(root, mid, end, target, None);
        assert!(out_end.translation.distance(target) < 1e-4);
    }

    #[test]
    fn bone_lengths_are_preserved() {
        let (root, mid, end) = straight_chain();
        let target = Vec3::new(0.5, 1.2, 0.3);
        let (out_root, out_mid, out_end) = solve_two_bone(root, mid, end, target, None);
        let upper = out_root.translation.distance(out_mid.translation);
        let lower = out_mid.translation.distance(out_end.translation);
        assert!((upper - 1.0).abs() < 1e-4);
        assert!((lower - 1.0).abs() < 1e-4);
    }

    #[test]
    fn unreachable_target_straightens_without_nan() {
        let (root, mid, end) = straight_chain();
        let target = Vec3::new(10.0, 0.0, 0.0);
        let (out_root, out_mid, out_end) = solve_two_bone(root, mid, end, target, None);
        assert!(out_root.translation.is_finite());
        assert!(out_mid.translation.is_finite());
        assert!(out_end.translation.is_finite());
        assert!(out_root.rotation.is_finite());
        // End lands just short of full extension, on the line to the target.
        let dist = out_end.translation.length();
        assert!((dist - (2.0 - 0.01)).abs() < 1e-3);
        assert!(out_end.translation.normalize().distance(Vec3::X) < 1e-3);
    }

    #[test]
    fn pole_hint_selects_bend_side() {
        let (root, mid, end) = straight_chain();
        let target = Vec3::new(0.0, 1.4, 0.0);
        let (_, out_mid, _) =
            solve_two_bone(root, mid, end, target, Some(Vec3::new(5.0, 1.0, 0.0)));
        assert!(out_mid.translation.x > 0.1);

        let (_, out_mid, _) =
            solve_two_bone(root, mid, end, target, Some(Vec3::new(-5.0, 1.0, 0.0)));
        assert!(out_mid.translation.x < -0.1);
    }

    #[test]
    fn degenerate_chain_is_left_unchanged() {
        let t = Transform::from_translation(Vec3::ONE);
        let (out_root, out_mid, out_end) = solve_two_bone(t, t, t, Vec3::X, None);
        assert_eq!(out_root.translation, t.translation);
        assert_eq!(out_mid.translation, t.translation);
        assert_eq!(out_end.translation, t.translation);
    }
}
