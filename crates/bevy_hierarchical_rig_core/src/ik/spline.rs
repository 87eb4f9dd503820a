use bevy::{
    math::{
        Quat, Vec3,
        cubic_splines::{CubicCardinalSpline, CubicGenerator},
    },
    transform::components::Transform,
};

/// Polyline samples per spline segment. The chain-node placement marches
/// along this polyline, so the value trades accuracy for solve cost.
const SUBDIVISIONS_PER_SEGMENT: usize = 32;

/// Fits a Catmull-Rom spline through `control_points` and redistributes the
/// chain along it, preserving the input bone lengths.
///
/// `chain` holds the global transforms of the spine nodes, root first. Each
/// bone is re-aimed at its child; twist about the bone direction is
/// interpolated linearly from `root_twist` to `tip_twist` (radians) along the
/// chain.
///
/// Returns `None` when no curve can be fitted (fewer than two control
/// points) or the chain is degenerate (zero total length); callers keep the
/// input pose in that case.
pub fn solve_spline(
    chain: &[Transform],
    control_points: &[Vec3],
    root_twist: f32,
    tip_twist: f32,
) -> Option<Vec<Transform>> {
    if chain.len() < 2 || control_points.len() < 2 {
        return None;
    }

    let bone_lengths: Vec<f32> = chain
        .windows(2)
        .map(|pair| pair[0].translation.distance(pair[1].translation))
        .collect();
    if bone_lengths.iter().sum::<f32>() <= f32::EPSILON {
        return None;
    }

    let curve = CubicCardinalSpline::new(0.5, control_points.to_vec())
        .to_curve()
        .ok()?;
    let segments = control_points.len() - 1;
    let samples = segments * SUBDIVISIONS_PER_SEGMENT;
    let polyline: Vec<Vec3> = (0..=samples)
        .map(|i| curve.position(i as f32 / SUBDIVISIONS_PER_SEGMENT as f32))
        .collect();

    // Place the chain root at the curve start, then march each node to the
    // next point at exactly one bone length from the previous node.
    let mut positions = Vec::with_capacity(chain.len());
    positions.push(polyline[0]);
    let mut cursor = 0usize;
    for &length in &bone_lengths {
        let previous = *positions.last().unwrap();
        let (next, next_cursor) = march(&polyline, previous, cursor, length);
        positions.push(next);
        cursor = next_cursor;
    }

    // Aim each bone at its child; the tip reuses the last bone's swing.
    let last = chain.len() - 1;
    let mut out = Vec::with_capacity(chain.len());
    let mut last_swing = Quat::IDENTITY;
    for i in 0..chain.len() {
        let (swing, axis) = if i < last {
            let old_dir = (chain[i + 1].translation - chain[i].translation).try_normalize();
            let new_dir = (positions[i + 1] - positions[i]).try_normalize();
            match Option::zip(old_dir, new_dir) {
                Some((from, to)) => (Quat::from_rotation_arc(from, to), to),
                None => (Quat::IDENTITY, Vec3::Y),
            }
        } else {
            (last_swing, (positions[last] - positions[last - 1])
                .try_normalize()
                .unwrap_or(Vec3::Y))
        };
        last_swing = swing;

        let fraction = i as f32 / last as f32;
        let twist = Quat::from_axis_angle(axis, root_twist + (tip_twist - root_twist) * fraction);

        out.push(Transform {
            translation: positions[i],
            rotation: twist * swing * chain[i].rotation,
            ..chain[i]
        });
    }

    Some(out)
}

/// Walks `polyline` starting at sample index `cursor` and returns the first
/// point at euclidean distance `distance` from `from`, interpolating between
/// samples. Walks straight past the end of the polyline along its final
/// direction when the curve is shorter than the chain.
fn march(polyline: &[Vec3], from: Vec3, cursor: usize, distance: f32) -> (Vec3, usize) {
    for i in cursor + 1..polyline.len() {
        if polyline[i].distance(from) >= distance {
            let before = polyline[i - 1];
            let after = polyline[i];
            // Bisect the sample segment for the exact crossing point.
            let (mut lo, mut hi) = (0.0f32, 1.0f32);
            for _ in 0..16 {
                let t = 0.5 * (lo + hi);
                if before.lerp(after, t).distance(from) >= distance {
                    hi = t;
                } else {
                    lo = t;
                }
            }
            return (before.lerp(after, 0.5 * (lo + hi)), i - 1);
        }
    }

    let end = *polyline.last().unwrap();
    let dir = (end - polyline[polyline.len() - 2])
        .try_normalize()
        .or_else(|| (end - from).try_normalize())
        .unwrap_or(Vec3::Y);
    let remaining = distance - end.distance(from);
    (end + dir * remaining.max(0.0), polyline.len() - 1)
}
