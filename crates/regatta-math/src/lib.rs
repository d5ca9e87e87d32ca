pub use glam::*;

/// Shortest-path spherical interpolation between two rotations.
///
/// When the pair's dot product is negative the target is negated so the arc
/// never takes the long way around the sphere. Nearly parallel rotations
/// degenerate the sine denominator, so those fall back to linear weights.
pub fn slerp(from: Quat, to: Quat, t: f32) -> Quat {
    let mut cosine = from.dot(to);
    let mut to = to;
    if cosine < 0.0 {
        cosine = -cosine;
        to = -to;
    }

    let (a, b) = if 1.0 - cosine > 1e-4 {
        let radians = cosine.acos();
        let sine = radians.sin();
        (
            ((1.0 - t) * radians).sin() / sine,
            (t * radians).sin() / sine,
        )
    } else {
        (1.0 - t, t)
    };

    Quat::from_xyzw(
        a * from.x + b * to.x,
        a * from.y + b * to.y,
        a * from.z + b * to.z,
        a * from.w + b * to.w,
    )
}

/// Composes translation, rotation and scale into one local transform with
/// scale applied first, then rotation, then translation.
pub fn compose_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_quat_eq(a: Quat, b: Quat) {
        // q and -q describe the same rotation.
        let direct = a.dot(b).abs();
        assert!(direct > 1.0 - EPS, "{:?} != {:?}", a, b);
    }

    #[test]
    fn slerp_hits_endpoints() {
        let from = Quat::from_rotation_y(0.3);
        let to = Quat::from_rotation_y(1.4);

        assert_quat_eq(slerp(from, to, 0.0), from);
        assert_quat_eq(slerp(from, to, 1.0), to);
    }

    #[test]
    fn slerp_takes_shortest_path_for_negated_target() {
        let from = Quat::from_rotation_z(0.5);
        let to = Quat::from_rotation_z(1.0);

        let a = slerp(from, to, 0.25);
        let b = slerp(from, -to, 0.25);
        assert_quat_eq(a, b);
    }

    #[test]
    fn slerp_of_parallel_rotations_is_stable() {
        let q = Quat::from_rotation_x(0.8);
        let mid = slerp(q, q, 0.5);
        assert_quat_eq(mid, q);
        assert!((mid.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn compose_trs_applies_scale_before_translation() {
        let m = compose_trs(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::splat(2.0));
        let p = m.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < EPS);
    }

    #[test]
    fn compose_trs_matches_explicit_product() {
        let t = Vec3::new(0.5, -1.0, 2.0);
        let r = Quat::from_rotation_y(0.7);
        let s = Vec3::new(2.0, 1.0, 0.5);

        let composed = compose_trs(t, r, s);
        let product = Mat4::from_translation(t) * Mat4::from_quat(r) * Mat4::from_scale(s);

        let p = Vec3::new(0.3, 0.7, -0.2);
        assert!((composed.transform_point3(p) - product.transform_point3(p)).length() < EPS);
    }
}
