use isogrid_geom::{Bounds2, Mat4, Vec2, Vec3};
use proptest::prelude::*;
use proptest::strategy::Strategy;

fn approx_abs_rel(a: f32, b: f32, atol: f32, rtol: f32) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn bounded_f32() -> impl Strategy<Value = f32> {
    (-1e3f32..1e3f32).prop_filter("finite", |v| v.is_finite())
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f32(), bounded_f32(), bounded_f32()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_eye() -> impl Strategy<Value = Vec3> {
    // Eyes sampled around the camera's actual orbit envelope (height and
    // orbit radius 60), away from the target so look_at stays
    // non-degenerate. An f32 cofactor inverse at kilometer eye distances
    // loses too many bits for a meaningful round-trip check.
    (20.0f32..150.0, 20.0f32..150.0, 20.0f32..150.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // Inverting the view-projection and projecting back must round-trip
    // world points that sit in front of the camera.
    #[test]
    fn view_projection_inverse_roundtrip(
        eye in arb_eye(),
        px in -100.0f32..100.0,
        pz in -100.0f32..100.0,
    ) {
        let view = Mat4::look_at(eye, Vec3::ZERO, Vec3::UP);
        let proj = Mat4::perspective(45f32.to_radians(), 1.6, 0.1, 2000.0);
        let vp = proj.mul(&view);
        let inv = vp.inverse().expect("invertible");
        let p = Vec3::new(px, 0.0, pz);
        let clip = vp.transform4(p, 1.0);
        prop_assume!(clip.w > 1.0);
        let back = inv.transform4(Vec3::new(clip.x, clip.y, clip.z), clip.w);
        prop_assert!(approx_abs_rel(back.x / back.w, p.x, 5e-2, 1e-2));
        prop_assert!(approx_abs_rel(back.z / back.w, p.z, 5e-2, 1e-2));
    }

    // Matrix multiply by identity is a no-op on transformed points.
    #[test]
    fn mat4_identity_neutral(v in arb_vec3()) {
        let view = Mat4::look_at(Vec3::new(10.0, 10.0, 10.0), Vec3::ZERO, Vec3::UP);
        let a = view.mul(&Mat4::IDENTITY).transform4(v, 1.0);
        let b = view.transform4(v, 1.0);
        prop_assert!(approx_abs_rel(a.x, b.x, 1e-4, 1e-5));
        prop_assert!(approx_abs_rel(a.y, b.y, 1e-4, 1e-5));
        prop_assert!(approx_abs_rel(a.z, b.z, 1e-4, 1e-5));
    }

    // Bounds2 expansion always contains the original rectangle.
    #[test]
    fn bounds_expand_contains(
        x0 in bounded_f32(), y0 in bounded_f32(),
        w in 0.0f32..100.0, h in 0.0f32..100.0,
        margin in 0.0f32..50.0,
    ) {
        let b = Bounds2::new(Vec2::new(x0, y0), Vec2::new(x0 + w, y0 + h));
        let e = b.expanded(margin);
        prop_assert!(e.contains(b.min.x, b.min.y));
        prop_assert!(e.contains(b.max.x, b.max.y));
        prop_assert!(e.intersects(&b));
    }
}
