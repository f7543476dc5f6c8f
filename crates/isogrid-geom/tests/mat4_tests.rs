use isogrid_geom::{Mat4, Vec3};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn identity_transform_is_noop() {
    let v = Vec3::new(1.5, -2.0, 4.0);
    let out = Mat4::IDENTITY.transform4(v, 1.0);
    assert!(approx(out.x, v.x, 1e-6));
    assert!(approx(out.y, v.y, 1e-6));
    assert!(approx(out.z, v.z, 1e-6));
    assert!(approx(out.w, 1.0, 1e-6));
}

#[test]
fn look_at_moves_eye_to_origin() {
    let eye = Vec3::new(10.0, 8.0, -3.0);
    let view = Mat4::look_at(eye, Vec3::ZERO, Vec3::UP);
    let out = view.transform4(eye, 1.0);
    assert!(approx(out.x, 0.0, 1e-4));
    assert!(approx(out.y, 0.0, 1e-4));
    assert!(approx(out.z, 0.0, 1e-4));
}

#[test]
fn look_at_target_lands_on_negative_z() {
    let eye = Vec3::new(0.0, 5.0, 5.0);
    let target = Vec3::new(0.0, 0.0, 0.0);
    let view = Mat4::look_at(eye, target, Vec3::UP);
    let out = view.transform4(target, 1.0);
    // View space looks down -z; the target sits straight ahead.
    assert!(approx(out.x, 0.0, 1e-4));
    assert!(out.z < 0.0);
}

#[test]
fn perspective_maps_near_and_far_to_ndc_extremes() {
    let proj = Mat4::perspective(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    let near = proj.transform4(Vec3::new(0.0, 0.0, -0.1), 1.0);
    let far = proj.transform4(Vec3::new(0.0, 0.0, -100.0), 1.0);
    assert!(approx(near.z / near.w, -1.0, 1e-4));
    assert!(approx(far.z / far.w, 1.0, 1e-3));
}

#[test]
fn inverse_roundtrips_view_projection() {
    let view = Mat4::look_at(Vec3::new(7.0, 12.0, 7.0), Vec3::new(2.0, 0.0, 3.0), Vec3::UP);
    let proj = Mat4::perspective(30f32.to_radians(), 1.5, 0.1, 1000.0);
    let vp = proj.mul(&view);
    let inv = vp.inverse().expect("view-projection must be invertible");
    let p = Vec3::new(3.0, 0.0, -8.0);
    let clip = vp.transform4(p, 1.0);
    let back = inv.transform4(Vec3::new(clip.x, clip.y, clip.z), clip.w);
    assert!(approx(back.x / back.w, p.x, 1e-2));
    assert!(approx(back.y / back.w, p.y, 1e-2));
    assert!(approx(back.z / back.w, p.z, 1e-2));
}

#[test]
fn singular_matrix_has_no_inverse() {
    let zero = Mat4 { m: [0.0; 16] };
    assert!(zero.inverse().is_none());
}
