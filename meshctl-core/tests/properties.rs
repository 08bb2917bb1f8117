use std::f64::consts::TAU;

use approx::relative_eq;
use meshctl_core::{rotate_mesh, scale_mesh, Mesh};
use nalgebra::Vector3;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

/// Small integers keep the generated factors and angles finite and readable.
fn factor(raw: i16) -> f64 {
    f64::from(raw) / 1000.0
}

fn angle(raw: i16) -> f64 {
    f64::from(raw) / 1000.0
}

fn axis(x: i8, y: i8, z: i8) -> Option<Vector3<f64>> {
    let axis = Vector3::new(f64::from(x), f64::from(y), f64::from(z));
    (axis.norm() > 0.0).then_some(axis)
}

fn distances(mesh: &Mesh) -> Vec<f64> {
    let v = mesh.vertices();
    let mut out = Vec::new();
    for i in 0..v.len() {
        for j in (i + 1)..v.len() {
            out.push((v[i] - v[j]).norm());
        }
    }
    out
}

#[quickcheck]
fn scaling_compounds_multiplicatively(s1: i16, s2: i16) -> bool {
    let (s1, s2) = (factor(s1), factor(s2));

    let mut twice = Mesh::cube(2.0);
    scale_mesh(&mut twice, s1).unwrap();
    scale_mesh(&mut twice, s2).unwrap();

    let mut once = Mesh::cube(2.0);
    scale_mesh(&mut once, s1 * s2).unwrap();

    twice
        .vertices()
        .iter()
        .zip(once.vertices())
        .all(|(a, b)| relative_eq!(a.coords, b.coords, epsilon = 1e-9, max_relative = 1e-12))
}

#[quickcheck]
fn rotation_preserves_distances(theta: i16, x: i8, y: i8, z: i8) -> TestResult {
    let Some(axis) = axis(x, y, z) else {
        return TestResult::discard();
    };

    let original = Mesh::tetrahedron();
    let mut mesh = original.clone();
    rotate_mesh(&mut mesh, angle(theta), &axis).unwrap();

    let same = distances(&original)
        .iter()
        .zip(distances(&mesh))
        .all(|(a, b)| relative_eq!(*a, b, epsilon = 1e-9));
    TestResult::from_bool(same)
}

#[quickcheck]
fn full_turn_is_identity(x: i8, y: i8, z: i8, turns: bool) -> TestResult {
    let Some(axis) = axis(x, y, z) else {
        return TestResult::discard();
    };

    let original = Mesh::cube(2.0);
    let mut mesh = original.clone();
    rotate_mesh(&mut mesh, if turns { TAU } else { 0.0 }, &axis).unwrap();

    let same = mesh
        .vertices()
        .iter()
        .zip(original.vertices())
        .all(|(a, b)| relative_eq!(a, b, epsilon = 1e-9));
    TestResult::from_bool(same)
}

#[quickcheck]
fn transforms_never_touch_faces(s: i16, theta: i16, x: i8, y: i8, z: i8) -> TestResult {
    let Some(axis) = axis(x, y, z) else {
        return TestResult::discard();
    };

    let original = Mesh::cube(1.0);
    let mut mesh = original.clone();
    scale_mesh(&mut mesh, factor(s)).unwrap();
    rotate_mesh(&mut mesh, angle(theta), &axis).unwrap();

    TestResult::from_bool(mesh.faces() == original.faces())
}
