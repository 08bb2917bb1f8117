/// Destructive scale and rotation of mesh geometry
use nalgebra::{Rotation3, Unit, Vector3};

use crate::error::TransformError;
use crate::geometry::Mesh;

/// Parameters for the next transform to apply. Edited directly by the
/// control panel; they describe the pending operation, not a history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    pub scale: f64,
    /// Radians.
    pub rotation_angle: f64,
    /// Normalized only when a rotation is applied.
    pub rotation_axis: Vector3<f64>,
}

impl TransformParams {
    pub fn new(scale: f64, rotation_angle: f64, rotation_axis: Vector3<f64>) -> Self {
        Self {
            scale,
            rotation_angle,
            rotation_axis,
        }
    }

    pub fn apply_scale(&self, mesh: &mut Mesh) -> Result<(), TransformError> {
        scale_mesh(mesh, self.scale)
    }

    pub fn apply_rotation(&self, mesh: &mut Mesh) -> Result<(), TransformError> {
        rotate_mesh(mesh, self.rotation_angle, &self.rotation_axis)
    }
}

impl Default for TransformParams {
    fn default() -> Self {
        Self::new(1.0, 0.0, Vector3::y())
    }
}

/// Multiply every vertex coordinate by `factor`.
///
/// Zero and negative factors are accepted; they collapse or mirror the
/// geometry. Only non-finite factors are rejected.
pub fn scale_mesh(mesh: &mut Mesh, factor: f64) -> Result<(), TransformError> {
    ensure_finite("scale factor", factor)?;
    if factor == 0.0 {
        tracing::warn!("scaling by zero collapses the mesh to the origin");
    }

    for vertex in mesh.vertices_mut() {
        vertex.coords *= factor;
    }

    tracing::info!("mesh scaled by {factor}x");
    Ok(())
}

/// Rotate every vertex by `angle` radians around `axis` through the origin.
pub fn rotate_mesh(mesh: &mut Mesh, angle: f64, axis: &Vector3<f64>) -> Result<(), TransformError> {
    let rotation = rotation_matrix(angle, axis)?;

    for vertex in mesh.vertices_mut() {
        *vertex = rotation * *vertex;
    }

    tracing::info!(
        "mesh rotated by {angle} radians around axis ({}, {}, {})",
        axis.x,
        axis.y,
        axis.z
    );
    Ok(())
}

/// Rotation of `angle` radians around `axis`, normalized to unit length.
pub fn rotation_matrix(angle: f64, axis: &Vector3<f64>) -> Result<Rotation3<f64>, TransformError> {
    ensure_finite("rotation angle", angle)?;
    for value in axis.iter() {
        ensure_finite("rotation axis component", *value)?;
    }

    let axis = Unit::try_new(*axis, f64::EPSILON).ok_or(TransformError::ZeroAxis)?;
    Ok(Rotation3::from_axis_angle(&axis, angle))
}

fn ensure_finite(parameter: &'static str, value: f64) -> Result<(), TransformError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TransformError::NonFinite { parameter, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_default_params() {
        let params = TransformParams::default();
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.rotation_angle, 0.0);
        assert_eq!(params.rotation_axis, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_scale_tetrahedron_by_two() {
        let original = Mesh::tetrahedron();
        let mut mesh = original.clone();
        scale_mesh(&mut mesh, 2.0).unwrap();

        for (scaled, before) in mesh.vertices().iter().zip(original.vertices()) {
            assert_relative_eq!(scaled.coords, before.coords * 2.0);
        }
        assert_eq!(mesh.faces(), original.faces());
    }

    #[test]
    fn test_negative_scale_mirrors() {
        let mut mesh = Mesh::cube(2.0);
        let before = mesh.clone();
        scale_mesh(&mut mesh, -1.0).unwrap();
        for (after, before) in mesh.vertices().iter().zip(before.vertices()) {
            assert_relative_eq!(after.coords, -before.coords);
        }
    }

    #[test]
    fn test_zero_scale_collapses() {
        let mut mesh = Mesh::cube(2.0);
        scale_mesh(&mut mesh, 0.0).unwrap();
        assert!(mesh.vertices().iter().all(|v| v.coords.norm() == 0.0));
    }

    #[test]
    fn test_non_finite_scale_rejected() {
        let mut mesh = Mesh::cube(2.0);
        let before = mesh.clone();
        let err = scale_mesh(&mut mesh, f64::NAN).unwrap_err();
        assert!(matches!(err, TransformError::NonFinite { parameter: "scale factor", .. }));
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_half_turn_about_up_axis() {
        let original = Mesh::tetrahedron();
        let mut mesh = original.clone();
        rotate_mesh(&mut mesh, PI, &Vector3::new(0.0, 1.0, 0.0)).unwrap();

        for (after, before) in mesh.vertices().iter().zip(original.vertices()) {
            assert_relative_eq!(after.x, -before.x, epsilon = 1e-12);
            assert_relative_eq!(after.y, before.y, epsilon = 1e-12);
            assert_relative_eq!(after.z, -before.z, epsilon = 1e-12);
        }
        assert_eq!(mesh.faces(), original.faces());
    }

    #[test]
    fn test_axis_is_normalized() {
        let mut a = Mesh::cube(1.0);
        let mut b = a.clone();
        rotate_mesh(&mut a, 0.7, &Vector3::new(0.0, 0.0, 1.0)).unwrap();
        rotate_mesh(&mut b, 0.7, &Vector3::new(0.0, 0.0, 25.0)).unwrap();
        for (p, q) in a.vertices().iter().zip(b.vertices()) {
            assert_relative_eq!(p, q, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_matches_row_vector_convention() {
        // A point on +x turned a quarter around +z lands on +y.
        let rotation = rotation_matrix(FRAC_PI_2, &Vector3::z()).unwrap();
        let row = Point3::new(1.0, 0.0, 0.0).coords.transpose() * rotation.matrix().transpose();
        assert_relative_eq!(row.transpose(), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_axis_rejected() {
        let mut mesh = Mesh::cube(1.0);
        let before = mesh.clone();
        assert_eq!(
            rotate_mesh(&mut mesh, 1.0, &Vector3::zeros()),
            Err(TransformError::ZeroAxis)
        );
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_non_finite_axis_rejected() {
        let axis = Vector3::new(0.0, f64::INFINITY, 0.0);
        assert!(matches!(
            rotation_matrix(1.0, &axis),
            Err(TransformError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_params_apply_compounds() {
        let mut mesh = Mesh::tetrahedron();
        let params = TransformParams::new(3.0, 0.0, Vector3::y());
        params.apply_scale(&mut mesh).unwrap();
        params.apply_scale(&mut mesh).unwrap();
        params.apply_rotation(&mut mesh).unwrap();
        assert_relative_eq!(mesh.vertices()[1], Point3::new(9.0, 0.0, 0.0), epsilon = 1e-12);
    }
}
