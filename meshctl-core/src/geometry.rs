/// Indexed triangle mesh
use nalgebra::{Point3, Vector3};

use crate::error::MeshError;

/// A triangle mesh made of a vertex buffer and a face buffer of index triples.
///
/// Every face index is within vertex-buffer bounds. The buffers cannot be
/// replaced once constructed; vertex positions are only changed in place by
/// the transform operations, and the face buffer is never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Build a mesh, checking that every face references an existing vertex.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        let vertex_count = vertices.len();
        for (face, indices) in faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::FaceIndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(Self { vertices, faces })
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// In-place access for the transform operations. Lengths cannot change
    /// through a slice, so the index invariant holds.
    pub(crate) fn vertices_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.vertices
    }

    /// Corner positions of face `face`.
    pub fn triangle(&self, face: usize) -> Option<[Point3<f64>; 3]> {
        let [a, b, c] = *self.faces.get(face)?;
        Some([self.vertices[a], self.vertices[b], self.vertices[c]])
    }

    /// Unit normal of face `face`, or `None` for degenerate triangles.
    pub fn face_normal(&self, face: usize) -> Option<Vector3<f64>> {
        let [v0, v1, v2] = self.triangle(face)?;
        triangle_normal(&v0, &v1, &v2)
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        bounds_of(&self.vertices)
    }

    /// Regular tetrahedron with unit edges touching the origin.
    pub fn tetrahedron() -> Self {
        let h = 3.0_f64.sqrt() / 2.0;
        let apex = (2.0_f64 / 3.0).sqrt();
        Self {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 0.0, h),
                Point3::new(0.5, apex, h / 3.0),
            ],
            faces: vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]],
        }
    }

    /// Axis-aligned cube centred on the origin.
    pub fn cube(size: f64) -> Self {
        let half = size / 2.0;
        let vertices = (0..8)
            .map(|i| {
                let pick = |bit: usize| if i & bit == 0 { -half } else { half };
                Point3::new(pick(1), pick(2), pick(4))
            })
            .collect();

        // Two counter-clockwise triangles per side, seen from outside
        let faces = vec![
            // -z / +z
            [0, 2, 3], [0, 3, 1],
            [4, 5, 7], [4, 7, 6],
            // -y / +y
            [0, 1, 5], [0, 5, 4],
            [2, 6, 7], [2, 7, 3],
            // -x / +x
            [0, 4, 6], [0, 6, 2],
            [1, 3, 7], [1, 7, 5],
        ];

        Self { vertices, faces }
    }
}

/// Unit normal of a triangle, `None` when the triangle has no area.
pub fn triangle_normal(
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Option<Vector3<f64>> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    edge1.cross(&edge2).try_normalize(f64::EPSILON)
}

pub(crate) fn bounds_of(points: &[Point3<f64>]) -> Option<(Point3<f64>, Point3<f64>)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(min, max), p| {
        (min.inf(p), max.sup(p))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_out_of_range_face() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let err = Mesh::new(vertices, vec![[0, 1, 2]]).unwrap_err();
        assert_eq!(
            err,
            MeshError::FaceIndexOutOfRange {
                face: 0,
                index: 2,
                vertex_count: 2
            }
        );
    }

    #[test]
    fn test_tetrahedron_is_regular() {
        let mesh = Mesh::tetrahedron();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);

        let v = mesh.vertices();
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_relative_eq!((v[i] - v[j]).norm(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_cube_normals_point_outwards() {
        let mesh = Mesh::cube(2.0);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);

        for face in 0..mesh.face_count() {
            let [a, b, c] = mesh.triangle(face).unwrap();
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            let normal = mesh.face_normal(face).unwrap();
            assert!(normal.dot(&centroid.coords) > 0.0, "face {face} faces inwards");
        }
    }

    #[test]
    fn test_bounds() {
        let (min, max) = Mesh::cube(2.0).bounds().unwrap();
        assert_relative_eq!(min, Point3::new(-1.0, -1.0, -1.0));
        assert_relative_eq!(max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(triangle_normal(&p, &p, &p).is_none());
    }
}
