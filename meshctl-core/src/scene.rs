/// Per-frame render submissions and the view-refresh capability
use std::ops::ControlFlow;

use nalgebra::{Point3, Vector3};

use crate::geometry::{bounds_of, Mesh};

/// A colored line segment. Color components are in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: Point3<f64>,
    pub to: Point3<f64>,
    pub color: Vector3<f64>,
}

/// Everything the viewer draws in one frame. Cleared and re-submitted by the
/// [`Renderable`] every frame.
#[derive(Debug, Clone, Default)]
pub struct SceneData {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
    edges: Vec<Edge>,
}

impl SceneData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every submission, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.edges.clear();
    }

    pub fn add_edges<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = Edge>,
    {
        self.edges.extend(edges);
    }

    /// Copy the mesh buffers for drawing, replacing any earlier mesh.
    pub fn set_mesh(&mut self, mesh: &Mesh) {
        self.vertices.clear();
        self.vertices.extend_from_slice(mesh.vertices());
        self.faces.clear();
        self.faces.extend_from_slice(mesh.faces());
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn has_mesh(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Bounds of the submitted mesh; edges are decorations and do not count.
    pub fn mesh_bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        bounds_of(&self.vertices)
    }
}

/// Something the viewer asks to refresh its submissions once per frame,
/// before drawing.
pub trait Renderable {
    /// Rebuild `data` for the coming frame. `Continue` lets the viewer run
    /// its default drawing afterwards; `Break` suppresses it.
    fn pre_draw(&mut self, data: &mut SceneData) -> ControlFlow<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge() -> Edge {
        Edge {
            from: Point3::origin(),
            to: Point3::new(1.0, 0.0, 0.0),
            color: Vector3::x(),
        }
    }

    #[test]
    fn test_set_mesh_replaces_previous() {
        let mut data = SceneData::new();
        data.set_mesh(&Mesh::cube(1.0));
        data.set_mesh(&Mesh::tetrahedron());
        assert_eq!(data.vertices().len(), 4);
        assert_eq!(data.faces().len(), 4);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut data = SceneData::new();
        data.add_edges([edge(), edge()]);
        data.set_mesh(&Mesh::tetrahedron());
        assert_eq!(data.edges().len(), 2);
        assert!(data.has_mesh());

        data.clear();
        assert!(data.edges().is_empty());
        assert!(!data.has_mesh());
        assert!(data.mesh_bounds().is_none());
    }

    #[test]
    fn test_edges_do_not_affect_bounds() {
        let mut data = SceneData::new();
        data.add_edges([Edge {
            to: Point3::new(100.0, 0.0, 0.0),
            ..edge()
        }]);
        data.set_mesh(&Mesh::cube(2.0));
        let (_, max) = data.mesh_bounds().unwrap();
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
    }
}
