/// meshctl core library - mesh geometry, OBJ loading and transforms
///
/// Everything here is free of terminal and UI concerns: the mesh store,
/// the destructive scale/rotate operations, camera projection, and the
/// per-frame render submissions a viewer consumes.
pub mod error;
pub mod geometry;
pub mod obj;
pub mod projection;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use error::{LoadError, MeshError, TransformError};
pub use geometry::Mesh;
pub use obj::{load_obj, parse_obj};
pub use projection::{Camera, ScreenPoint, ViewOrbit};
pub use scene::{Edge, Renderable, SceneData};
pub use transform::{rotate_mesh, rotation_matrix, scale_mesh, TransformParams};
