/// Error types for mesh loading and transformation
use std::path::PathBuf;

use thiserror::Error;

/// A mesh whose buffers violate the face-index invariant.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },
}

/// Errors raised while reading a mesh file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: vertex index {index} is out of range (have {vertex_count} vertices)")]
    IndexOutOfRange {
        line: usize,
        index: i64,
        vertex_count: usize,
    },

    #[error("mesh contains no vertices")]
    Empty,

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Rejected transform parameters. The mesh is left untouched.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("rotation axis must be non-zero")]
    ZeroAxis,

    #[error("{parameter} must be finite, got {value}")]
    NonFinite { parameter: &'static str, value: f64 },
}
