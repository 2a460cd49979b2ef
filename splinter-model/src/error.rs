use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("face {face} references vertex {index}, but the mesh only has {vertex_count} vertices")]
    IndexOutOfBounds {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("expected {expected} {what}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
