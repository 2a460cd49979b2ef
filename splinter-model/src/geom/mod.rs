pub mod prep;
pub mod tri;

use na::Matrix3xX;

/// Packed vertex as uploaded to the renderer.
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub norm: [f32; 3],
    pub uv: [f32; 2],
}

/// Packed index triple plus face normal, one per drawable face.
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Face {
    pub indices: [u32; 3],
    pub norm: [f32; 3],
}

pub type VMat = Matrix3xX<f32>;
pub type FMat = Matrix3xX<u32>;

/// Stable identifier of a face: its column in the mesh's face matrix.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct FaceId(pub u32);
impl From<usize> for FaceId {
    fn from(a: usize) -> Self {
        Self(a as u32)
    }
}
impl From<FaceId> for usize {
    fn from(a: FaceId) -> Self {
        a.0 as usize
    }
}
