use super::{FMat, Face, FaceId, VMat, Vertex};
use crate::{error::MeshError, AffineTransform};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use na::{Point3, Vector3};

/// An indexed triangle mesh whose drawable face set can shrink over time.
///
/// The face matrix is an arena: a face keeps its [`FaceId`] (its column) for the lifetime of the
/// mesh, and removal only drops ids from the drawable set. Whenever the drawable set changes the
/// mesh is flagged stale so whoever owns the GPU copy knows to re-upload it.
#[derive(Clone, Debug)]
pub struct TriMeshGeom {
    vv: VMat,
    ff: FMat,
    uvs: Vec<[f32; 2]>,
    live: Vec<FaceId>,
    stale: bool,
    pub transform: AffineTransform,
}
impl TriMeshGeom {
    /// Builds a mesh, checking that every index triple points at an existing vertex.
    ///
    /// `uvs` may be empty, in which case every vertex gets `[0, 0]`.
    pub fn try_new(vv: VMat, ff: FMat, uvs: Vec<[f32; 2]>) -> Result<TriMeshGeom, MeshError> {
        let vertex_count = vv.ncols();
        if !uvs.is_empty() && uvs.len() != vertex_count {
            return Err(MeshError::LengthMismatch {
                what: "uv coordinates",
                expected: vertex_count,
                actual: uvs.len(),
            });
        }
        for (face, col) in ff.column_iter().enumerate() {
            if let Some(&index) = col.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfBounds {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(TriMeshGeom::from_parts(vv, ff, uvs))
    }

    /// Skips validation; callers guarantee every index is in range.
    pub(crate) fn from_parts(vv: VMat, ff: FMat, uvs: Vec<[f32; 2]>) -> TriMeshGeom {
        let live = (0..ff.ncols()).map(FaceId::from).collect();
        TriMeshGeom {
            vv,
            ff,
            uvs,
            live,
            stale: true,
            transform: AffineTransform::identity(),
        }
    }

    pub fn from_triangles(
        positions: &[[f32; 3]],
        triangles: &[[u32; 3]],
    ) -> Result<TriMeshGeom, MeshError> {
        TriMeshGeom::try_new(
            VMat::from_fn(positions.len(), |r, c| positions[c][r]),
            FMat::from_fn(triangles.len(), |r, c| triangles[c][r]),
            vec![],
        )
    }

    pub fn verts(&self) -> &VMat {
        &self.vv
    }
    /// Every face the mesh was built with, drawable or not.
    pub fn faces(&self) -> &FMat {
        &self.ff
    }
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }
    pub fn vertex_count(&self) -> usize {
        self.vv.ncols()
    }
    pub fn face_count(&self) -> usize {
        self.ff.ncols()
    }

    pub fn position(&self, v: u32) -> Point3<f32> {
        Point3::from(self.vv.column(v as usize).into_owned())
    }
    pub fn triangle(&self, f: FaceId) -> [u32; 3] {
        let col = self.ff.column(f.into());
        [col[0], col[1], col[2]]
    }
    pub fn triangle_positions(&self, f: FaceId) -> [Point3<f32>; 3] {
        self.triangle(f).map(|v| self.position(v))
    }
    /// Unit normal following the counter-clockwise winding, or zero for a degenerate face.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f32> {
        let [a, b, c] = self.triangle_positions(f);
        (b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Faces still on the surface, in their original order.
    pub fn live_faces(&self) -> &[FaceId] {
        &self.live
    }
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drops every drawable face matching `pred`, returning how many went away.
    pub fn remove_faces<P: FnMut(FaceId) -> bool>(&mut self, mut pred: P) -> usize {
        let before = self.live.len();
        self.live.retain(|&f| !pred(f));
        let removed = before - self.live.len();
        if removed > 0 {
            trace!("Removed {} faces, {} remain.", removed, self.live.len());
            self.stale = true;
        }
        removed
    }
    /// Puts every face back into the drawable set.
    pub fn restore_faces(&mut self) {
        self.live = (0..self.ff.ncols()).map(FaceId::from).collect();
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }
    /// Clears the stale flag, returning whether it was set. Call after re-uploading buffers.
    pub fn take_stale(&mut self) -> bool {
        std::mem::replace(&mut self.stale, false)
    }

    pub fn unpacked_verts(&self) -> Vec<Vertex> {
        let normals = self.vertex_normals();
        (0..self.vv.ncols())
            .map(|c| Vertex {
                pos: self.vv.column(c).into_owned().into(),
                norm: normals[c].into(),
                uv: self.uvs.get(c).copied().unwrap_or([0., 0.]),
            })
            .collect()
    }
    /// Packs the drawable faces only.
    pub fn unpacked_faces(&self) -> Vec<Face> {
        self.live
            .iter()
            .map(|&f| Face {
                indices: self.triangle(f),
                norm: self.face_normal(f).into(),
            })
            .collect()
    }

    pub(crate) fn verts_mut(&mut self) -> &mut VMat {
        &mut self.vv
    }
    pub(crate) fn replace_geometry(&mut self, vv: VMat, ff: FMat, uvs: Vec<[f32; 2]>) {
        self.vv = vv;
        self.ff = ff;
        self.uvs = uvs;
        self.restore_faces();
    }
}
