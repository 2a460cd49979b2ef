//! Clean-up passes run on freshly loaded geometry before it is handed to the shatter engine.
//!
//! Loaders typically hand over triangle soup where every face owns its own three vertices. Such
//! a mesh has no shared edges at all, so it has to be welded with [`TriMeshGeom::merge_vertices`]
//! before any adjacency can be found.

use std::collections::HashMap;

use super::{tri::TriMeshGeom, FMat, VMat};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use na::{Point3, Vector3};

impl TriMeshGeom {
    /// Welds vertices whose coordinates agree to `precision_digits` decimal places.
    ///
    /// Faces that collapse (two corners welded together) are dropped. The drawable set is reset
    /// to every surviving face. Returns the number of vertices removed.
    pub fn merge_vertices(&mut self, precision_digits: u32) -> usize {
        let scale = 10f64.powi(precision_digits as i32);
        let key = |p: Point3<f32>| {
            [p.x, p.y, p.z].map(|x| (x as f64 * scale).round() as i64)
        };

        let mut welded = HashMap::new();
        let mut remap = Vec::with_capacity(self.vertex_count());
        let mut kept = Vec::new();
        for v in 0..self.vertex_count() as u32 {
            let p = self.position(v);
            let next = kept.len() as u32;
            let id = *welded.entry(key(p)).or_insert_with(|| {
                kept.push(v);
                next
            });
            remap.push(id);
        }

        let faces = self
            .faces()
            .column_iter()
            .map(|col| [remap[col[0] as usize], remap[col[1] as usize], remap[col[2] as usize]])
            .filter(|&[a, b, c]| a != b && b != c && c != a)
            .collect::<Vec<_>>();
        let dropped_faces = self.face_count() - faces.len();

        let vv = VMat::from_fn(kept.len(), |r, c| self.verts()[(r, kept[c] as usize)]);
        let ff = FMat::from_fn(faces.len(), |r, c| faces[c][r]);
        let uvs = if self.uvs().is_empty() {
            vec![]
        } else {
            kept.iter().map(|&v| self.uvs()[v as usize]).collect()
        };

        let removed = self.vertex_count() - kept.len();
        debug!(
            "Merged {} vertices ({} remain), dropped {} collapsed faces.",
            removed,
            kept.len(),
            dropped_faces
        );
        self.replace_geometry(vv, ff, uvs);
        removed
    }

    /// Recentres the mesh on its bounding box centre and scales it into the unit sphere.
    pub fn normalize(&mut self) {
        if self.vertex_count() == 0 {
            return;
        }
        let (min, max) = self.verts().column_iter().fold(
            (Vector3::repeat(f32::MAX), Vector3::repeat(f32::MIN)),
            |(min, max), c| (min.inf(&c.into_owned()), max.sup(&c.into_owned())),
        );
        let center = (min + max) * 0.5;
        let radius = self
            .verts()
            .column_iter()
            .map(|c| (c - center).norm())
            .fold(0f32, f32::max);
        let s = if radius == 0. { 1. } else { 1. / radius };

        for mut c in self.verts_mut().column_iter_mut() {
            let moved = (c.clone_owned() - center) * s;
            c.copy_from(&moved);
        }
        self.mark_stale();
    }

    /// Area-weighted vertex normals over every face in the mesh.
    pub fn vertex_normals(&self) -> Vec<Vector3<f32>> {
        let mut normals = vec![Vector3::zeros(); self.vertex_count()];
        for col in self.faces().column_iter() {
            let [a, b, c] = [col[0], col[1], col[2]];
            let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
            // Unnormalised, so larger faces pull harder.
            let n = (pc - pb).cross(&(pa - pb));
            for v in [a, b, c] {
                normals[v as usize] += n;
            }
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros))
            .collect()
    }

    /// Splits every drawable face into four.
    ///
    /// The result is unwelded triangle soup; call [`TriMeshGeom::merge_vertices`] on it to stitch
    /// neighbouring faces back together.
    pub fn subdivided(&self) -> TriMeshGeom {
        let mut positions = Vec::with_capacity(self.live_count() * 12);
        for &f in self.live_faces() {
            let [a, b, c] = self.triangle_positions(f);
            let ab = na::center(&a, &b);
            let bc = na::center(&b, &c);
            let ca = na::center(&c, &a);
            for tri in [[a, ab, ca], [ab, b, bc], [ca, bc, c], [ab, bc, ca]] {
                positions.extend(tri.map(|p| p.coords));
            }
        }
        let vv = VMat::from_fn(positions.len(), |r, c| positions[c][r]);
        let ff = FMat::from_fn(positions.len() / 3, |r, c| (c * 3 + r) as u32);
        let mut out = TriMeshGeom::from_parts(vv, ff, vec![]);
        out.transform = self.transform.clone();
        out
    }
}
