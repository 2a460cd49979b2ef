pub mod error;
pub mod geom;

use geom::{tri::TriMeshGeom, FMat, VMat};

use na::{Matrix4, UnitQuaternion, Vector3, Vector4};

pub use error::MeshError;

#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    pub pos: Vector3<f32>,
    pub ori: UnitQuaternion<f32>,
    pub scaling: Vector4<f32>,
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            pos: Vector3::zeros(),
            ori: UnitQuaternion::identity(),
            scaling: Vector4::new(1., 1., 1., 1.),
        }
    }

    pub fn mat(&self) -> Matrix4<f32> {
        let mut t_mat = Matrix4::from_diagonal(&self.scaling) * self.ori.to_homogeneous();
        t_mat.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.pos);
        t_mat
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Generates the mesh of a unit cube, centered on the origin.
pub fn unit_cube() -> TriMeshGeom {
    let vv = VMat::from_iterator(
        8,
        [
            -0.5, -0.5, -0.5, // left bottom rear
            -0.5, -0.5,  0.5, // left bottom front
            -0.5,  0.5, -0.5, // left top rear
            -0.5,  0.5,  0.5, // left top front
             0.5, -0.5, -0.5, // right bottom rear
             0.5, -0.5,  0.5, // right bottom front
             0.5,  0.5, -0.5, // right top rear
             0.5,  0.5,  0.5, // right top front
        ]
        .into_iter(),
    );
    let ff = FMat::from_iterator(
        12,
        [
            1, 0, 4, 5, 1, 4, // bottom
            6, 2, 3, 6, 3, 7, // top
            0, 1, 2, 3, 2, 1, // left
            4, 6, 7, 4, 7, 5, // right
            0, 2, 6, 0, 6, 4, // back
            5, 7, 3, 3, 1, 5, // front
        ]
        .into_iter(),
    );
    TriMeshGeom::from_parts(vv, ff, vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_point_outwards() {
        let cube = unit_cube();
        assert_eq!(cube.live_count(), 12);
        for &f in cube.live_faces() {
            let [a, b, c] = cube.triangle_positions(f);
            let centroid = (a.coords + b.coords + c.coords) / 3.;
            assert!(cube.face_normal(f).dot(&centroid) > 0., "face {:?} points inwards", f);
        }
    }

    #[test]
    fn transform_matrix_places_translation() {
        let mut t = AffineTransform::identity();
        t.pos = Vector3::new(1., 2., 3.);
        let m = t.mat();
        assert_eq!(m.fixed_view::<3, 1>(0, 3).into_owned(), t.pos);
    }
}
