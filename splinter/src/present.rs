//! Stand-in for the renderer: takes what a real one would upload each frame and accounts for it.

use shatter::{FragmentVertex, Shatter};
use thiserror::Error;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use model::geom::{Face, Vertex};
use rand::Rng;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("{needed} fragment vertices exceed the budget of {budget}")]
    OverBudget { needed: usize, budget: usize },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameReport {
    /// Bytes re-uploaded for the source mesh; zero when it was not stale.
    pub mesh_bytes: usize,
    pub fragment_bytes: usize,
}

#[derive(Debug, Default)]
pub struct Presenter {
    pub budget: Option<usize>,
    pub frames: u64,
    pub uploaded: usize,
}
impl Presenter {
    pub fn present<R: Rng>(&mut self, engine: &mut Shatter<R>) -> Result<FrameReport, FrameError> {
        let mut report = FrameReport::default();
        if let Some(mesh) = engine.mesh_mut() {
            if mesh.take_stale() {
                let verts = mesh.unpacked_verts();
                let faces = mesh.unpacked_faces();
                report.mesh_bytes = bytemuck::cast_slice::<Vertex, u8>(&verts).len()
                    + bytemuck::cast_slice::<Face, u8>(&faces).len();
                trace!("Re-uploading mesh, {} faces drawable.", faces.len());
            }
        }

        let frags = engine.fragment_vertices();
        if let Some(budget) = self.budget {
            if frags.len() > budget {
                return Err(FrameError::OverBudget {
                    needed: frags.len(),
                    budget,
                });
            }
        }
        report.fragment_bytes = bytemuck::cast_slice::<FragmentVertex, u8>(&frags).len();

        self.frames += 1;
        self.uploaded += report.mesh_bytes + report.fragment_bytes;
        Ok(report)
    }
}
