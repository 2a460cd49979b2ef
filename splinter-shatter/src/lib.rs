extern crate boomphf as phf;

pub mod adjacency;
pub mod edge;
pub mod error;
pub mod fragment;
pub mod frontier;
pub mod params;
pub mod spawn;

pub use adjacency::AdjacencyGraph;
pub use error::ParamError;
pub use fragment::{Fragment, FragmentVertex};
pub use frontier::TraversalState;
pub use params::ShatterParams;

use frontier::Frontier;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use model::geom::tri::TriMeshGeom;
use rand::{rngs::ThreadRng, Rng};

/// What the engine is working on between `initialize` and `reset`.
struct Target {
    mesh: TriMeshGeom,
    graph: AdjacencyGraph,
    frontier: Frontier,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ShatterStats {
    pub faces_remaining: usize,
    pub faces_consumed: usize,
    pub live_fragments: usize,
    pub advances: u64,
}

/// Progressively breaks a mesh into fragments that fly off and fade out.
///
/// Drive it by calling [`Shatter::tick`] once per frame. Within a tick the wavefront advances
/// first, so fragments broken off during the tick are also aged by it.
pub struct Shatter<R: Rng = ThreadRng> {
    params: ShatterParams,
    rng: R,
    target: Option<Target>,
    fragments: Vec<Fragment>,
}

impl Shatter<ThreadRng> {
    pub fn new(params: ShatterParams) -> Self {
        Self::with_rng(params, rand::rng())
    }
}

impl<R: Rng> Shatter<R> {
    pub fn with_rng(params: ShatterParams, rng: R) -> Self {
        Self {
            params,
            rng,
            target: None,
            fragments: vec![],
        }
    }

    /// Takes ownership of `mesh` and builds its adjacency. Anything loaded before is dropped.
    pub fn initialize(&mut self, mesh: TriMeshGeom) {
        self.reset();
        let graph = AdjacencyGraph::build(&mesh);
        let frontier = Frontier::new(&mesh);
        info!(
            "Loaded mesh with {} vertices and {} faces.",
            mesh.vertex_count(),
            mesh.live_count()
        );
        self.target = Some(Target {
            mesh,
            graph,
            frontier,
        });
    }

    /// Starts (or resumes) breaking the mesh apart. Returns whether anything is running now.
    pub fn start(&mut self) -> bool {
        match &mut self.target {
            Some(t) => t.frontier.start(&t.mesh),
            None => false,
        }
    }

    /// Stops the wavefront. Fragments already broken off keep flying and fading.
    pub fn halt(&mut self) {
        if let Some(t) = &mut self.target {
            t.frontier.halt();
        }
    }

    /// Drops every fragment and the mesh.
    pub fn reset(&mut self) {
        if self.target.is_some() || !self.fragments.is_empty() {
            info!("Resetting, dropping {} fragments.", self.fragments.len());
        }
        self.target = None;
        self.fragments.clear();
    }
    pub fn clean(&mut self) {
        self.reset()
    }

    pub fn tick(&mut self, delta: f64) {
        let delta = if delta.is_finite() && delta >= 0. {
            delta
        } else {
            warn!("Ignoring tick of {} seconds.", delta);
            0.
        };

        if let Some(t) = &mut self.target {
            let consumed = t.frontier.tick(delta, self.params.visit_interval(), &t.graph, &mut t.mesh);
            self.fragments.reserve(consumed.len());
            for f in consumed {
                self.fragments.push(spawn::spawn(
                    t.mesh.triangle_positions(f),
                    t.mesh.face_normal(f),
                    &t.mesh.transform,
                    &self.params,
                    &mut self.rng,
                ));
            }
        }
        fragment::age_all(&mut self.fragments, delta, &self.params);
    }

    pub fn state(&self) -> TraversalState {
        match &self.target {
            Some(t) => t.frontier.state(&t.mesh),
            None => TraversalState::Idle,
        }
    }
    pub fn is_running(&self) -> bool {
        self.state() == TraversalState::Running
    }
    /// Whether there is nothing left to animate: no wavefront and no fragments.
    pub fn is_settled(&self) -> bool {
        self.state() != TraversalState::Running && self.fragments.is_empty()
    }

    pub fn params(&self) -> &ShatterParams {
        &self.params
    }
    pub fn params_mut(&mut self) -> &mut ShatterParams {
        &mut self.params
    }

    pub fn mesh(&self) -> Option<&TriMeshGeom> {
        self.target.as_ref().map(|t| &t.mesh)
    }
    /// Mutable access for the renderer to clear the stale flag or move the mesh. The face set
    /// should be left alone.
    pub fn mesh_mut(&mut self) -> Option<&mut TriMeshGeom> {
        self.target.as_mut().map(|t| &mut t.mesh)
    }
    pub fn graph(&self) -> Option<&AdjacencyGraph> {
        self.target.as_ref().map(|t| &t.graph)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
    /// World-space triangles of every live fragment, three vertices each.
    pub fn fragment_vertices(&self) -> Vec<FragmentVertex> {
        self.fragments.iter().flat_map(|f| f.vertices()).collect()
    }

    pub fn stats(&self) -> ShatterStats {
        let mut stats = ShatterStats {
            live_fragments: self.fragments.len(),
            ..Default::default()
        };
        if let Some(t) = &self.target {
            stats.faces_remaining = t.mesh.live_count();
            stats.faces_consumed = t.frontier.consumed();
            stats.advances = t.frontier.advances();
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn engine() -> Shatter<StdRng> {
        Shatter::with_rng(ShatterParams::default(), StdRng::seed_from_u64(0))
    }

    #[test]
    fn nothing_loaded() {
        let mut e = engine();
        assert!(!e.start());
        e.tick(1.);
        assert_eq!(e.state(), TraversalState::Idle);
        assert!(e.mesh().is_none());
        assert_eq!(e.stats(), ShatterStats::default());
    }

    #[test]
    fn cube_shatters_completely() {
        let mut e = engine();
        e.initialize(model::unit_cube());
        assert_eq!(e.graph().map(|g| g.face_count()), Some(12));
        assert!(e.start());
        assert!(e.is_running());

        let mut ticks = 0;
        while e.state() == TraversalState::Running {
            e.tick(0.01);
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert_eq!(e.state(), TraversalState::Exhausted);
        let stats = e.stats();
        assert_eq!(stats.faces_consumed, 12);
        assert_eq!(stats.faces_remaining, 0);
        assert_eq!(stats.live_fragments, 12);
        assert_eq!(e.fragment_vertices().len(), 36);
        assert!(e.mesh().is_some_and(|m| m.is_stale()));

        while !e.is_settled() {
            e.tick(0.1);
        }
        assert!(e.fragments().is_empty());
    }

    #[test]
    fn bad_deltas_count_as_zero() {
        let mut e = engine();
        e.initialize(model::unit_cube());
        e.params_mut().set_visit_interval(0.5);
        e.start();
        e.tick(f64::NAN);
        e.tick(-3.);
        e.tick(f64::INFINITY);
        assert_eq!(e.stats().advances, 0);
    }

    #[test]
    fn halted_engine_still_ages_fragments() {
        let mut e = engine();
        e.initialize(model::unit_cube());
        e.params_mut().set_visit_interval(0.);
        e.start();
        e.tick(0.);
        assert_eq!(e.fragments().len(), 1);
        e.halt();
        assert_eq!(e.state(), TraversalState::Idle);
        e.tick(1.);
        assert_eq!(e.fragments()[0].age, 1.);
        assert_eq!(e.stats().faces_consumed, 1);
    }

    #[test]
    fn params_are_read_live() {
        let mut e = engine();
        e.initialize(model::unit_cube());
        e.params_mut().set_visit_interval(10.);
        e.start();
        e.tick(1.);
        assert_eq!(e.stats().advances, 0);
        e.params_mut().set_visit_interval(1.);
        e.tick(0.);
        assert_eq!(e.stats().advances, 1);
    }

    #[test]
    fn initialize_replaces_previous_run() {
        let mut e = engine();
        e.initialize(model::unit_cube());
        e.params_mut().set_visit_interval(0.);
        e.start();
        e.tick(0.);
        assert!(!e.fragments().is_empty());

        e.initialize(model::unit_cube());
        assert!(e.fragments().is_empty());
        assert_eq!(e.state(), TraversalState::Idle);
        assert_eq!(e.stats().faces_remaining, 12);

        e.clean();
        assert!(e.mesh().is_none());
    }
}
