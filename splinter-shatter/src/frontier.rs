use crate::adjacency::AdjacencyGraph;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use model::geom::{tri::TriMeshGeom, FaceId};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TraversalState {
    /// Not started yet, halted, or nothing to start on.
    Idle,
    /// A wavefront is waiting to be consumed.
    Running,
    /// The wavefront died out but faces remain; they are not connected to anything consumed so
    /// far. Starting again seeds the next component.
    Stalled,
    /// Every face has been consumed.
    Exhausted,
}

/// Breadth-first walk over the adjacency graph, one layer per visit interval.
///
/// Consumed faces are taken off the mesh's drawable set as they are visited.
pub struct Frontier {
    queue: Vec<FaceId>,
    visited: Vec<bool>,
    running: bool,
    age: f64,
    last_advance_age: f64,
    advances: u64,
    consumed: usize,
}
impl Frontier {
    /// Faces that are already off the surface count as visited.
    pub fn new(mesh: &TriMeshGeom) -> Self {
        let mut visited = vec![true; mesh.face_count()];
        for &f in mesh.live_faces() {
            visited[usize::from(f)] = false;
        }
        Self {
            queue: vec![],
            visited,
            running: false,
            age: 0.,
            last_advance_age: 0.,
            advances: 0,
            consumed: 0,
        }
    }

    pub fn state(&self, mesh: &TriMeshGeom) -> TraversalState {
        if !self.running {
            TraversalState::Idle
        } else if !self.queue.is_empty() {
            TraversalState::Running
        } else if mesh.is_empty() {
            TraversalState::Exhausted
        } else {
            TraversalState::Stalled
        }
    }

    /// Seeds the wavefront with the first drawable face, or resumes a halted walk.
    ///
    /// Returns whether the walk is now running. On a mesh without drawable faces this does
    /// nothing.
    pub fn start(&mut self, mesh: &TriMeshGeom) -> bool {
        if self.queue.is_empty() {
            match mesh.live_faces().first() {
                Some(&seed) => {
                    info!("Seeding traversal at {:?}.", seed);
                    self.queue.push(seed);
                    self.last_advance_age = self.age;
                }
                None => return false,
            }
        }
        self.running = true;
        true
    }

    /// Stops advancing without forgetting the wavefront.
    pub fn halt(&mut self) {
        if self.running {
            info!("Traversal halted with {} faces queued.", self.queue.len());
        }
        self.running = false;
    }

    /// Runs the clock and, once `interval` seconds have passed since the last advance, consumes
    /// the current wavefront. Returns the faces consumed, in wavefront order.
    pub fn tick(
        &mut self,
        delta: f64,
        interval: f64,
        graph: &AdjacencyGraph,
        mesh: &mut TriMeshGeom,
    ) -> Vec<FaceId> {
        if !self.running || self.queue.is_empty() {
            return vec![];
        }
        self.age += delta;
        if self.age - self.last_advance_age < interval {
            return vec![];
        }
        self.advance(graph, mesh)
    }

    fn advance(&mut self, graph: &AdjacencyGraph, mesh: &mut TriMeshGeom) -> Vec<FaceId> {
        let visited = &mut self.visited;
        let mut next = Vec::new();
        let mut consumed = Vec::new();
        for &f in self.queue.iter() {
            // Reachable from more than one face of the wavefront.
            if visited[usize::from(f)] {
                continue;
            }
            visited[usize::from(f)] = true;
            next.extend(
                graph
                    .neighbors(f)
                    .iter()
                    .copied()
                    .filter(|&n| !visited[usize::from(n)]),
            );
            consumed.push(f);
        }
        // Faces queued earlier in this pass may have been consumed later in it.
        next.retain(|&n| !visited[usize::from(n)]);
        mesh.remove_faces(|f| visited[usize::from(f)]);

        self.queue = next;
        self.last_advance_age = self.age;
        self.advances += 1;
        self.consumed += consumed.len();
        debug!(
            "Advance {} consumed {} faces, {} queued, {} left on the mesh.",
            self.advances,
            consumed.len(),
            self.queue.len(),
            mesh.live_count()
        );
        if self.queue.is_empty() {
            if mesh.is_empty() {
                info!("Traversal exhausted after {} advances.", self.advances);
            } else {
                info!("Traversal stalled with {} unreachable faces.", mesh.live_count());
            }
        }
        consumed
    }

    pub fn is_visited(&self, f: FaceId) -> bool {
        self.visited[usize::from(f)]
    }
    pub fn queue(&self) -> &[FaceId] {
        &self.queue
    }
    pub fn advances(&self) -> u64 {
        self.advances
    }
    pub fn consumed(&self) -> usize {
        self.consumed
    }
    /// Seconds the walk has spent running.
    pub fn age(&self) -> f64 {
        self.age
    }
}
