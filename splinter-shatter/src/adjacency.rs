use crate::edge::{EdgeIndex, EdgeKey};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use model::geom::{tri::TriMeshGeom, FaceId};

/// Face adjacency of a mesh, indexed by [`FaceId`].
///
/// Two faces are neighbours when they share an edge. Every face of the mesh's face arena gets an
/// entry, drawable or not. Non-manifold edges simply make the neighbour lists longer; a face that
/// shares two edges with the same neighbour lists it twice.
pub struct AdjacencyGraph {
    edges: Vec<[EdgeKey; 3]>,
    index: EdgeIndex,
    neighbors: Vec<Vec<FaceId>>,
}
impl AdjacencyGraph {
    pub fn build(mesh: &TriMeshGeom) -> Self {
        let edges = (0..mesh.face_count())
            .map(|f| EdgeKey::of_triangle(mesh.triangle(FaceId::from(f))))
            .collect::<Vec<_>>();
        let index = EdgeIndex::new(&edges);

        let neighbors = edges
            .iter()
            .enumerate()
            .map(|(f, face_edges)| {
                let me = FaceId::from(f);
                face_edges
                    .iter()
                    .flat_map(|e| index.faces_on(e).iter().copied())
                    .filter(|&other| other != me)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        debug!(
            "Built adjacency for {} faces over {} edges ({} non-manifold).",
            edges.len(),
            index.len(),
            index.non_manifold().count()
        );
        Self {
            edges,
            index,
            neighbors,
        }
    }

    pub fn face_count(&self) -> usize {
        self.neighbors.len()
    }
    pub fn edge_count(&self) -> usize {
        self.index.len()
    }
    pub fn neighbors(&self, f: FaceId) -> &[FaceId] {
        &self.neighbors[usize::from(f)]
    }
    pub fn edges(&self, f: FaceId) -> &[EdgeKey; 3] {
        &self.edges[usize::from(f)]
    }
    pub fn faces_on_edge(&self, e: &EdgeKey) -> &[FaceId] {
        self.index.faces_on(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(positions: &[[f32; 3]], triangles: &[[u32; 3]]) -> AdjacencyGraph {
        AdjacencyGraph::build(&TriMeshGeom::from_triangles(positions, triangles).unwrap())
    }

    fn ids(graph: &AdjacencyGraph) -> impl Iterator<Item = FaceId> {
        (0..graph.face_count()).map(FaceId::from)
    }

    #[test]
    fn isolated_triangle_has_no_neighbours() {
        let g = graph_of(&[[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]], &[[0, 1, 2]]);
        assert!(g.neighbors(FaceId(0)).is_empty());
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn shared_edge_links_both_ways() {
        let g = graph_of(
            &[[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]],
            &[[0, 1, 2], [0, 2, 3]],
        );
        assert_eq!(g.neighbors(FaceId(0)), &[FaceId(1)]);
        assert_eq!(g.neighbors(FaceId(1)), &[FaceId(0)]);
        assert_eq!(g.faces_on_edge(&EdgeKey::new(2, 0)), &[FaceId(0), FaceId(1)]);
        assert_eq!(g.edges(FaceId(1))[2], EdgeKey::new(0, 3));
    }

    #[test]
    fn cube_is_three_regular_and_symmetric() {
        let g = AdjacencyGraph::build(&model::unit_cube());
        assert_eq!(g.edge_count(), 18);
        for f in ids(&g) {
            assert_eq!(g.neighbors(f).len(), 3, "face {:?}", f);
            assert!(!g.neighbors(f).contains(&f));
            for &n in g.neighbors(f) {
                assert!(g.neighbors(n).contains(&f), "{:?} -> {:?} is one-way", f, n);
            }
        }
    }

    #[test]
    fn non_manifold_fan_broadens_lists() {
        // Three fins hinged on the edge 0-1.
        let g = graph_of(
            &[[0., 0., 0.], [1., 0., 0.], [0., 1., 0.], [0., -1., 0.], [0., 0., 1.]],
            &[[0, 1, 2], [1, 0, 3], [0, 1, 4]],
        );
        for f in ids(&g) {
            assert_eq!(g.neighbors(f).len(), 2);
            assert!(!g.neighbors(f).contains(&f));
        }
    }

    #[test]
    fn empty_mesh_builds_empty_graph() {
        let g = graph_of(&[], &[]);
        assert_eq!(g.face_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }
}
