use phf::Mphf;

use model::geom::FaceId;

/// Load factor handed to the perfect hash builder. Larger is faster to build, but uses more bits.
const GAMMA: f64 = 1.7;

/// An undirected mesh edge, stored with the smaller vertex index first.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct EdgeKey(u32, u32);
impl EdgeKey {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
    pub fn ends(&self) -> (u32, u32) {
        (self.0, self.1)
    }
    /// The three edges bounding the triangle `[a, b, c]`.
    pub fn of_triangle([a, b, c]: [u32; 3]) -> [EdgeKey; 3] {
        [EdgeKey::new(a, b), EdgeKey::new(b, c), EdgeKey::new(c, a)]
    }
}
impl From<(u32, u32)> for EdgeKey {
    fn from((a, b): (u32, u32)) -> Self {
        Self::new(a, b)
    }
}
impl From<EdgeKey> for (u32, u32) {
    fn from(e: EdgeKey) -> Self {
        e.ends()
    }
}

/// Maps every distinct edge of a mesh to the faces it bounds.
///
/// Slots are assigned by a minimal perfect hash over the distinct keys, so a lookup is a single
/// hash plus a check that the slot really belongs to the key asked for (the hash happily maps
/// foreign keys onto some slot).
pub struct EdgeIndex {
    phf: Option<Mphf<EdgeKey>>,
    keys: Vec<EdgeKey>,
    faces: Vec<Vec<FaceId>>,
}
impl EdgeIndex {
    pub fn new(face_edges: &[[EdgeKey; 3]]) -> Self {
        let mut unique = face_edges.iter().flatten().copied().collect::<Vec<_>>();
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return Self {
                phf: None,
                keys: vec![],
                faces: vec![],
            };
        }

        let phf = Mphf::new(GAMMA, &unique);
        let mut keys = vec![EdgeKey(0, 0); unique.len()];
        for k in unique.iter() {
            keys[phf.hash(k) as usize] = *k;
        }
        let mut faces = vec![Vec::with_capacity(2); unique.len()];
        for (f, edges) in face_edges.iter().enumerate() {
            for e in edges.iter() {
                faces[phf.hash(e) as usize].push(FaceId::from(f));
            }
        }
        Self {
            phf: Some(phf),
            keys,
            faces,
        }
    }

    fn slot(&self, key: &EdgeKey) -> Option<usize> {
        let s = self.phf.as_ref()?.try_hash(key)? as usize;
        (self.keys[s] == *key).then_some(s)
    }

    /// Faces bounded by `key`, in face order. Empty if the edge is not in the mesh.
    pub fn faces_on(&self, key: &EdgeKey) -> &[FaceId] {
        match self.slot(key) {
            Some(s) => &self.faces[s],
            None => &[],
        }
    }

    /// Number of distinct edges.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Edges shared by more than two faces.
    pub fn non_manifold(&self) -> impl Iterator<Item = &EdgeKey> {
        self.keys
            .iter()
            .zip(self.faces.iter())
            .filter(|(_, ff)| ff.len() > 2)
            .map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_canonical() {
        assert_eq!(EdgeKey::new(7, 3), EdgeKey::new(3, 7));
        assert_eq!(EdgeKey::new(7, 3).ends(), (3, 7));
        assert_eq!(EdgeKey::from((2, 2)).ends(), (2, 2));
    }

    #[test]
    fn triangle_edges_wrap_around() {
        assert_eq!(
            EdgeKey::of_triangle([4, 1, 9]),
            [EdgeKey::new(1, 4), EdgeKey::new(1, 9), EdgeKey::new(4, 9)]
        );
    }

    #[test]
    fn index_groups_faces_by_edge() {
        let edges = [[0, 1, 2], [2, 1, 3], [5, 6, 7]].map(EdgeKey::of_triangle);
        let index = EdgeIndex::new(&edges);
        assert_eq!(index.len(), 8);
        assert_eq!(
            index.faces_on(&EdgeKey::new(1, 2)),
            &[FaceId(0), FaceId(1)]
        );
        assert_eq!(index.faces_on(&EdgeKey::new(6, 5)), &[FaceId(2)]);
        assert!(index.faces_on(&EdgeKey::new(0, 3)).is_empty());
        assert!(index.faces_on(&EdgeKey::new(100, 200)).is_empty());
        assert_eq!(index.non_manifold().count(), 0);
    }

    #[test]
    fn index_keeps_fans_of_more_than_two() {
        let edges = [[0, 1, 2], [1, 0, 3], [0, 1, 4]].map(EdgeKey::of_triangle);
        let index = EdgeIndex::new(&edges);
        assert_eq!(index.faces_on(&EdgeKey::new(0, 1)).len(), 3);
        assert_eq!(index.non_manifold().collect::<Vec<_>>(), vec![&EdgeKey::new(0, 1)]);
    }

    #[test]
    fn empty_index() {
        let index = EdgeIndex::new(&[]);
        assert!(index.is_empty());
        assert!(index.faces_on(&EdgeKey::new(0, 1)).is_empty());
    }
}
