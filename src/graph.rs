//! Directed graph over a possibly sparse vertex-id space.
//!
//! Vertex ids need not be contiguous: the structure tracks a **span**
//! (max id + 1) and an **order** (number of present vertices). Algorithms
//! that want a dense `0..n` index space go through [`crate::csr::IdMap`].
//!
//! Each vertex carries an integer payload; [`transpose_with_degree`] uses it
//! to store original-graph out-degrees on the transpose, which is what the
//! PageRank kernel consumes as its dangling-vertex signal.

/// A directed graph with adjacency lists and per-vertex integer payloads.
///
/// Edges are stored in insertion order; parallel edges are kept (a duplicate
/// edge simply contributes twice).
#[derive(Debug, Clone, Default)]
pub struct DiGraph {
    present: Vec<bool>,
    adj: Vec<Vec<usize>>,
    data: Vec<usize>,
    order: usize,
    size: usize,
}

impl DiGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a `u -> v` edge list, creating endpoints as needed.
    pub fn from_edges(edges: &[(usize, usize)]) -> Self {
        let mut g = Self::new();
        for &(u, v) in edges {
            g.add_edge(u, v);
        }
        g
    }

    /// Max vertex id + 1 (0 for the empty graph).
    pub fn span(&self) -> usize {
        self.present.len()
    }

    /// Number of present vertices.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of edges.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn has_vertex(&self, u: usize) -> bool {
        u < self.present.len() && self.present[u]
    }

    /// Add a vertex; a no-op if it already exists.
    pub fn add_vertex(&mut self, u: usize) {
        if u >= self.present.len() {
            self.present.resize(u + 1, false);
            self.adj.resize(u + 1, Vec::new());
            self.data.resize(u + 1, 0);
        }
        if !self.present[u] {
            self.present[u] = true;
            self.order += 1;
        }
    }

    /// Add a `u -> v` edge, creating endpoints as needed.
    pub fn add_edge(&mut self, u: usize, v: usize) {
        self.add_vertex(u);
        self.add_vertex(v);
        self.adj[u].push(v);
        self.size += 1;
    }

    /// Present vertex ids in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.present
            .iter()
            .enumerate()
            .filter(|(_, &p)| p)
            .map(|(u, _)| u)
    }

    /// Out-neighbors of `u` as a borrowed slice (empty if `u` is absent).
    pub fn out_neighbors(&self, u: usize) -> &[usize] {
        if u < self.adj.len() {
            &self.adj[u]
        } else {
            &[]
        }
    }

    pub fn out_degree(&self, u: usize) -> usize {
        self.out_neighbors(u).len()
    }

    /// Per-vertex payload (0 if `u` is absent).
    pub fn vertex_data(&self, u: usize) -> usize {
        if u < self.data.len() {
            self.data[u]
        } else {
            0
        }
    }

    pub fn set_vertex_data(&mut self, u: usize, d: usize) {
        if self.has_vertex(u) {
            self.data[u] = d;
        }
    }
}

/// Transpose of `g`, with each vertex's payload set to its out-degree in `g`.
///
/// The PageRank kernel iterates over *predecessors*, so it consumes the
/// transpose; payload zero marks a dangling vertex of the original graph.
pub fn transpose_with_degree(g: &DiGraph) -> DiGraph {
    let mut t = DiGraph::new();
    for u in g.vertices() {
        t.add_vertex(u);
    }
    for u in g.vertices() {
        for &v in g.out_neighbors(u) {
            t.add_edge(v, u);
        }
    }
    for u in g.vertices() {
        t.set_vertex_data(u, g.out_degree(u));
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_vs_order_with_sparse_ids() {
        let g = DiGraph::from_edges(&[(0, 5), (5, 2)]);
        assert_eq!(g.span(), 6);
        assert_eq!(g.order(), 3);
        assert_eq!(g.size(), 2);
        assert!(g.has_vertex(5));
        assert!(!g.has_vertex(3));
        assert_eq!(g.vertices().collect::<Vec<_>>(), vec![0, 2, 5]);
    }

    #[test]
    fn transpose_reverses_edges_and_records_out_degrees() {
        // 0 -> 1, 0 -> 2, 1 -> 2; 2 is dangling
        let g = DiGraph::from_edges(&[(0, 1), (0, 2), (1, 2)]);
        let t = transpose_with_degree(&g);
        assert_eq!(t.order(), 3);
        assert_eq!(t.size(), 3);
        assert_eq!(t.out_neighbors(2), &[0, 1]);
        assert_eq!(t.out_neighbors(1), &[0]);
        assert_eq!(t.out_neighbors(0), &[] as &[usize]);
        assert_eq!(t.vertex_data(0), 2);
        assert_eq!(t.vertex_data(1), 1);
        assert_eq!(t.vertex_data(2), 0);
    }

    #[test]
    fn parallel_edges_are_kept() {
        let g = DiGraph::from_edges(&[(0, 1), (0, 1)]);
        assert_eq!(g.size(), 2);
        assert_eq!(g.out_degree(0), 2);
    }
}
