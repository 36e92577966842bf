//! CSR assembly and vertex-id (de)compression.
//!
//! The kernel works in a dense internal index space `0..n`; graphs may use a
//! sparse id space. [`IdMap`] is the injective mapping between the two, and
//! it is applied only at the driver's seed and result boundaries.

use crate::graph::DiGraph;

/// Injective mapping between original vertex ids and dense internal indices.
///
/// Internal indices follow ascending id order, so a graph whose ids are
/// already `0..n` maps to itself.
#[derive(Debug, Clone)]
pub struct IdMap {
    ids: Vec<usize>,
    index: Vec<Option<usize>>,
}

impl IdMap {
    pub fn of(g: &DiGraph) -> Self {
        let ids: Vec<usize> = g.vertices().collect();
        let mut index = vec![None; g.span()];
        for (i, &u) in ids.iter().enumerate() {
            index[u] = Some(i);
        }
        Self { ids, index }
    }

    /// Number of mapped vertices.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Original id of internal index `i`.
    pub fn id(&self, i: usize) -> usize {
        self.ids[i]
    }

    /// Internal index of original id `u`, if present.
    pub fn index(&self, u: usize) -> Option<usize> {
        self.index.get(u).copied().flatten()
    }

    /// Re-express a span-indexed value vector in the internal index space.
    ///
    /// Entries at absent ids are dropped; ids beyond `values.len()` read 0.0.
    pub fn compress(&self, values: &[f64]) -> Vec<f64> {
        self.ids
            .iter()
            .map(|&u| values.get(u).copied().unwrap_or(0.0))
            .collect()
    }

    /// Re-express an internal-index vector in the span-indexed id space.
    ///
    /// Absent ids get 0.0.
    pub fn decompress(&self, values: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.index.len()];
        for (i, &u) in self.ids.iter().enumerate() {
            out[u] = values[i];
        }
        out
    }
}

/// CSR view of a transpose graph in the internal index space.
///
/// `offsets` has length n+1 and is monotonically non-decreasing;
/// `sources[offsets[v]..offsets[v+1]]` are the internal indices of the
/// vertices whose (original-graph) edges point at `v`. `out_degrees[v]` is
/// the out-degree of `v` in the original graph; zero marks a dangling vertex.
#[derive(Debug, Clone)]
pub struct Csr {
    pub offsets: Vec<usize>,
    pub sources: Vec<usize>,
    pub out_degrees: Vec<usize>,
}

impl Csr {
    /// Assemble from a transpose built by
    /// [`transpose_with_degree`](crate::graph::transpose_with_degree).
    pub fn of(xt: &DiGraph, ids: &IdMap) -> Self {
        let n = ids.len();
        let mut offsets = Vec::with_capacity(n + 1);
        let mut sources = Vec::with_capacity(xt.size());
        let mut out_degrees = Vec::with_capacity(n);
        offsets.push(0);
        for i in 0..n {
            let u = ids.id(i);
            for &v in xt.out_neighbors(u) {
                // Present by construction: every edge endpoint is a vertex.
                sources.push(ids.index(v).expect("edge endpoint is a vertex"));
            }
            offsets.push(sources.len());
            out_degrees.push(xt.vertex_data(u));
        }
        Self {
            offsets,
            sources,
            out_degrees,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.out_degrees.len()
    }

    /// Incoming-edge source indices of internal vertex `v`.
    pub fn incoming(&self, v: usize) -> &[usize] {
        &self.sources[self.offsets[v]..self.offsets[v + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::transpose_with_degree;

    #[test]
    fn idmap_round_trips_sparse_ids() {
        let g = DiGraph::from_edges(&[(1, 4), (4, 7)]);
        let ids = IdMap::of(&g);
        assert_eq!(ids.len(), 3);
        assert_eq!(ids.id(0), 1);
        assert_eq!(ids.id(2), 7);
        assert_eq!(ids.index(4), Some(1));
        assert_eq!(ids.index(3), None);

        let span = vec![0.0, 0.1, 0.0, 0.0, 0.4, 0.0, 0.0, 0.7];
        let dense = ids.compress(&span);
        assert_eq!(dense, vec![0.1, 0.4, 0.7]);
        let back = ids.decompress(&dense);
        assert_eq!(back, span);
    }

    #[test]
    fn csr_offsets_and_sources_follow_the_transpose() {
        // 0 -> 1, 0 -> 2, 1 -> 2
        let g = DiGraph::from_edges(&[(0, 1), (0, 2), (1, 2)]);
        let xt = transpose_with_degree(&g);
        let ids = IdMap::of(&xt);
        let csr = Csr::of(&xt, &ids);

        assert_eq!(csr.vertex_count(), 3);
        assert_eq!(csr.offsets, vec![0, 0, 1, 3]);
        assert_eq!(csr.incoming(0), &[] as &[usize]);
        assert_eq!(csr.incoming(1), &[0]);
        assert_eq!(csr.incoming(2), &[0, 1]);
        assert_eq!(csr.out_degrees, vec![2, 1, 0]);
    }

    #[test]
    fn csr_remaps_sparse_ids_to_dense_indices() {
        // ids 2, 5, 9 -> internal 0, 1, 2
        let g = DiGraph::from_edges(&[(2, 5), (5, 9)]);
        let xt = transpose_with_degree(&g);
        let ids = IdMap::of(&xt);
        let csr = Csr::of(&xt, &ids);

        assert_eq!(csr.incoming(1), &[0]);
        assert_eq!(csr.incoming(2), &[1]);
        assert!(csr.sources.iter().all(|&s| s < csr.vertex_count()));
    }
}
