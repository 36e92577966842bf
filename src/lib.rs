//! `chainrank`: pull-based PageRank over CSR with degree-one chain compression.
//!
//! The crate computes PageRank by power iteration over the transpose's CSR
//! (each vertex pulls from its incoming edges), collapsing maximal chains of
//! degree-one vertices into closed-form geometric updates instead of
//! iterating them edge by edge.
//!
//! Public invariants (must not drift):
//! - **Id spaces**: graphs may use a sparse id space; results are indexed by
//!   original id over the graph's span, with 0.0 at absent ids. The internal
//!   dense index space never leaks past the driver boundary.
//! - **Determinism**: identical graphs, priors, and configs produce
//!   bit-identical ranks and iteration counts.
//! - **Compression is transparent**: enabling or disabling chain compression
//!   changes performance, not results (beyond a small multiple of the
//!   convergence tolerance).
//!
//! Swappable (allowed to change without breaking the contract):
//! - iteration strategy (the kernel takes explicit vertex ranges so a
//!   partitioned driver can reuse it)
//! - convergence details (so long as tolerance semantics remain correct)
//! - internal data structures (so long as invariants hold)

pub mod chains;
pub mod csr;
pub mod graph;
pub mod pagerank;

pub use chains::chains;
pub use csr::{Csr, IdMap};
pub use graph::{transpose_with_degree, DiGraph};
pub use pagerank::{
    pagerank, pagerank_checked, pagerank_checked_run, pagerank_run, pagerank_seeded_checked_run,
    pagerank_seeded_run, PageRankConfig, PageRankRun,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
