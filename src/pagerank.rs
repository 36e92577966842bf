//! PageRank centrality over a pull-based CSR, with chain compression.
//!
//! Each vertex pulls contributions from its incoming edges (enumerated via
//! the transpose's CSR), so the inner loop is a sparse matrix-vector product
//! against the scaled rank vector. Maximal runs of degree-one vertices are
//! not iterated at all: an interior vertex `i` steps down a linear recurrence
//! `rank_i = c0 + p * rank_{i-1}` from its chain head, which has the exact
//! closed form `((1 - p^i) / (1 - p)) * c0 + p^i * rank_head`.

use std::ops::Range;
use std::time::{Duration, Instant};

use crate::chains::chains;
use crate::csr::{Csr, IdMap};
use crate::graph::DiGraph;
use crate::{Error, Result};

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRankRun {
    /// Final ranks, indexed by original vertex id over the graph's span.
    /// Absent ids hold 0.0.
    pub ranks: Vec<f64>,
    /// Number of relaxation steps performed.
    pub iterations: usize,
    /// Final \(L_1\) residual (sum of absolute deltas).
    pub diff_l1: f64,
    /// False if the iteration cap was reached before the tolerance.
    pub converged: bool,
    /// Mean wall time of the iteration phase over `repeat` runs.
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRankConfig {
    pub damping: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Disable chain compression (every vertex goes through the pull step).
    pub skip_chains: bool,
    /// Timed repetitions of the iteration phase; affects `elapsed` only.
    pub repeat: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 500,
            skip_chains: false,
            repeat: 1,
        }
    }
}

impl PageRankConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.damping.is_finite() || self.damping <= 0.0 || self.damping >= 1.0 {
            return Err(Error::InvalidParameter(
                "damping must be in (0,1)".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter(
                "tolerance must be finite and > 0".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if self.repeat == 0 {
            return Err(Error::InvalidParameter("repeat must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Per-iteration teleport scalar: uniform jump mass plus the damped rank of
/// dangling vertices in `range`, recomputed from the current estimate.
fn teleport(r: &[f64], out_degrees: &[usize], range: Range<usize>, n: usize, damping: f64) -> f64 {
    let n_f64 = n as f64;
    let mut c0 = (1.0 - damping) / n_f64;
    for v in range {
        if out_degrees[v] == 0 {
            c0 += damping * r[v] / n_f64;
        }
    }
    c0
}

/// Per-vertex multipliers `f[v] = damping / outdeg(v)`, 0 for dangling
/// vertices. Out-degrees are fixed, so this runs once per computation.
fn factors(f: &mut [f64], out_degrees: &[usize], range: Range<usize>, damping: f64) {
    for v in range {
        let d = out_degrees[v];
        f[v] = if d > 0 { damping / d as f64 } else { 0.0 };
    }
}

/// Flag chain-interior vertices so the pull step skips them.
fn mark_chain_interiors(interior: &mut [bool], ch: &[Vec<usize>]) {
    for vs in ch {
        for &v in &vs[1..] {
            interior[v] = true;
        }
    }
}

/// Pull step: `a[v] = c0 + sum of c[u] over incoming edges`, for every
/// non-interior vertex in `range`. `c` must already hold `r[v] * f[v]`.
fn relax(a: &mut [f64], c: &[f64], csr: &Csr, interior: &[bool], range: Range<usize>, c0: f64) {
    for v in range {
        if interior[v] {
            continue;
        }
        a[v] = c0 + csr.incoming(v).iter().map(|&u| c[u]).sum::<f64>();
    }
}

/// Closed-form step for chain interiors.
///
/// The geometric coefficient `(1 - p^i) / (1 - p)` is accumulated as the
/// running sum `1 + p + ... + p^(i-1)` rather than via the quotient, which
/// keeps it exact when `p` is close to 1.
fn relax_chains(a: &mut [f64], r: &[f64], ch: &[Vec<usize>], damping: f64, c0: f64) {
    for vs in ch {
        let head_rank = r[vs[0]];
        let mut geom = 0.0;
        let mut pi = 1.0;
        for &v in &vs[1..] {
            geom += pi;
            pi *= damping;
            a[v] = geom * c0 + pi * head_rank;
        }
    }
}

fn l1_delta(a: &[f64], r: &[f64], range: Range<usize>) -> f64 {
    range.map(|v| (a[v] - r[v]).abs()).sum()
}

/// Power iteration until the L1 residual drops below the tolerance or the
/// iteration cap is reached. On return the newest estimate is in `r`.
#[allow(clippy::too_many_arguments)]
fn power_loop(
    a: &mut Vec<f64>,
    r: &mut Vec<f64>,
    c: &mut [f64],
    f: &[f64],
    csr: &Csr,
    interior: &[bool],
    ch: &[Vec<usize>],
    range: Range<usize>,
    n: usize,
    config: PageRankConfig,
) -> (usize, f64, bool) {
    let mut iterations = 0usize;
    let mut diff = f64::INFINITY;
    let mut converged = false;
    while iterations < config.max_iterations {
        iterations += 1;
        let c0 = teleport(r, &csr.out_degrees, range.clone(), n, config.damping);
        for v in range.clone() {
            c[v] = r[v] * f[v];
        }
        relax(a, c, csr, interior, range.clone(), c0);
        relax_chains(a, r, ch, config.damping, c0);
        diff = l1_delta(a, r, range.clone());
        // The freshly computed estimate becomes current; the old buffer is
        // reused as scratch, so the newest values are in `r` on every exit.
        std::mem::swap(a, r);
        log::trace!("iteration {iterations}: l1 delta = {diff:e}");
        if diff < config.tolerance {
            converged = true;
            break;
        }
    }
    (iterations, diff, converged)
}

pub fn pagerank(x: &DiGraph, xt: &DiGraph, config: PageRankConfig) -> Vec<f64> {
    pagerank_run(x, xt, config).ranks
}

pub fn pagerank_run(x: &DiGraph, xt: &DiGraph, config: PageRankConfig) -> PageRankRun {
    pagerank_seeded_run(x, xt, None, config)
}

/// Checked PageRank.
///
/// This validates `config` and rejects obviously-invalid numeric settings.
pub fn pagerank_checked(x: &DiGraph, xt: &DiGraph, config: PageRankConfig) -> Result<Vec<f64>> {
    config.validate()?;
    Ok(pagerank(x, xt, config))
}

pub fn pagerank_checked_run(
    x: &DiGraph,
    xt: &DiGraph,
    config: PageRankConfig,
) -> Result<PageRankRun> {
    config.validate()?;
    Ok(pagerank_run(x, xt, config))
}

pub fn pagerank_seeded_checked_run(
    x: &DiGraph,
    xt: &DiGraph,
    prior: Option<&[f64]>,
    config: PageRankConfig,
) -> Result<PageRankRun> {
    config.validate()?;
    if let Some(q) = prior {
        if q.len() != xt.span() {
            return Err(Error::InvalidParameter(format!(
                "prior length must equal the graph span (len={} span={})",
                q.len(),
                xt.span()
            )));
        }
        for &v in q {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::InvalidParameter(
                    "prior entries must be finite and non-negative".to_string(),
                ));
            }
        }
    }
    Ok(pagerank_seeded_run(x, xt, prior, config))
}

/// PageRank with convergence reporting and an optional starting vector.
///
/// `x` is the original graph; `xt` must be its transpose built by
/// [`transpose_with_degree`](crate::graph::transpose_with_degree) so that
/// vertex payloads carry original out-degrees. `prior`, when given, is
/// span-indexed in the original id space and is compressed at this boundary;
/// it is used as-is, without renormalization.
pub fn pagerank_seeded_run(
    x: &DiGraph,
    xt: &DiGraph,
    prior: Option<&[f64]>,
    config: PageRankConfig,
) -> PageRankRun {
    let ids = IdMap::of(xt);
    let n = ids.len();
    if n == 0 {
        return PageRankRun {
            ranks: vec![0.0; xt.span()],
            iterations: 0,
            diff_l1: 0.0,
            converged: true,
            elapsed: Duration::ZERO,
        };
    }

    let csr = Csr::of(xt, &ids);
    let ch: Vec<Vec<usize>> = if config.skip_chains {
        Vec::new()
    } else {
        chains(x, xt)
            .into_iter()
            .map(|vs| {
                vs.into_iter()
                    .map(|u| ids.index(u).expect("chain vertex is present"))
                    .collect()
            })
            .collect()
    };
    let mut interior = vec![false; n];
    mark_chain_interiors(&mut interior, &ch);

    let collapsed: usize = ch.iter().map(|vs| vs.len() - 1).sum();
    log::debug!(
        "pagerank: {n} vertices, {} edges, {} chain-collapsed",
        csr.sources.len(),
        collapsed
    );

    let mut f = vec![0.0; n];
    factors(&mut f, &csr.out_degrees, 0..n, config.damping);

    let seed = prior.map(|q| ids.compress(q));
    let mut a = vec![0.0; n];
    let mut r = vec![0.0; n];
    let mut c = vec![0.0; n];

    let mut iterations = 0usize;
    let mut diff_l1 = f64::INFINITY;
    let mut converged = false;
    let mut total = Duration::ZERO;
    for _ in 0..config.repeat.max(1) {
        a.fill(0.0);
        match &seed {
            Some(s) => r.copy_from_slice(s),
            None => r.fill(1.0 / n as f64),
        }
        let start = Instant::now();
        let (l, d, ok) = power_loop(
            &mut a, &mut r, &mut c, &f, &csr, &interior, &ch, 0..n, n, config,
        );
        total += start.elapsed();
        iterations = l;
        diff_l1 = d;
        converged = ok;
    }

    PageRankRun {
        ranks: ids.decompress(&r),
        iterations,
        diff_l1,
        converged,
        elapsed: total / config.repeat.max(1) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::transpose_with_degree;

    #[test]
    fn teleport_counts_only_dangling_vertices_in_range() {
        let r = vec![0.25; 4];
        let out_degrees = vec![2, 0, 1, 0];
        let p = 0.85;
        let c0 = teleport(&r, &out_degrees, 0..4, 4, p);
        let expect = (1.0 - p) / 4.0 + p * 0.25 / 4.0 + p * 0.25 / 4.0;
        assert!((c0 - expect).abs() < 1e-15, "c0={c0} expect={expect}");

        // A range excluding vertex 3 drops its dangling mass.
        let c0 = teleport(&r, &out_degrees, 0..3, 4, p);
        let expect = (1.0 - p) / 4.0 + p * 0.25 / 4.0;
        assert!((c0 - expect).abs() < 1e-15);
    }

    #[test]
    fn factors_are_damping_over_degree_or_zero() {
        let out_degrees = vec![4, 0, 1];
        let mut f = vec![f64::NAN; 3];
        factors(&mut f, &out_degrees, 0..3, 0.85);
        assert_eq!(f, vec![0.85 / 4.0, 0.0, 0.85]);
    }

    #[test]
    fn chain_step_matches_the_powf_closed_form() {
        let p = 0.85;
        let c0 = 0.0123;
        let ch = vec![vec![0usize, 1, 2, 3, 4]];
        let r = vec![0.7, 0.0, 0.0, 0.0, 0.0];
        let mut a = vec![0.0; 5];
        relax_chains(&mut a, &r, &ch, p, c0);
        for i in 1..5 {
            let pi = p.powi(i as i32);
            let expect = ((1.0 - pi) / (1.0 - p)) * c0 + pi * r[0];
            assert!(
                (a[i] - expect).abs() < 1e-12,
                "i={i} a={} expect={expect}",
                a[i]
            );
        }
    }

    #[test]
    fn chain_step_is_stable_for_damping_near_one() {
        let p = 1.0 - 1e-12;
        let ch = vec![vec![0usize, 1, 2, 3]];
        let r = vec![0.5, 0.0, 0.0, 0.0];
        let mut a = vec![0.0; 4];
        relax_chains(&mut a, &r, &ch, p, 0.01);
        // The c0 coefficient for interior i tends to i as p tends to 1.
        assert!((a[1] - (0.01 + p * 0.5)).abs() < 1e-9);
        assert!((a[3] - (3.0 * 0.01 + 0.5)).abs() < 1e-6);
    }

    #[test]
    fn marked_interiors_are_skipped_by_the_pull_step() {
        let mut interior = vec![false; 4];
        mark_chain_interiors(&mut interior, &[vec![0, 2, 3]]);
        assert_eq!(interior, vec![false, false, true, true]);
    }

    #[test]
    fn config_validate_rejects_bad_settings() {
        let ok = PageRankConfig::default();
        assert!(ok.validate().is_ok());
        for bad in [
            PageRankConfig { damping: 0.0, ..ok },
            PageRankConfig { damping: 1.0, ..ok },
            PageRankConfig {
                damping: f64::NAN,
                ..ok
            },
            PageRankConfig {
                tolerance: 0.0,
                ..ok
            },
            PageRankConfig {
                max_iterations: 0,
                ..ok
            },
            PageRankConfig { repeat: 0, ..ok },
        ] {
            assert!(bad.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn seeded_checked_rejects_wrong_length_prior() {
        let x = DiGraph::from_edges(&[(0, 1)]);
        let xt = transpose_with_degree(&x);
        let err = pagerank_seeded_checked_run(&x, &xt, Some(&[1.0]), PageRankConfig::default())
            .unwrap_err();
        assert!(format!("{err}").contains("prior length"));
    }

    #[test]
    fn empty_graph_yields_an_empty_run() {
        let x = DiGraph::new();
        let xt = transpose_with_degree(&x);
        let run = pagerank_run(&x, &xt, PageRankConfig::default());
        assert!(run.ranks.is_empty());
        assert_eq!(run.iterations, 0);
        assert!(run.converged);
    }
}
