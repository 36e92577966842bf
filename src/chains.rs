//! Maximal degree-one chain discovery.
//!
//! A chain is a maximal run `[head, v1, v2, ...]` where every vertex after
//! the head has in-degree and out-degree exactly one and its sole predecessor
//! is the previous element. The head is an ordinary vertex (its rank comes
//! from the general relaxation) but must have out-degree one: the closed-form
//! update multiplies the head's rank by the bare damping factor, which is the
//! head's edge share only when it has a single outgoing edge.

use crate::graph::DiGraph;

/// Find all maximal chains of `x`, given its transpose `xt`.
///
/// Returned sequences are in the original id space, each of length ≥ 2
/// (`[head, interiors...]`). Interior ids are disjoint across chains and a
/// head is never an interior. A cycle made entirely of degree-one vertices is
/// broken by electing one member as head.
pub fn chains(x: &DiGraph, xt: &DiGraph) -> Vec<Vec<usize>> {
    let link = |v: usize| x.out_degree(v) == 1 && xt.out_degree(v) == 1;
    let mut visited = vec![false; x.span()];
    let mut out = Vec::new();

    for v in x.vertices() {
        if visited[v] || !link(v) {
            continue;
        }

        // Walk back through sole predecessors to the start of the run.
        let mut first = v;
        let mut head = loop {
            let p = xt.out_neighbors(first)[0];
            if !link(p) || visited[p] {
                break p;
            }
            if p == v {
                // Closed ring of degree-one vertices: elect v as head.
                break v;
            }
            first = p;
        };
        if head == v {
            first = x.out_neighbors(v)[0];
        } else if x.out_degree(head) != 1 {
            // A multi-edge head cannot feed the factor-p recurrence; the
            // earliest degree-one vertex heads the chain instead.
            head = first;
            first = x.out_neighbors(head)[0];
        }
        if first == head || !link(first) || visited[first] {
            // No collapsible interior after the head.
            continue;
        }

        // Collect interiors forward from the vertex after the head.
        let mut seq = vec![head];
        let mut cur = first;
        loop {
            visited[cur] = true;
            seq.push(cur);
            let next = x.out_neighbors(cur)[0];
            if next == head || !link(next) || visited[next] {
                break;
            }
            cur = next;
        }
        out.push(seq);
    }
    out
}
