//! Depth-bounded closure search.
//!
//! Explores same-labeled edges outward from a descriptor, up to `depth`
//! hops. The output is the depth-first pre-order of the naive recursive
//! formulation (append all neighbours, then descend into each one) with
//! duplicates collapsed to their first occurrence. An explicit stack of
//! `(descriptor, remaining)` frames replaces the recursion so deep graphs
//! cannot overflow the call stack.
//!
//! A frame is skipped when everything within `remaining` hops of its
//! descriptor has already been emitted: such a frame and all frames below
//! it would only emit duplicates. This keeps cycles cheap at large depths
//! without changing the emitted order.

use crate::relation::RelationLabel;
use crate::relation_index::RelationIndex;
use std::collections::{HashMap, HashSet, VecDeque};

/// Descriptors reachable from `descriptor` through at most `depth` edges
/// labeled `label`, deduplicated in first-seen order.
///
/// `depth == 0` always yields nothing. The start descriptor shows up in the
/// result only if a cycle leads back to it.
pub fn closure_search<'g>(
    index: &RelationIndex<'g>,
    descriptor: &str,
    label: RelationLabel,
    depth: usize,
) -> Vec<&'g str> {
    let mut result = Vec::new();
    if depth == 0 {
        return result;
    }

    let mut emitted: HashSet<&'g str> = HashSet::new();
    // Largest remaining depth each descriptor was found exhausted with.
    let mut exhausted: HashMap<String, usize> = HashMap::new();
    let mut stack: Vec<(String, usize)> = vec![(descriptor.to_string(), depth)];

    while let Some((current, remaining)) = stack.pop() {
        if remaining == 0 {
            continue;
        }
        if exhausted.get(&current).is_some_and(|&done| done >= remaining) {
            continue;
        }
        if within(index, &current, label, remaining).is_subset(&emitted) {
            let done = exhausted.entry(current).or_insert(remaining);
            *done = (*done).max(remaining);
            continue;
        }

        let next = index.descriptors_reachable_via(&current, label);
        for &found in &next {
            if emitted.insert(found) {
                result.push(found);
            }
        }
        // reversed so the first neighbour is explored first
        for found in next.into_iter().rev() {
            stack.push((found.to_string(), remaining - 1));
        }
    }

    result
}

/// Every descriptor between 1 and `hops` edges away from `from`.
fn within<'g>(
    index: &RelationIndex<'g>,
    from: &str,
    label: RelationLabel,
    hops: usize,
) -> HashSet<&'g str> {
    let mut found = HashSet::new();
    let mut expanded: HashSet<String> = HashSet::from([from.to_string()]);
    let mut queue = VecDeque::from([(from.to_string(), 0usize)]);

    while let Some((current, distance)) = queue.pop_front() {
        for next in index.descriptors_reachable_via(&current, label) {
            found.insert(next);
            if distance + 1 < hops && expanded.insert(next.to_string()) {
                queue.push_back((next.to_string(), distance + 1));
            }
        }
    }

    found
}

/// Synonym closure: [`closure_search`] over `skos:related` edges.
pub fn synonym_closure<'g>(
    index: &RelationIndex<'g>,
    descriptor: &str,
    depth: usize,
) -> Vec<&'g str> {
    closure_search(index, descriptor, RelationLabel::Related, depth)
}
