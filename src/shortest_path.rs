use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{malformed, Result};
use crate::graph::{BipartiteGraph, EdgeId, NodeId, PathInfo};

/// Dijkstra from the source over adjusted distances.
///
/// Returns a [`PathInfo`] for every node reachable from the source. The
/// minimum is picked by a linear scan, so a run is O(V²) after one O(E) pass
/// bucketing edges by tail; equal labels resolve to the lowest [`NodeId`].
/// The sink is terminal: edges leaving it are never relaxed.
pub fn shortest_paths(graph: &BipartiteGraph) -> Result<BTreeMap<NodeId, PathInfo>> {
    let nodes = graph.node_ids();
    let position: BTreeMap<NodeId, usize> =
        nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let source = *position
        .get(&NodeId::Source)
        .ok_or_else(|| malformed("graph has no source"))?;

    let mut outgoing: Vec<Vec<EdgeId>> = vec![Vec::new(); nodes.len()];
    for (id, edge) in graph.edges() {
        let tail = *position
            .get(&edge.source())
            .ok_or_else(|| malformed(format!("edge {} leaves unknown node", id.index())))?;
        outgoing[tail].push(id);
    }

    let mut distance = vec![f64::INFINITY; nodes.len()];
    let mut visited = vec![false; nodes.len()];
    let mut predecessor: Vec<Option<EdgeId>> = vec![None; nodes.len()];
    distance[source] = 0.;

    loop {
        let mut current = None;
        for i in 0..nodes.len() {
            if visited[i] || distance[i].is_infinite() {
                continue;
            }
            match current {
                Some(c) if distance[c] <= distance[i] => {}
                _ => current = Some(i),
            }
        }
        // everything left is unreachable
        let Some(current) = current else { break };
        visited[current] = true;
        trace!(node = ?nodes[current], distance = distance[current], "visit");

        if nodes[current] == NodeId::Sink {
            continue;
        }

        for &id in &outgoing[current] {
            let edge = graph.edge(id)?;
            let head = *position
                .get(&edge.end())
                .ok_or_else(|| malformed(format!("edge {} enters unknown node", id.index())))?;
            if visited[head] {
                continue;
            }
            let through = distance[current] + graph.adjusted_distance(id)?;
            if through < distance[head] {
                distance[head] = through;
                predecessor[head] = Some(id);
            }
        }
    }

    let mut paths = BTreeMap::new();
    for (i, &node) in nodes.iter().enumerate() {
        if !visited[i] {
            continue;
        }
        let mut path = Vec::new();
        let mut at = i;
        while let Some(id) = predecessor[at] {
            if path.len() > nodes.len() {
                debug_assert!(false, "predecessor chain of {node:?} loops");
                return Err(malformed(format!("predecessor chain of {node:?} loops")));
            }
            path.push(id);
            at = position[&graph.edge(id)?.source()];
        }
        if at != source {
            return Err(malformed(format!("{node:?} reached without a path from the source")));
        }
        path.reverse();
        paths.insert(
            node,
            PathInfo {
                distance: distance[i],
                path,
            },
        );
    }

    Ok(paths)
}
