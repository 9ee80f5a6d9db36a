use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::MatcherConfig;
use crate::error::{malformed, MatchingError, Result};
use crate::graph::{BipartiteGraph, EdgeId, NodeId, PathInfo};
use crate::point::{Pair, Point};
use crate::shortest_path::shortest_paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    /// every server and every request matched
    Perfect,
    /// every request matched, spare servers allowed
    RequestsOnly,
}

/// Minimum cost matching by successive shortest augmenting paths with node
/// potentials.
#[derive(Debug, Clone)]
pub struct MinCostMatcher {
    graph: BipartiteGraph,
    matching: BTreeSet<EdgeId>,
    config: MatcherConfig,
}

impl MinCostMatcher {
    pub fn new(graph: BipartiteGraph) -> Self {
        Self::with_config(graph, MatcherConfig::default())
    }

    pub fn with_config(graph: BipartiteGraph, config: MatcherConfig) -> Self {
        Self {
            graph,
            matching: BTreeSet::new(),
            config,
        }
    }

    pub fn graph(&self) -> &BipartiteGraph {
        &self.graph
    }

    pub fn into_graph(self) -> BipartiteGraph {
        self.graph
    }

    pub fn matching(&self) -> &BTreeSet<EdgeId> {
        &self.matching
    }

    /// Minimum cost perfect matching; requires as many servers as requests.
    pub fn run(&mut self) -> Result<Vec<EdgeId>> {
        self.check_sizes(Termination::Perfect)?;
        self.solve(Termination::Perfect)
    }

    /// Matches every request, leaving surplus servers free.
    ///
    /// Orientation, matching and potentials are reset first so the solver can
    /// be re-run on a graph whose request side has grown.
    pub fn run_incomplete_set(&mut self) -> Result<Vec<EdgeId>> {
        self.check_sizes(Termination::RequestsOnly)?;
        self.graph.reset_orientation();
        self.matching.clear();
        self.unmatch_request_nodes();
        self.graph.x_nodes_mut().for_each(|x| x.potential = 0.);
        self.solve(Termination::RequestsOnly)
    }

    /// Adds a request joined to the sink and to every server by its
    /// Euclidean distance.
    pub fn add_request_node(&mut self, mut point: Point, id: usize) {
        point.matched = false;
        let distances: Vec<(usize, f64)> = self
            .graph
            .servers()
            .map(|(x, server)| (x, server.distance(&point)))
            .collect();
        self.graph.add_request(id, point);
        for (x, distance) in distances {
            self.graph.add_edge(x, id, distance);
        }
    }

    /// Clears `matched` on every request. Server flags and the matching set
    /// are left alone.
    pub fn unmatch_request_nodes(&mut self) {
        self.graph.y_nodes_mut().for_each(|y| y.matched = false);
    }

    /// The current matching as point pairs, ordered by server id.
    pub fn pairs(&self) -> Result<Vec<Pair>> {
        let mut pairs = Vec::with_capacity(self.matching.len());
        let mut by_server: Vec<(NodeId, EdgeId)> = self
            .matching
            .iter()
            .map(|&id| -> Result<(NodeId, EdgeId)> {
                Ok((self.graph.edge(id)?.endpoints().0, id))
            })
            .collect::<Result<_>>()?;
        by_server.sort();
        for (_, id) in by_server {
            let edge = self.graph.edge(id)?;
            let (server, request) = edge.endpoints();
            pairs.push(Pair {
                server: self.graph.node(server)?.clone(),
                request: self.graph.node(request)?.clone(),
                cost: edge.distance(),
            });
        }
        Ok(pairs)
    }

    fn check_sizes(&self, mode: Termination) -> Result<()> {
        let servers = self.graph.server_count();
        let requests = self.graph.request_count();
        if servers == 0 || requests == 0 {
            return Err(MatchingError::EmptyInput);
        }
        let fits = match mode {
            Termination::Perfect => servers == requests,
            Termination::RequestsOnly => servers >= requests,
        };
        if !fits {
            return Err(MatchingError::SizeMismatch { servers, requests });
        }
        Ok(())
    }

    fn solve(&mut self, mode: Termination) -> Result<Vec<EdgeId>> {
        self.set_initial_potentials()?;
        let bound = self.config.iteration_bound(self.graph.request_count());
        let mut iteration = 0;

        while !self.is_done(mode) {
            if iteration >= bound {
                return Err(MatchingError::NonTermination {
                    iterations: iteration,
                });
            }
            iteration += 1;

            let paths = shortest_paths(&self.graph)?;
            let (request, mut path) = self.min_path_to_sink(&paths, iteration)?;
            let sink_edge = self
                .graph
                .find_edge(request, NodeId::Sink)
                .ok_or_else(|| malformed(format!("{request:?} has no edge to the sink")))?;
            path.push(sink_edge);
            debug!(iteration, ?request, len = path.len(), "augmenting");

            self.augment(&path)?;
            self.update_potentials(&paths)?;
        }

        Ok(self.matching.iter().copied().collect())
    }

    fn is_done(&self, mode: Termination) -> bool {
        let requests_done = self.graph.requests().all(|(_, y)| y.matched);
        match mode {
            Termination::Perfect => requests_done && self.graph.servers().all(|(_, x)| x.matched),
            Termination::RequestsOnly => requests_done,
        }
    }

    /// Each request starts at the cheapest edge entering it; servers at 0.
    fn set_initial_potentials(&mut self) -> Result<()> {
        let mut cheapest: BTreeMap<NodeId, f64> = BTreeMap::new();
        for (_, edge) in self.graph.edges().filter(|(_, e)| !e.is_sink_edge()) {
            if let NodeId::Request(_) = edge.end() {
                let entry = cheapest.entry(edge.end()).or_insert(f64::INFINITY);
                *entry = entry.min(edge.distance());
            }
        }
        let requests: Vec<NodeId> = self
            .graph
            .requests()
            .map(|(i, _)| NodeId::Request(i))
            .collect();
        for id in requests {
            let potential = cheapest.get(&id).copied().unwrap_or(0.);
            self.graph.node_mut(id)?.potential = potential;
        }
        Ok(())
    }

    /// Unmatched request with the smallest true distance from the source,
    /// i.e. label plus potential.
    fn min_path_to_sink(
        &self,
        paths: &BTreeMap<NodeId, PathInfo>,
        iteration: usize,
    ) -> Result<(NodeId, Vec<EdgeId>)> {
        let mut best: Option<(f64, NodeId, &PathInfo)> = None;
        for (i, y) in self.graph.requests() {
            if y.matched {
                continue;
            }
            let id = NodeId::Request(i);
            let Some(info) = paths.get(&id) else { continue };
            let total = info.distance + y.potential;
            if best.map_or(true, |(b, _, _)| total < b) {
                best = Some((total, id, info));
            }
        }
        // no unmatched request can be reached, so no augmentation is possible
        let (_, id, info) = best.ok_or(MatchingError::NonTermination {
            iterations: iteration,
        })?;
        Ok((id, info.path.clone()))
    }

    fn augment(&mut self, path: &[EdgeId]) -> Result<()> {
        for &id in path {
            let edge = self.graph.edge(id)?;
            if edge.is_source_edge() || edge.is_sink_edge() {
                self.graph.invert(id)?;
            } else if self.matching.remove(&id) {
                // undo an earlier pairing, edge points forward again
                self.graph.invert(id)?;
            } else {
                let (tail, head) = (edge.source(), edge.end());
                self.graph.node_mut(tail)?.matched = true;
                self.graph.node_mut(head)?.matched = true;
                self.graph.invert(id)?;
                self.matching.insert(id);
            }
        }
        Ok(())
    }

    fn update_potentials(&mut self, paths: &BTreeMap<NodeId, PathInfo>) -> Result<()> {
        for (&id, info) in paths {
            if matches!(id, NodeId::Server(_) | NodeId::Request(_)) {
                self.graph.node_mut(id)?.potential += info.distance;
            }
        }
        Ok(())
    }
}

/// Offline minimum total cost perfect matching of equal sized point sets.
pub fn min_cost_matching(servers: &[Point], requests: &[Point]) -> Result<Vec<Pair>> {
    let mut matcher = MinCostMatcher::new(BipartiteGraph::from_points(servers, requests));
    matcher.run()?;
    matcher.pairs()
}
