use std::collections::BTreeSet;

use tracing::info;

use crate::config::MatcherConfig;
use crate::error::{malformed, MatchingError, Result};
use crate::graph::{BipartiteGraph, NodeId};
use crate::min_cost::MinCostMatcher;
use crate::point::{Pair, Point};

/// Online permutation matching.
///
/// Each arriving request triggers an offline optimal matching of every
/// request seen so far against all servers. The one server in that matching
/// that has not been committed yet is paired with the new request for good.
/// See Khuller, Mitchell and Vazirani, "On-line algorithms for weighted
/// bipartite matching and stable marriages".
#[derive(Debug, Clone)]
pub struct IncrementalMatcher {
    matcher: MinCostMatcher,
    servers: Vec<Point>,
    committed: BTreeSet<usize>,
    commitments: Vec<Pair>,
}

impl IncrementalMatcher {
    pub fn new(servers: &[Point]) -> Result<Self> {
        Self::with_config(servers, MatcherConfig::default())
    }

    pub fn with_config(servers: &[Point], config: MatcherConfig) -> Result<Self> {
        if servers.is_empty() {
            return Err(MatchingError::EmptyInput);
        }
        let graph = BipartiteGraph::from_points(servers, &[]);
        Ok(Self {
            matcher: MinCostMatcher::with_config(graph, config),
            servers: servers.to_vec(),
            committed: BTreeSet::new(),
            commitments: Vec::new(),
        })
    }

    /// Pairs the arriving request with a server, irrevocably.
    pub fn arrive(&mut self, request: Point) -> Result<Pair> {
        let arrivals = self.commitments.len() + 1;
        if arrivals > self.servers.len() {
            return Err(MatchingError::SizeMismatch {
                servers: self.servers.len(),
                requests: arrivals,
            });
        }

        self.matcher.unmatch_request_nodes();
        self.matcher.add_request_node(request.clone(), arrivals);
        let matching = self.matcher.run_incomplete_set()?;

        let graph = self.matcher.graph();
        let mut fresh = None;
        for id in matching {
            if let (NodeId::Server(x), _) = graph.edge(id)?.endpoints() {
                if !self.committed.contains(&x) && fresh.map_or(true, |f| x < f) {
                    fresh = Some(x);
                }
            }
        }
        let server = fresh.ok_or_else(|| {
            malformed(format!("arrival {arrivals} matched no uncommitted server"))
        })?;
        let point = self
            .servers
            .get(server - 1)
            .ok_or_else(|| malformed(format!("no server with id {server}")))?;

        let pair = Pair::new(point.clone(), request);
        info!(
            arrival = arrivals,
            server = %pair.server.id,
            request = %pair.request.id,
            cost = pair.cost,
            "committed"
        );
        self.committed.insert(server);
        self.commitments.push(pair.clone());
        Ok(pair)
    }

    /// Committed pairs in arrival order.
    pub fn commitments(&self) -> &[Pair] {
        &self.commitments
    }

    pub fn into_commitments(self) -> Vec<Pair> {
        self.commitments
    }
}

/// Feeds `requests` one by one to an [`IncrementalMatcher`].
pub fn permutation_matching(servers: &[Point], requests: &[Point]) -> Result<Vec<Pair>> {
    if requests.is_empty() {
        return Err(MatchingError::EmptyInput);
    }
    let mut matcher = IncrementalMatcher::new(servers)?;
    for request in requests {
        matcher.arrive(request.clone())?;
    }
    Ok(matcher.into_commitments())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::min_cost::min_cost_matching;
    use crate::point::total_cost;

    fn points(prefix: &str, coords: &[(i32, i32)]) -> Vec<Point> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Point::new(format!("{prefix}{}", i + 1), x, y))
            .collect()
    }

    #[test]
    fn first_arrival_takes_nearest_server() {
        let servers = points("x", &[(0, 0), (10, 10), (4, 4)]);
        let mut matcher = IncrementalMatcher::new(&servers).unwrap();
        let pair = matcher.arrive(Point::new("y1", 5, 5)).unwrap();
        assert_eq!(pair.server.id, "x3");
        assert!((pair.cost - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn bad_instance_online_offline_gap() {
        let servers = points("x", &[(0, 0), (3, 0), (7, 0)]);
        let requests = points("y", &[(2, 0), (4, 0), (8, 0)]);

        let online = permutation_matching(&servers, &requests).unwrap();
        let ids: Vec<(&str, &str)> = online
            .iter()
            .map(|p| (p.server.id.as_str(), p.request.id.as_str()))
            .collect();
        assert_eq!(ids, vec![("x2", "y1"), ("x1", "y2"), ("x3", "y3")]);

        let offline = min_cost_matching(&servers, &requests).unwrap();
        // online pays 1 + 4 + 1, the offline optimum is 2 + 1 + 1
        assert!((total_cost(&online) - 6.).abs() < 1e-9);
        assert!((total_cost(&offline) - 4.).abs() < 1e-9);
    }

    #[test]
    fn commitments_never_change() {
        let servers = points("x", &[(0, 0), (4, 7), (9, 2), (3, 3), (6, 1), (1, 8)]);
        let requests = points("y", &[(9, 3), (7, 3), (5, 5), (0, 1), (2, 8), (6, 6)]);
        let mut matcher = IncrementalMatcher::new(&servers).unwrap();
        let mut seen: Vec<Pair> = Vec::new();
        for request in &requests {
            matcher.arrive(request.clone()).unwrap();
            assert_eq!(&matcher.commitments()[..seen.len()], &seen[..]);
            seen = matcher.commitments().to_vec();
        }

        let mut used: Vec<&str> = seen.iter().map(|p| p.server.id.as_str()).collect();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used.len(), servers.len());
        let offline = min_cost_matching(&servers, &requests).unwrap();
        assert!(total_cost(&seen) >= total_cost(&offline) - 1e-9);
    }

    #[test]
    fn spare_servers_are_allowed() {
        let servers = points("x", &[(0, 0), (5, 0), (10, 0)]);
        let requests = points("y", &[(9, 0)]);
        let pairs = permutation_matching(&servers, &requests).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].server.id, "x3");
    }

    #[test]
    fn too_many_arrivals() {
        let servers = points("x", &[(0, 0)]);
        let mut matcher = IncrementalMatcher::new(&servers).unwrap();
        matcher.arrive(Point::new("y1", 1, 1)).unwrap();
        assert_eq!(
            matcher.arrive(Point::new("y2", 2, 2)).unwrap_err(),
            MatchingError::SizeMismatch {
                servers: 1,
                requests: 2
            }
        );
        assert_eq!(matcher.commitments().len(), 1);
    }

    #[test]
    fn iteration_cap_reaches_the_oracle() {
        let servers = points("x", &[(0, 0), (5, 0)]);
        let mut matcher =
            IncrementalMatcher::with_config(&servers, MatcherConfig::with_max_iterations(0))
                .unwrap();
        assert_eq!(
            matcher.arrive(Point::new("y1", 1, 0)).unwrap_err(),
            MatchingError::NonTermination { iterations: 0 }
        );
        assert!(matcher.commitments().is_empty());
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(
            IncrementalMatcher::new(&[]).unwrap_err(),
            MatchingError::EmptyInput
        );
        assert_eq!(
            permutation_matching(&points("x", &[(0, 0)]), &[]).unwrap_err(),
            MatchingError::EmptyInput
        );
    }
}
