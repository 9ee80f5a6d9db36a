use std::collections::BTreeMap;
use std::fmt;

use crate::error::{malformed, Result};
use crate::point::Point;

/// Handle of a node in a [`BipartiteGraph`].
///
/// The derived ordering (`Source < Sink < Server < Request`, then by index)
/// is the tie-break used by the shortest path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    Source,
    Sink,
    Server(usize),
    Request(usize),
}

/// Index of an edge in the graph's edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source_id: NodeId,
    end_id: NodeId,
    distance: f64,
    is_forward: bool,
    is_source_edge: bool,
    is_sink_edge: bool,
}

impl Edge {
    fn new(source_id: NodeId, end_id: NodeId, distance: f64) -> Self {
        Self {
            source_id,
            end_id,
            distance,
            is_forward: true,
            is_source_edge: source_id == NodeId::Source,
            is_sink_edge: end_id == NodeId::Sink,
        }
    }

    /// Current tail, following the orientation.
    pub fn source(&self) -> NodeId {
        self.source_id
    }

    /// Current head, following the orientation.
    pub fn end(&self) -> NodeId {
        self.end_id
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn is_forward(&self) -> bool {
        self.is_forward
    }

    pub fn is_source_edge(&self) -> bool {
        self.is_source_edge
    }

    pub fn is_sink_edge(&self) -> bool {
        self.is_sink_edge
    }

    /// `(server side, request side)` endpoints regardless of orientation.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        if self.is_forward {
            (self.source_id, self.end_id)
        } else {
            (self.end_id, self.source_id)
        }
    }

    pub fn invert(&mut self) {
        std::mem::swap(&mut self.source_id, &mut self.end_id);
        self.is_forward = !self.is_forward;
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "E {:?} -> {:?} dist <{}>",
            self.source_id, self.end_id, self.distance
        )?;
        if !self.is_forward {
            write!(f, " BACKWARDS EDGE")?;
        }
        Ok(())
    }
}

/// Best known distance from the source and the edges realising it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathInfo {
    pub distance: f64,
    pub path: Vec<EdgeId>,
}

/// Servers (`X`) and requests (`Y`) joined by weighted directed edges, plus a
/// synthetic source feeding every server and a sink fed by every request.
#[derive(Debug, Clone)]
pub struct BipartiteGraph {
    x_nodes: BTreeMap<usize, Point>,
    y_nodes: BTreeMap<usize, Point>,
    source: Point,
    sink: Point,
    edges: Vec<Edge>,
}

impl Default for BipartiteGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl BipartiteGraph {
    pub fn new() -> Self {
        Self {
            x_nodes: BTreeMap::new(),
            y_nodes: BTreeMap::new(),
            source: Point::new("src", -1, -1),
            sink: Point::new("sink", -1, -1),
            edges: Vec::new(),
        }
    }

    /// Complete bipartite graph with servers and requests numbered from 1 in
    /// input order, every pair joined by its Euclidean distance.
    pub fn from_points(servers: &[Point], requests: &[Point]) -> Self {
        let mut graph = Self::new();
        for (i, server) in servers.iter().enumerate() {
            graph.add_server(i + 1, server.clone());
        }
        for (j, request) in requests.iter().enumerate() {
            graph.add_request(j + 1, request.clone());
        }
        for (i, server) in servers.iter().enumerate() {
            for (j, request) in requests.iter().enumerate() {
                graph.add_edge(i + 1, j + 1, server.distance(request));
            }
        }
        graph
    }

    /// Inserts a server together with its source edge.
    pub fn add_server(&mut self, id: usize, point: Point) {
        self.x_nodes.insert(id, point);
        self.add_edge_from_source(id);
    }

    /// Inserts a request together with its sink edge.
    pub fn add_request(&mut self, id: usize, point: Point) {
        self.y_nodes.insert(id, point);
        self.add_edge_to_sink(id);
    }

    pub fn add_edge(&mut self, from_x: usize, to_y: usize, distance: f64) -> EdgeId {
        self.push(Edge::new(
            NodeId::Server(from_x),
            NodeId::Request(to_y),
            distance,
        ))
    }

    pub fn add_edge_from_source(&mut self, to_x: usize) -> EdgeId {
        self.push(Edge::new(NodeId::Source, NodeId::Server(to_x), 0.))
    }

    pub fn add_edge_to_sink(&mut self, from_y: usize) -> EdgeId {
        self.push(Edge::new(NodeId::Request(from_y), NodeId::Sink, 0.))
    }

    fn push(&mut self, edge: Edge) -> EdgeId {
        self.edges.push(edge);
        EdgeId(self.edges.len() - 1)
    }

    /// Edge currently oriented `a -> b`, if any.
    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.edges
            .iter()
            .position(|e| e.source_id == a && e.end_id == b)
            .map(EdgeId)
    }

    pub fn invert(&mut self, id: EdgeId) -> Result<()> {
        self.edges
            .get_mut(id.0)
            .ok_or_else(|| malformed(format!("unknown edge {}", id.0)))?
            .invert();
        Ok(())
    }

    /// Orients every edge forward again.
    pub fn reset_orientation(&mut self) {
        self.edges
            .iter_mut()
            .filter(|e| !e.is_forward)
            .for_each(Edge::invert);
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges
            .get(id.0)
            .ok_or_else(|| malformed(format!("unknown edge {}", id.0)))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn server_count(&self) -> usize {
        self.x_nodes.len()
    }

    pub fn request_count(&self) -> usize {
        self.y_nodes.len()
    }

    pub fn servers(&self) -> impl Iterator<Item = (usize, &Point)> {
        self.x_nodes.iter().map(|(&i, p)| (i, p))
    }

    pub fn requests(&self) -> impl Iterator<Item = (usize, &Point)> {
        self.y_nodes.iter().map(|(&i, p)| (i, p))
    }

    pub(crate) fn x_nodes_mut(&mut self) -> impl Iterator<Item = &mut Point> {
        self.x_nodes.values_mut()
    }

    pub(crate) fn y_nodes_mut(&mut self) -> impl Iterator<Item = &mut Point> {
        self.y_nodes.values_mut()
    }

    /// Every node handle in ascending order, source and sink included.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.x_nodes.len() + self.y_nodes.len() + 2);
        ids.push(NodeId::Source);
        ids.push(NodeId::Sink);
        ids.extend(self.x_nodes.keys().map(|&i| NodeId::Server(i)));
        ids.extend(self.y_nodes.keys().map(|&i| NodeId::Request(i)));
        ids
    }

    pub fn node(&self, id: NodeId) -> Result<&Point> {
        match id {
            NodeId::Source => Ok(&self.source),
            NodeId::Sink => Ok(&self.sink),
            NodeId::Server(i) => self
                .x_nodes
                .get(&i)
                .ok_or_else(|| malformed(format!("no server with id {i}"))),
            NodeId::Request(i) => self
                .y_nodes
                .get(&i)
                .ok_or_else(|| malformed(format!("no request with id {i}"))),
        }
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Point> {
        match id {
            NodeId::Source => Ok(&mut self.source),
            NodeId::Sink => Ok(&mut self.sink),
            NodeId::Server(i) => self
                .x_nodes
                .get_mut(&i)
                .ok_or_else(|| malformed(format!("no server with id {i}"))),
            NodeId::Request(i) => self
                .y_nodes
                .get_mut(&i)
                .ok_or_else(|| malformed(format!("no request with id {i}"))),
        }
    }

    /// Reduced cost of an edge under the current potentials.
    ///
    /// Source and sink edges keep their raw distance. A real edge costs
    /// `distance` when forward and `-distance` when inverted, shifted by
    /// `potential(tail) - potential(head)`.
    pub fn adjusted_distance(&self, id: EdgeId) -> Result<f64> {
        let edge = self.edge(id)?;
        if edge.is_source_edge || edge.is_sink_edge {
            return Ok(edge.distance);
        }
        let signed = if edge.is_forward {
            edge.distance
        } else {
            -edge.distance
        };
        let tail = self.node(edge.source_id)?.potential;
        let head = self.node(edge.end_id)?.potential;
        Ok(signed + tail - head)
    }
}
