use std::fmt;

use serde::{Deserialize, Serialize};

/// A labelled point on the integer plane.
///
/// `potential` and `matched` are scratch state owned by whichever solver
/// currently holds the point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub potential: f64,
    #[serde(default)]
    pub matched: bool,
}

impl Point {
    pub fn new(id: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            potential: 0.,
            matched: false,
        }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N id({}) at ({},{})", self.id, self.x, self.y)
    }
}

/// A committed server/request pairing and its Euclidean cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub server: Point,
    pub request: Point,
    pub cost: f64,
}

impl Pair {
    pub fn new(server: Point, request: Point) -> Self {
        let cost = server.distance(&request);
        Self {
            server,
            request,
            cost,
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match: Server {} and Request {}. Distance: {:.3}",
            self.server, self.request, self.cost
        )
    }
}

pub fn total_cost(pairs: &[Pair]) -> f64 {
    pairs.iter().map(|p| p.cost).sum()
}

/// Largest single cost, `0` for an empty assignment.
pub fn max_cost(pairs: &[Pair]) -> f64 {
    pairs.iter().map(|p| p.cost).fold(0., f64::max)
}
