use std::collections::VecDeque;

use nalgebra::{DMatrix, Dim, RawStorage, Scalar, SquareMatrix};
use tracing::debug;

use crate::error::{malformed, MatchingError, Result};
use crate::point::{Pair, Point};

/// A matched cell of a cost matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<T> {
    row: usize,
    col: usize,
    value: T,
}

impl<T: Copy> Allocation<T> {
    pub fn assignment(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn value(&self) -> T {
        self.value
    }
}

/// Dense `servers x requests` matrix of Euclidean distances.
pub fn cost_matrix(servers: &[Point], requests: &[Point]) -> Result<DMatrix<f64>> {
    if servers.is_empty() || requests.is_empty() {
        return Err(MatchingError::EmptyInput);
    }
    if servers.len() != requests.len() {
        return Err(MatchingError::SizeMismatch {
            servers: servers.len(),
            requests: requests.len(),
        });
    }
    Ok(DMatrix::from_fn(servers.len(), requests.len(), |i, j| {
        servers[i].distance(&requests[j])
    }))
}

/// Gross' optimal bottleneck assignment (1959): a perfect matching whose
/// largest cell is as small as possible. Allocations come back ordered by row.
pub fn bottleneck<T, D, S>(costs: &SquareMatrix<T, D, S>) -> Result<Vec<Allocation<T>>>
where
    T: Scalar + Copy + PartialOrd + num_traits::Bounded,
    D: Dim,
    S: RawStorage<T, D, D>,
{
    let n = costs.nrows();
    if n == 0 {
        return Err(MatchingError::EmptyInput);
    }

    // start from the diagonal
    let mut row_match: Vec<usize> = (0..n).collect();
    let mut col_match: Vec<usize> = (0..n).collect();

    let bound = n.saturating_mul(n).saturating_mul(n).saturating_add(n);
    for round in 0..bound {
        let mut worst = Allocation {
            row: 0,
            col: row_match[0],
            value: <T as num_traits::Bounded>::min_value(),
        };
        for (row, &col) in row_match.iter().enumerate() {
            let value = costs[(row, col)];
            if value > worst.value {
                worst = Allocation { row, col, value };
            }
        }

        // column of the checked cell in each row
        let mut row_checked: Vec<Option<usize>> = vec![None; n];
        // columns that are, or were, on the frontier
        let mut seen_cols = vec![false; n];
        let mut frontier = VecDeque::from([worst.col]);
        seen_cols[worst.col] = true;

        let mut closing_row = None;
        while let Some(&col) = frontier.front() {
            let candidate = (0..n).find(|&row| {
                row_match[row] != col
                    && row_checked[row].is_none()
                    && costs[(row, col)] < worst.value
            });
            let Some(row) = candidate else {
                // exhausted
                frontier.pop_front();
                continue;
            };
            row_checked[row] = Some(col);
            let next = row_match[row];
            if seen_cols[next] {
                // only the bottleneck column can be seen twice, so `row` is the
                // bottleneck row and the chain is closed
                closing_row = Some(row);
                break;
            }
            seen_cols[next] = true;
            frontier.push_back(next);
        }

        let Some(start) = closing_row else {
            debug!(round, "bottleneck assignment optimal");
            return Ok(row_match
                .iter()
                .enumerate()
                .map(|(row, &col)| Allocation {
                    row,
                    col,
                    value: costs[(row, col)],
                })
                .collect());
        };

        substitute_chain(start, &row_checked, &mut row_match, &mut col_match)?;
        debug!(round, row = worst.row, col = worst.col, "replaced bottleneck cell");
    }

    Err(MatchingError::NonTermination { iterations: bound })
}

/// Moves each row on the closed chain from its matched cell to its checked
/// cell, walking back from `start` until the column vacated by `start` is
/// refilled.
fn substitute_chain(
    start: usize,
    row_checked: &[Option<usize>],
    row_match: &mut [usize],
    col_match: &mut [usize],
) -> Result<()> {
    let mut row = start;
    for _ in 0..row_match.len() {
        let col = row_checked[row]
            .ok_or_else(|| malformed(format!("row {row} on the chain has no checked cell")))?;
        let displaced = col_match[col];
        row_match[row] = col;
        col_match[col] = row;
        if displaced == start {
            return Ok(());
        }
        row = displaced;
    }
    Err(malformed("chain substitution did not close"))
}

/// Bottleneck assignment of equal sized point sets, ordered by server.
pub fn bottleneck_matching(servers: &[Point], requests: &[Point]) -> Result<Vec<Pair>> {
    let costs = cost_matrix(servers, requests)?;
    let allocations = bottleneck(&costs)?;
    Ok(allocations
        .iter()
        .map(|a| {
            let (row, col) = a.assignment();
            Pair {
                server: servers[row].clone(),
                request: requests[col].clone(),
                cost: a.value(),
            }
        })
        .collect())
}
