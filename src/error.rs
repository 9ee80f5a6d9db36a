use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchingError {
    #[error("server and request sets differ in size ({servers} servers, {requests} requests)")]
    SizeMismatch { servers: usize, requests: usize },

    #[error("server or request set is empty")]
    EmptyInput,

    /// An id the solver expected to resolve is missing from the graph or
    /// matrix bookkeeping.
    #[error("malformed graph: {0}")]
    GraphMalformed(String),

    #[error("solver did not terminate within {iterations} iterations")]
    NonTermination { iterations: usize },
}

pub type Result<T> = std::result::Result<T, MatchingError>;

pub(crate) fn malformed(what: impl Into<String>) -> MatchingError {
    MatchingError::GraphMalformed(what.into())
}
