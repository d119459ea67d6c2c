//! Defines the `Error` type for the probnet library

use thiserror::Error;

use std::result;

pub type Result<T> = result::Result<T, ProbNetError>;

#[derive(Clone, Debug, PartialEq, Error)]
#[non_exhaustive]
pub enum ProbNetError {

    /// The network does not satisfy a structural precondition of the requested algorithm.
    #[error("network cannot be evaluated: {0}")]
    NotEvaluableNetwork(String),

    /// The evidence has zero probability under the network.
    #[error("incompatible evidence: {0}")]
    IncompatibleEvidence(String),

    /// A potential cannot be turned into a table without more context
    #[error("potential cannot be projected: {0}")]
    NonProjectablePotential(String),

    /// The potential was asked to project under a criterion it does not support
    #[error("wrong criterion: {0}")]
    WrongCriterion(String),

    /// Normalization of a potential whose values sum to exactly zero
    #[error("attempted to normalize a vector of zeros")]
    NormalizeZeroVector,

    /// A parameter array or argument was malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant of an inference engine was broken. This is a bug.
    #[error("unexpected inference failure: {0}")]
    UnexpectedInference(String),

    /// A node or variable with the given name is not in the network
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    #[error("variable encountered twice: {0}")]
    DuplicateVariable(String),

    /// Represents an error where a certain constraint on a scope was not satisfied
    #[error("scope did not satisfy constraints: {0}")]
    InvalidScope(String),

    /// A state index outside the range of the variable
    #[error("state {state} is out of range for variable {variable}")]
    InvalidState { variable: String, state: usize },

    /// A link would close a directed cycle
    #[error("link would create a cycle through {0}")]
    CyclicNetwork(String),

    /// Exactly what it sounds like
    #[error("encountered division by zero")]
    DivideByZero,

    /// Represents an incomplete assignment where a complete assignment was required.
    #[error("missing assignment to {0}")]
    IncompleteAssignment(String),

    /// The inference was cancelled through its `CancellationToken`
    #[error("inference cancelled")]
    Cancelled,

}
