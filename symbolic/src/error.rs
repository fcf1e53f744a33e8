//! Error types for the **rsm-symbolic** crate.

use thiserror::Error;

/// Errors surfaced to the caller of the symbolic engine. There is no
/// retry logic and no partial-failure recovery here — a parser error or
/// an unimplemented integration case is simply returned. Differentiation
/// has no unimplemented case: [`crate::Expression::differentiate`] is
/// exhaustive over every operator and function and always succeeds.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Parentheses did not balance.
    #[error("mismatched parentheses")]
    MismatchedParentheses,

    /// A token was neither a number, identifier, operator, nor paren.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The shunting-yard output did not reduce to a single expression.
    #[error("invalid expression")]
    InvalidExpression,

    /// Integration has no rule covering this expression shape.
    #[error("integration not implemented: {0}")]
    IntegrationNotImplemented(String),
}

pub type Result<T> = core::result::Result<T, Error>;
