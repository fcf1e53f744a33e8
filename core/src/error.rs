//! Error types for the **rsm-core** crate.
//!
//! All fallible operations in this crate return [`crate::Result`], a
//! convenient alias for `core::result::Result<T, Error>`. `Ledger::append`
//! is the one notable exception: per the ledger's contract it reports
//! validity as a `bool` rather than a `Result` (see [`crate::ledger::Ledger::append`]).
//!
//! # Examples
//!
//! ```
//! use rsm_core::{Error, Result};
//!
//! fn demo_fn(fail: bool) -> Result<()> {
//!     if fail {
//!         Err(Error::OutOfGas)
//!     } else {
//!         Ok(())
//!     }
//! }
//! ```

use thiserror::Error;

/// Errors raised while executing a [`crate::vm::Vm`] program.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// The next instruction would push `gas_used` past `gas_limit`.
    #[error("out of gas")]
    OutOfGas,

    /// The opcode token is not one of the machine's recognised instructions.
    #[error("invalid opcode: {0}")]
    InvalidOpcode(String),

    /// A `PUSH` instruction's operand could not be parsed as an integer.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    /// An operation needed more values on the stack than were available.
    #[error("stack underflow")]
    StackUnderflow,

    /// `DIV` was attempted with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
