//! This crate contains a strict streaming parser for the DIMACS CNF file format and a writer for
//! satisfying assignments in the SAT competition output format.
//!
//! See the [`cnf`] module for the parser and the [`witness`] module for the writer.

#![warn(missing_docs)]
pub mod cnf;
mod error;
mod sink;
pub mod witness;

pub use error::{InnerParseError, ParseError, SyntaxError};
pub use sink::{ClauseSink, Clauses};
