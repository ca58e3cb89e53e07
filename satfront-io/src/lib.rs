//! Streaming input for strict, single pass parsers of line based text formats.
//!
//! The parsers this crate is meant for read their input exactly once, character by character,
//! never backtrack and report the first unexpected character as a fatal error. Such a parser needs
//! little from its input layer, but it needs it to be cheap and precise:
//!
//! * _Deferred IO errors_: [`DeferredReader`] never fails when reading a byte. An IO error ends the
//!   available data, which forces the parser into a parse error. When generating that error,
//!   outside of the hot path, [`LineCursor::give_up`] checks for a stored IO error and reports it
//!   instead, so the user sees the actual cause.
//!
//! * _Location tracking_: [`LineCursor`] counts lines and bytes and knows the name of its input,
//!   which is all a user needs to find the offending line in a gigabyte sized file.
//!
//! * _Overflow checked numbers_: [`text::accumulate_digit`] builds decimal numbers digit by digit
//!   and reports which step would overflow, so that the parser can emit a precise message.

#![warn(missing_docs)]
mod deferred_reader;
pub mod text;

pub use deferred_reader::DeferredReader;
pub use text::{LineCursor, SyntaxError};
