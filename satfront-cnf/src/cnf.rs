//! Strict parsing of the DIMACS CNF file format.
//!
//! The parser reads its input exactly once and stops at the first violation of the format. It
//! checks that the header is present, that all numbers fit their types (32-bit signed for
//! variables and literals, 64-bit unsigned for the clause count), that every literal is within
//! the declared variable range and that exactly the declared number of clauses is present.
use std::io::Read;

use satfront_io::{
    text::{accumulate_digit, Decimal, DigitError},
    DeferredReader, LineCursor,
};

use crate::{error::ParseError, ClauseSink};

/// Header data of a DIMACS CNF file.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Header {
    /// Largest variable index that may occur in a literal.
    pub var_count: i32,
    /// Exact number of clauses present in the formula.
    pub clause_count: u64,
}

/// Error messages for the three ways of rejecting a digit of a number.
struct Digits {
    leading_zero: &'static str,
    way_too_big: &'static str,
    too_big: &'static str,
}

const VARIABLE_DIGITS: Digits = Digits {
    leading_zero: "invalid digit after '0' while parsing maximum variable",
    way_too_big: "maximum variable number way too big",
    too_big: "maximum variable number too big",
};

const CLAUSE_DIGITS: Digits = Digits {
    leading_zero: "invalid digit after '0' while parsing number of clauses",
    way_too_big: "way too many clauses specified",
    too_big: "too many clauses specified",
};

const LITERAL_DIGITS: Digits = Digits {
    leading_zero: "invalid digit after '0' in number",
    way_too_big: "number way too large",
    too_big: "number too large",
};

/// Where the body loop continues after a literal or whitespace.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Body {
    Token,
    Comment,
}

/// Parser for the DIMACS CNF file format.
///
/// Creating a parser parses the header. The body is then parsed by
/// [`parse_clauses`][Self::parse_clauses], which streams the literals into a [`ClauseSink`].
pub struct Parser<'a> {
    cursor: LineCursor<'a>,
    header: Header,
    clause_count: u64,
}

impl<'a> Parser<'a> {
    /// Creates a parser reading from a [`Read`] instance named `path` in error messages.
    pub fn from_read(read: impl Read + 'a, path: impl Into<String>) -> Result<Self, ParseError> {
        Self::new(LineCursor::new(DeferredReader::from_read(read), path))
    }

    /// Creates a parser reading from a boxed [`Read`] instance named `path` in error messages.
    #[inline(never)]
    pub fn from_boxed_dyn_read(
        read: Box<dyn Read + 'a>,
        path: impl Into<String>,
    ) -> Result<Self, ParseError> {
        Self::new(LineCursor::new(
            DeferredReader::from_boxed_dyn_read(read),
            path,
        ))
    }

    /// Creates a parser reading from a [`LineCursor`] and parses the header.
    pub fn new(cursor: LineCursor<'a>) -> Result<Self, ParseError> {
        let mut new = Self {
            cursor,
            header: Header {
                var_count: 0,
                clause_count: 0,
            },
            clause_count: 0,
        };
        new.header = new.parse_header()?;
        Ok(new)
    }

    /// Returns the parsed header.
    pub fn header(&self) -> Header {
        self.header
    }

    /// Number of clauses parsed so far.
    pub fn clause_count(&self) -> u64 {
        self.clause_count
    }

    /// Number of bytes read so far.
    pub fn bytes(&self) -> u64 {
        self.cursor.bytes()
    }

    /// Current line number, starting at `1`.
    pub fn line(&self) -> u64 {
        self.cursor.line()
    }

    /// The path of the input as used in error messages.
    pub fn path(&self) -> &str {
        self.cursor.path()
    }

    #[inline]
    fn next(&mut self) -> Result<Option<u8>, ParseError> {
        self.cursor.next()
    }

    fn expect(&mut self, byte: u8, msg: &str) -> Result<(), ParseError> {
        if self.next()? == Some(byte) {
            Ok(())
        } else {
            Err(self.cursor.give_up(msg))
        }
    }

    fn skip_blanks(&mut self) -> Result<Option<u8>, ParseError> {
        loop {
            match self.next()? {
                Some(b' ' | b'\t') => continue,
                ch => return Ok(ch),
            }
        }
    }

    /// Reads the remaining digits of a number starting with `first`.
    ///
    /// Returns the number and the character following it.
    fn number<I>(&mut self, first: u8, digits: &Digits) -> Result<(I, Option<u8>), ParseError>
    where
        I: Decimal,
    {
        let mut value = I::from_ascii_digit(first);
        loop {
            match self.next()? {
                Some(digit @ b'0'..=b'9') => {
                    value = accumulate_digit(value, digit).map_err(|err| {
                        self.cursor.give_up::<ParseError>(match err {
                            DigitError::LeadingZero => digits.leading_zero,
                            DigitError::MulOverflow => digits.way_too_big,
                            DigitError::AddOverflow => digits.too_big,
                        })
                    })?;
                }
                ch => return Ok((value, ch)),
            }
        }
    }

    fn skip_comment(&mut self, eof_msg: &str) -> Result<(), ParseError> {
        loop {
            match self.next()? {
                Some(b'\n') => return Ok(()),
                Some(_) => continue,
                None => return Err(self.cursor.give_up(eof_msg)),
            }
        }
    }

    fn parse_header(&mut self) -> Result<Header, ParseError> {
        let mut ch = self.next()?;
        while ch == Some(b'c') {
            self.skip_comment("unexpected end-of-file in header comment")?;
            ch = self.next()?;
        }
        if ch != Some(b'p') {
            return Err(self.cursor.give_up("expected 'p' or 'c'"));
        }
        self.expect(b' ', "expected space after 'p'")?;
        self.expect(b'c', "expected 'c' after 'p '")?;
        self.expect(b'n', "expected 'n' after 'p c'")?;
        self.expect(b'f', "expected 'f' after 'p cn'")?;
        self.expect(b' ', "expected space after 'p cnf'")?;

        let Some(first @ b'0'..=b'9') = self.skip_blanks()? else {
            return Err(self.cursor.give_up("expected digit after 'p cnf '"));
        };
        let (var_count, ch) = self.number::<i32>(first, &VARIABLE_DIGITS)?;
        if ch != Some(b' ') {
            return Err(self
                .cursor
                .give_up(format!("expected space after 'p cnf {var_count}'")));
        }

        let Some(first @ b'0'..=b'9') = self.skip_blanks()? else {
            return Err(self
                .cursor
                .give_up(format!("expected digit after 'p cnf {var_count} '")));
        };
        let (clause_count, mut ch) = self.number::<u64>(first, &CLAUSE_DIGITS)?;
        if matches!(ch, Some(b' ' | b'\t')) {
            ch = self.skip_blanks()?;
        }
        if ch != Some(b'\n') {
            return Err(self.cursor.give_up(format!(
                "expected new line after 'p cnf {var_count} {clause_count}'"
            )));
        }

        Ok(Header {
            var_count,
            clause_count,
        })
    }

    /// Parses the clauses following the header, forwarding each literal to `sink`.
    ///
    /// Every literal, including the `0` terminating a clause, is added as soon as it is parsed.
    /// On success the input was read to its end and contained exactly the declared number of
    /// clauses, which is returned. On failure the literals added so far stay added.
    pub fn parse_clauses<S>(&mut self, sink: &mut S) -> Result<u64, ParseError>
    where
        S: ClauseSink + ?Sized,
    {
        let mut lit: i32 = 0;
        let mut state = Body::Token;

        loop {
            if state == Body::Comment {
                self.skip_comment("unexpected end-of-file in comment")?;
                state = Body::Token;
            }

            let (negative, first) = match self.next()? {
                None => break,
                Some(b' ' | b'\t' | b'\n') => continue,
                Some(b'c') => {
                    state = Body::Comment;
                    continue;
                }
                Some(b'-') => match self.next()? {
                    Some(digit @ b'0'..=b'9') => (true, digit),
                    _ => return Err(self.cursor.give_up("expected digit after '-'")),
                },
                Some(digit @ b'0'..=b'9') => (false, digit),
                Some(_) => return Err(self.cursor.give_up("expected number")),
            };

            if self.clause_count == self.header.clause_count {
                return Err(self.cursor.give_up("more clauses than specified"));
            }

            let (magnitude, ch) = self.number::<i32>(first, &LITERAL_DIGITS)?;
            lit = if negative { -magnitude } else { magnitude };

            match ch {
                None | Some(b' ' | b'\t' | b'\n' | b'c') => {}
                Some(_) => {
                    return Err(self
                        .cursor
                        .give_up(format!("unexpected character after '{lit}'")))
                }
            }

            if lit.unsigned_abs() > self.header.var_count.unsigned_abs() {
                return Err(self.cursor.give_up(format!(
                    "literal '{lit}' exceeds maximum variable index '{}'",
                    self.header.var_count
                )));
            }

            if lit == 0 {
                self.clause_count += 1;
            }
            sink.add_lit(lit);

            match ch {
                // A comment may directly follow a literal, as in `1c comment`.
                Some(b'c') => state = Body::Comment,
                None => break,
                _ => {}
            }
        }

        if lit != 0 {
            return Err(self
                .cursor
                .give_up(format!("terminating zero after literal '{lit}' missing")));
        }

        if self.clause_count < self.header.clause_count {
            let missing = self.header.clause_count - self.clause_count;
            return Err(if missing == 1 {
                self.cursor.give_up("single clause missing")
            } else {
                self.cursor.give_up(format!("{missing} clauses missing"))
            });
        }

        self.cursor.reader.check_io_error()?;

        Ok(self.clause_count)
    }
}

/// Parses a complete DIMACS CNF input, forwarding all literals to `sink`.
pub fn parse<S>(
    read: impl Read,
    path: impl Into<String>,
    sink: &mut S,
) -> Result<Header, ParseError>
where
    S: ClauseSink + ?Sized,
{
    let mut parser = Parser::from_read(read, path)?;
    parser.parse_clauses(sink)?;
    Ok(parser.header())
}
