//! Utilities for parsing line based text formats using a [`DeferredReader`].
use std::{fmt, io};

use num_traits::{
    ops::checked::{CheckedAdd, CheckedMul},
    FromPrimitive, Zero,
};

use crate::DeferredReader;

/// Reason why [`accumulate_digit`] rejected a digit.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DigitError {
    /// The number parsed so far is `0`, so the digit would form a number with a leading zero.
    LeadingZero,
    /// Multiplying the number parsed so far by ten overflows.
    MulOverflow,
    /// Adding the digit overflows.
    AddOverflow,
}

/// Integer types that decimal numbers are parsed into.
pub trait Decimal: Zero + FromPrimitive + CheckedMul + CheckedAdd {
    /// Returns the value of an ASCII digit `b'0'..=b'9'`.
    fn from_ascii_digit(digit: u8) -> Self;
}

macro_rules! impl_decimal {
    ($($t:ty),*) => {
        $(
            impl Decimal for $t {
                #[inline]
                fn from_ascii_digit(digit: u8) -> Self {
                    debug_assert!(digit.is_ascii_digit());
                    (digit - b'0') as $t
                }
            }
        )*
    };
}

impl_decimal!(i16, u16, i32, u32, i64, u64, isize, usize);

/// Appends an ASCII decimal digit to a number, checking for overflow at every step.
///
/// The caller starts with the value of the first digit and passes each following digit. A number
/// starting with `0` is complete after that digit, appending further digits is reported as
/// [`DigitError::LeadingZero`].
#[inline]
pub fn accumulate_digit<I>(value: I, digit: u8) -> Result<I, DigitError>
where
    I: Decimal,
{
    if value.is_zero() {
        return Err(DigitError::LeadingZero);
    }
    let ten = I::from_u8(10).ok_or(DigitError::MulOverflow)?;
    let value = value.checked_mul(&ten).ok_or(DigitError::MulOverflow)?;
    value
        .checked_add(&I::from_ascii_digit(digit))
        .ok_or(DigitError::AddOverflow)
}

/// A syntax error for line based text formats.
#[derive(Debug)]
pub struct SyntaxError {
    /// The path of the input as shown to the user.
    pub path: String,
    /// The line containing the error, starting at `1`.
    pub line: u64,
    /// The error message.
    pub msg: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at line {} in '{}': {}",
            self.line, self.path, self.msg
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Wraps a [`DeferredReader`] to read single characters while tracking lines.
///
/// Carriage returns are squeezed out: a `'\r'` must be followed by `'\n'`, which is then returned
/// in its place. The line counter is incremented whenever a `'\n'` is returned, so an error
/// reported right after a newline refers to the following line.
pub struct LineCursor<'a> {
    /// The wrapped `DeferredReader`.
    pub reader: DeferredReader<'a>,
    line: u64,
    path: String,
}

impl<'a> LineCursor<'a> {
    /// Creates a `LineCursor` starting at line 1 of the input named `path`.
    pub fn new(reader: DeferredReader<'a>, path: impl Into<String>) -> Self {
        Self {
            reader,
            line: 1,
            path: path.into(),
        }
    }

    /// The current line, starting at `1`.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Total number of bytes read so far, including squeezed out carriage returns.
    #[inline]
    pub fn bytes(&self) -> u64 {
        self.reader.position()
    }

    /// The path of the input as used in error messages.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the next character.
    ///
    /// Returns `Ok(None)` at the end of the input, which includes the end of the data read before
    /// an IO error. Fails when a carriage return is not followed by a newline.
    #[inline]
    pub fn next<E>(&mut self) -> Result<Option<u8>, E>
    where
        E: From<io::Error> + From<SyntaxError>,
    {
        let mut byte = self.reader.next_byte();
        if byte == Some(b'\r') {
            byte = self.reader.next_byte();
            if byte != Some(b'\n') {
                return Err(self.give_up("expected new line after carriage return"));
            }
        }
        if byte == Some(b'\n') {
            self.line += 1;
        }
        Ok(byte)
    }

    /// Generate a syntax error at the current line.
    ///
    /// If the reader encountered an IO error, that error is returned instead, as it is the actual
    /// cause of the unexpected input.
    #[inline]
    pub fn give_up<E>(&mut self, msg: impl Into<String>) -> E
    where
        E: From<io::Error> + From<SyntaxError>,
    {
        self.give_up_cold(msg.into())
    }

    #[cold]
    #[inline(never)]
    fn give_up_cold<E>(&mut self, msg: String) -> E
    where
        E: From<io::Error> + From<SyntaxError>,
    {
        if let Err(err) = self.reader.check_io_error() {
            return err.into();
        }

        (SyntaxError {
            path: self.path.clone(),
            line: self.line,
            msg,
        })
        .into()
    }
}
