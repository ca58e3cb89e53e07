//! Writing of satisfying assignments as SAT competition value lines.
//!
//! A witness consists of `v` lines listing the value of every variable as a signed literal,
//! followed by a terminating `0`. Each line, including the `v` prefix, is at most
//! [`LINE_LIMIT`] characters long.
use std::io::{self, Write};

/// Maximal length of a value line including its `v` prefix (and excluding the newline).
pub const LINE_LIMIT: usize = 78;

/// Buffers values into `v` lines of at most [`LINE_LIMIT`] characters.
pub struct WitnessWriter<W: Write> {
    out: W,
    // Rendered line without the `v` prefix, each value prefixed by a space.
    buf: [u8; LINE_LIMIT + 2],
    len: usize,
}

impl<W: Write> WitnessWriter<W> {
    /// Creates a writer emitting lines to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            buf: [0; LINE_LIMIT + 2],
            len: 0,
        }
    }

    /// Appends a value, first emitting the buffered line if the value would not fit.
    pub fn value(&mut self, value: i32) -> io::Result<()> {
        // " -2147483648" is the longest rendering.
        let mut tmp = [0u8; 12];
        tmp[0] = b' ';
        let digits = itoap::write(&mut tmp[1..], value)?;
        let rendered = &tmp[..1 + digits];

        if self.len + rendered.len() > LINE_LIMIT - 1 {
            self.flush_line()?;
        }
        debug_assert!(self.len < self.buf.len());
        self.buf[self.len..self.len + rendered.len()].copy_from_slice(rendered);
        self.len += rendered.len();
        Ok(())
    }

    fn flush_line(&mut self) -> io::Result<()> {
        if self.len == 0 {
            return Ok(());
        }
        self.out.write_all(b"v")?;
        self.out.write_all(&self.buf[..self.len])?;
        self.out.write_all(b"\n")?;
        self.len = 0;
        Ok(())
    }

    /// Emits the buffered partial line and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush_line()?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Writes `values` followed by the terminating `0` as value lines.
pub fn write_witness<W: Write>(out: W, values: impl IntoIterator<Item = i32>) -> io::Result<W> {
    let mut writer = WitnessWriter::new(out);
    for value in values {
        writer.value(value)?;
    }
    writer.value(0)?;
    writer.finish()
}
