use std::io::{self, BufReader, Cursor, Read};

/// A buffered reader with deferred error checking, optimized for byte-at-a-time parsing.
///
/// Like `std`'s [`BufReader`], this coalesces many small reads into fewer larger reads of the
/// underlying data source. Unlike it, reading a byte never fails: an IO error ends the available
/// data and is stored until it is retrieved via [`check_io_error`][Self::check_io_error]. A parser
/// built on top of this sees an IO error as a premature end of the input, which forces a parse
/// error, at which point the stored IO error can be reported instead.
pub struct DeferredReader<'a> {
    read: Box<dyn Read + 'a>,
    buf: Vec<u8>,
    // `buf[pos_in_buf..end_of_buf]` is the unread buffered data
    pos_in_buf: usize,
    end_of_buf: usize,
    complete: bool,
    io_error: Option<io::Error>,
    consumed: u64,
    chunk_size: usize,
}

impl<'a> DeferredReader<'a> {
    const DEFAULT_CHUNK_SIZE: usize = 16 << 10;

    /// Creates a [`DeferredReader`] for the data of a [`BufReader`].
    pub fn from_buf_reader(buf_reader: BufReader<impl Read + 'a>) -> Self {
        // Avoid double buffering without discarding any already buffered contents.
        let buf_data = buf_reader.buffer().to_vec();
        if buf_data.is_empty() {
            Self::from_read(buf_reader.into_inner())
        } else {
            Self::from_read(Cursor::new(buf_data).chain(buf_reader.into_inner()))
        }
    }

    /// Creates a [`DeferredReader`] for the data of a [`Read`] instance.
    ///
    /// If the [`Read`] instance is a [`BufReader`], it is better to use
    /// [`from_buf_reader`][Self::from_buf_reader] to avoid unnecessary double buffering of the
    /// data.
    pub fn from_read(read: impl Read + 'a) -> Self {
        Self::from_boxed_dyn_read(Box::new(read))
    }

    /// Creates a [`DeferredReader`] for the data of a boxed [`Read`] instance.
    #[inline(never)]
    pub fn from_boxed_dyn_read(read: Box<dyn Read + 'a>) -> Self {
        DeferredReader {
            read,
            buf: vec![],
            pos_in_buf: 0,
            end_of_buf: 0,
            complete: false,
            io_error: None,
            consumed: 0,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the number of bytes that are read at once.
    ///
    /// This is an upper bound. Depending on the [`Read`] implementation, fewer bytes may be
    /// returned by a single read request.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Returns the next byte without consuming it.
    ///
    /// Returns `None` at the end of the input or after an IO error.
    #[inline]
    pub fn peek_byte(&mut self) -> Option<u8> {
        if self.pos_in_buf == self.end_of_buf && !self.fill_buf_cold() {
            return None;
        }
        Some(self.buf[self.pos_in_buf])
    }

    /// Consumes and returns the next byte.
    ///
    /// Returns `None` at the end of the input or after an IO error. Once `None` was returned, all
    /// further calls return `None` as well.
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.pos_in_buf += 1;
        self.consumed += 1;
        Some(byte)
    }

    /// Total number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.consumed
    }

    /// Returns whether the reader is at the end of the available data.
    ///
    /// This can be the end of the input or all data before an IO error was encountered. Use
    /// [`check_io_error`][Self::check_io_error] to determine whether an IO error occured.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.complete && self.pos_in_buf == self.end_of_buf
    }

    /// Returns an encountered IO error as `Err(io_err)`.
    ///
    /// This resets the stored IO error and returns `Ok(())` if no IO error is stored.
    #[inline]
    pub fn check_io_error(&mut self) -> io::Result<()> {
        match self.io_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns a reference to an encountered IO error without resetting it.
    #[inline]
    pub fn io_error(&self) -> Option<&io::Error> {
        self.io_error.as_ref()
    }

    #[cold]
    #[inline(never)]
    fn fill_buf_cold(&mut self) -> bool {
        if self.complete {
            return false;
        }

        if self.buf.len() < self.chunk_size {
            self.buf.resize(self.chunk_size, 0);
        }

        // Only issue a single successful read so that line buffered input stays interactive, but
        // retry on `Interrupted`.
        loop {
            match self.read.read(&mut self.buf[..self.chunk_size]) {
                Ok(0) => self.complete = true,
                Ok(n) => {
                    assert!(
                        n <= self.chunk_size,
                        "invariant of std::io::Read trait violated"
                    );
                    self.pos_in_buf = 0;
                    self.end_of_buf = n;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.io_error = Some(err);
                    self.complete = true;
                }
            }
            break;
        }

        !self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing<'a> {
        data: &'a [u8],
    }

    impl Read for Failing<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "broken pipe"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn reads_across_chunks() {
        let mut reader = DeferredReader::from_read("hello world".as_bytes());
        reader.set_chunk_size(3);

        let mut out = vec![];
        while let Some(byte) = reader.next_byte() {
            out.push(byte);
        }

        assert_eq!(out, b"hello world");
        assert_eq!(reader.position(), 11);
        assert!(reader.is_at_end());
        assert!(reader.check_io_error().is_ok());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut reader = DeferredReader::from_read("ab".as_bytes());

        assert_eq!(reader.peek_byte(), Some(b'a'));
        assert_eq!(reader.peek_byte(), Some(b'a'));
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.next_byte(), Some(b'a'));
        assert_eq!(reader.next_byte(), Some(b'b'));
        assert_eq!(reader.next_byte(), None);
        assert_eq!(reader.next_byte(), None);
    }

    #[test]
    fn io_error_is_deferred() {
        let mut reader = DeferredReader::from_read(Failing { data: b"xy" });

        assert_eq!(reader.next_byte(), Some(b'x'));
        assert_eq!(reader.next_byte(), Some(b'y'));
        assert_eq!(reader.next_byte(), None);
        assert!(reader.io_error().is_some());
        assert!(reader.check_io_error().is_err());
        assert!(reader.check_io_error().is_ok());
    }

    #[test]
    fn keeps_data_buffered_by_buf_reader() {
        use std::io::BufRead;

        let mut buf_reader = BufReader::new("line one\nline two\n".as_bytes());
        buf_reader.fill_buf().unwrap();
        let mut reader = DeferredReader::from_buf_reader(buf_reader);

        let mut out = vec![];
        while let Some(byte) = reader.next_byte() {
            out.push(byte);
        }
        assert_eq!(out, b"line one\nline two\n");
    }
}
