//! Opening the DIMACS input, decompressing it with an external tool where needed.
use std::{
    ffi::CString,
    fs::{self, File},
    io::{self, Read},
    process::{Child, ChildStdout, Command, Stdio},
};

use log::warn;

use crate::error::Error;

/// Decompressors by path suffix, each invoked as `<tool> -c -d <path>`.
const DECOMPRESSORS: &[(&str, &str)] = &[(".gz", "gzip"), (".bz2", "bzip2"), (".xz", "xz")];

/// The underlying stream of an [`Input`], which determines how it is released.
#[derive(Debug)]
pub enum Stream {
    Stdin(io::Stdin),
    File(File),
    Pipe { child: Child, stdout: ChildStdout },
}

/// An opened input, read once and then released with [`Input::close`].
pub struct Input {
    path: String,
    stream: Stream,
}

/// Checks that `path` exists and is readable by this process.
pub fn readable(path: &str) -> bool {
    if fs::metadata(path).is_err() {
        return false;
    }
    let Ok(path) = CString::new(path) else {
        return false;
    };
    // SAFETY: `path` is a valid NUL terminated string for the duration of the call.
    unsafe { libc::access(path.as_ptr(), libc::R_OK) == 0 }
}

/// Returns the decompressor to use for `path`, if any.
pub fn decompressor(path: &str) -> Option<&'static str> {
    DECOMPRESSORS
        .iter()
        .find(|(suffix, _)| path.ends_with(suffix))
        .map(|&(_, tool)| tool)
}

impl Input {
    /// Opens the file at `path` or standard input for `None`.
    pub fn open(path: Option<&str>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Input {
                path: "<stdin>".to_owned(),
                stream: Stream::Stdin(io::stdin()),
            });
        };

        if !readable(path) {
            return Err(Error::Access(path.to_owned()));
        }

        let stream = match decompressor(path) {
            Some(tool) => {
                let mut child = Command::new(tool)
                    .args(["-c", "-d"])
                    .arg(path)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .spawn()
                    .map_err(|err| Error::Open(path.to_owned(), err))?;
                let Some(stdout) = child.stdout.take() else {
                    return Err(Error::Open(
                        path.to_owned(),
                        io::Error::new(io::ErrorKind::BrokenPipe, "missing decompressor output"),
                    ));
                };
                Stream::Pipe { child, stdout }
            }
            None => Stream::File(
                File::open(path).map_err(|err| Error::Open(path.to_owned(), err))?,
            ),
        };

        Ok(Input {
            path: path.to_owned(),
            stream,
        })
    }

    /// The path shown in messages, `<stdin>` for standard input.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Releases the input.
    ///
    /// A decompressor is waited for after closing its output. A decompressor failing is only
    /// reported as a warning, as its output was parsed successfully.
    pub fn close(self) -> io::Result<()> {
        match self.stream {
            Stream::Stdin(_) => {}
            Stream::File(file) => drop(file),
            Stream::Pipe { mut child, stdout } => {
                drop(stdout);
                let status = child.wait()?;
                if !status.success() {
                    warn!("decompressing '{}' failed with {status}", self.path);
                }
            }
        }
        Ok(())
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.stream {
            Stream::Stdin(stdin) => stdin.read(buf),
            Stream::File(file) => file.read(buf),
            Stream::Pipe { stdout, .. } => stdout.read(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;

    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("satfront-input-{}-{name}", std::process::id()))
    }

    #[test]
    fn decompressor_by_suffix() {
        assert_eq!(decompressor("a.cnf.gz"), Some("gzip"));
        assert_eq!(decompressor("a.cnf.bz2"), Some("bzip2"));
        assert_eq!(decompressor("a.cnf.xz"), Some("xz"));
        assert_eq!(decompressor("a.cnf"), None);
        assert_eq!(decompressor("gz"), None);
    }

    #[test]
    fn stdin_without_path() {
        let input = Input::open(None).unwrap();
        assert_eq!(input.path(), "<stdin>");
        assert_matches!(&input.stream, Stream::Stdin(_));
        input.close().unwrap();
    }

    #[test]
    fn reads_plain_file() {
        let path = temp_path("plain.cnf");
        fs::write(&path, "p cnf 0 0\n").unwrap();
        let path_str = path.to_str().unwrap();

        let mut input = Input::open(Some(path_str)).unwrap();
        assert_eq!(input.path(), path_str);
        assert_matches!(&input.stream, Stream::File(_));
        let mut contents = String::new();
        input.read_to_string(&mut contents).unwrap();
        input.close().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(contents, "p cnf 0 0\n");
    }

    #[test]
    fn err_missing_file() {
        let path = temp_path("missing.cnf.gz");
        let path_str = path.to_str().unwrap();

        let err = Input::open(Some(path_str)).err().unwrap();
        assert_matches!(&err, Error::Access(p) if p == path_str);
        assert_eq!(err.to_string(), format!("can not access '{path_str}'"));
    }

    #[test]
    fn decompresses_through_pipe() {
        if Command::new("gzip").arg("--version").output().is_err() {
            return;
        }
        let plain = temp_path("piped.cnf");
        fs::File::create(&plain)
            .unwrap()
            .write_all(b"p cnf 1 1\n1 0\n")
            .unwrap();
        let status = Command::new("gzip").arg("-f").arg(&plain).status().unwrap();
        assert!(status.success());
        let compressed = format!("{}.gz", plain.display());

        let mut input = Input::open(Some(&compressed)).unwrap();
        assert_matches!(&input.stream, Stream::Pipe { .. });
        let mut contents = String::new();
        input.read_to_string(&mut contents).unwrap();
        input.close().unwrap();
        fs::remove_file(&compressed).unwrap();

        assert_eq!(contents, "p cnf 1 1\n1 0\n");
    }
}
