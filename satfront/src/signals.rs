//! Printing statistics when the process is terminated by a signal.
//!
//! [`install`] replaces the handlers of the watched signals. On the first delivery of any of them,
//! the handler prints the statistics of the engine, restores the previous handlers and raises the
//! signal again, so the process terminates just as it would have without the handler. Further
//! deliveries while this happens are ignored.
//!
//! The handler runs at an arbitrary point of the main sequence. It only uses atomics and the raw
//! `write` system call and does not allocate.
use std::{
    io::{self, Write},
    mem, ptr,
    sync::{
        atomic::{AtomicBool, AtomicPtr, Ordering},
        Arc,
    },
};

use libc::c_int;

use crate::engine::{Counters, Statistics};

/// Signals for which statistics are printed.
pub const SIGNALS: [c_int; 5] = [
    libc::SIGABRT,
    libc::SIGBUS,
    libc::SIGINT,
    libc::SIGSEGV,
    libc::SIGTERM,
];

/// The name of a watched signal, `SIGNUNKNOWN` for others.
pub fn signal_name(sig: c_int) -> &'static str {
    match sig {
        libc::SIGABRT => "SIGABRT",
        libc::SIGBUS => "SIGBUS",
        libc::SIGINT => "SIGINT",
        libc::SIGSEGV => "SIGSEGV",
        libc::SIGTERM => "SIGTERM",
        _ => "SIGNUNKNOWN",
    }
}

/// A flag that can be raised exactly once.
pub struct FireOnce(AtomicBool);

impl FireOnce {
    pub const fn new() -> Self {
        FireOnce(AtomicBool::new(false))
    }

    /// Raises the flag, returning `true` only for the first caller.
    pub fn fire(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}

impl Default for FireOnce {
    fn default() -> Self {
        Self::new()
    }
}

static FIRED: FireOnce = FireOnce::new();

/// Points to the state of the installed handler, null when not installed.
static INSTALLED: AtomicPtr<Installed> = AtomicPtr::new(ptr::null_mut());

struct Installed {
    quiet: bool,
    stats: Arc<Statistics>,
    saved: [libc::sigaction; SIGNALS.len()],
}

impl Installed {
    fn restore(&self, count: usize) {
        for (&sig, saved) in SIGNALS.iter().zip(&self.saved).take(count) {
            // SAFETY: `saved` was filled in by `sigaction` when installing.
            unsafe {
                libc::sigaction(sig, saved, ptr::null_mut());
            }
        }
    }
}

/// Keeps the handler installed, restoring the previous handlers when dropped.
#[must_use]
pub struct SignalGuard {
    _private: (),
}

impl SignalGuard {
    /// Restores the handlers that were active before [`install`].
    pub fn restore(self) {
        drop(self)
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        uninstall(SIGNALS.len());
    }
}

fn uninstall(count: usize) {
    let installed = INSTALLED.load(Ordering::Acquire);
    if installed.is_null() {
        return;
    }
    // SAFETY: `installed` came from `Box::into_raw` in `install` and is only freed below. The
    // handler can not run anymore once all handlers are restored.
    unsafe {
        (*installed).restore(count);
        INSTALLED.store(ptr::null_mut(), Ordering::Release);
        drop(Box::from_raw(installed));
    }
}

/// Installs the handler for all [`SIGNALS`].
///
/// Unless `quiet` is set, the handler prints `stats`. Fails if the handler is installed already.
pub fn install(quiet: bool, stats: Arc<Statistics>) -> io::Result<SignalGuard> {
    let installed = Box::into_raw(Box::new(Installed {
        quiet,
        stats,
        // SAFETY: `sigaction` is a plain C struct, all zero is `SIG_DFL` with an empty mask.
        saved: unsafe { mem::zeroed() },
    }));

    if INSTALLED
        .compare_exchange(
            ptr::null_mut(),
            installed,
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_err()
    {
        // SAFETY: `installed` was not published.
        drop(unsafe { Box::from_raw(installed) });
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "signal handler already installed",
        ));
    }

    // SAFETY: all fields are initialized below before use.
    let mut action: libc::sigaction = unsafe { mem::zeroed() };
    action.sa_sigaction = catch_signal as extern "C" fn(c_int) as libc::sighandler_t;
    action.sa_flags = 0;
    // SAFETY: `sa_mask` is a valid signal set.
    unsafe {
        libc::sigemptyset(&mut action.sa_mask);
    }

    for (index, &sig) in SIGNALS.iter().enumerate() {
        // SAFETY: `installed` stays valid until `uninstall` and the pointers passed to
        // `sigaction` are valid for the duration of the call.
        let rc = unsafe {
            libc::sigaction(sig, &action, ptr::addr_of_mut!((*installed).saved[index]))
        };
        if rc != 0 {
            let err = io::Error::last_os_error();
            uninstall(index);
            return Err(err);
        }
    }

    Ok(SignalGuard { _private: () })
}

/// Writes to the standard output file descriptor without buffering or locking.
struct RawStdout;

impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for reads of `buf.len()` bytes.
        let written = unsafe { libc::write(libc::STDOUT_FILENO, buf.as_ptr().cast(), buf.len()) };
        if written < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(written as usize)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn write_signal_line(out: &mut impl Write, what: &[u8], sig: c_int) -> io::Result<()> {
    out.write_all(b"c\nc ")?;
    out.write_all(what)?;
    out.write_all(b" signal ")?;
    itoap::write(&mut *out, sig)?;
    out.write_all(b" ('")?;
    out.write_all(signal_name(sig).as_bytes())?;
    out.write_all(b"')\n")
}

/// Writes the report printed when catching `sig`.
pub fn write_report(out: &mut impl Write, sig: c_int, counters: &Counters) -> io::Result<()> {
    write_signal_line(out, b"caught", sig)?;
    counters.write_report(out)?;
    write_signal_line(out, b"raising", sig)?;
    out.write_all(b"c\n")
}

extern "C" fn catch_signal(sig: c_int) {
    if !FIRED.fire() {
        return;
    }
    // SAFETY: a non-null pointer stays valid while any handler is installed.
    let Some(installed) = (unsafe { INSTALLED.load(Ordering::Acquire).as_ref() }) else {
        return;
    };
    if !installed.quiet {
        // Output is best effort, the signal is raised regardless.
        let _ = write_report(&mut RawStdout, sig, &installed.stats.snapshot());
    }
    installed.restore(SIGNALS.len());
    // SAFETY: raising a signal has no memory safety preconditions.
    unsafe {
        libc::raise(sig);
    }
}
