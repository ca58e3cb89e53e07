//! The interface between the front end and a SAT solving engine.
use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use satfront_cnf::ClauseSink;

mod dpll;

pub use dpll::Dpll;

/// Outcome of a call to [`Engine::solve`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SolveResult {
    Satisfiable,
    Unsatisfiable,
    Unknown,
}

impl SolveResult {
    /// The exit code reporting this result, following the SAT competition conventions.
    pub fn code(self) -> i32 {
        match self {
            SolveResult::Satisfiable => 10,
            SolveResult::Unsatisfiable => 20,
            SolveResult::Unknown => 0,
        }
    }
}

/// A SAT solving engine fed clause by clause through [`ClauseSink::add_lit`].
pub trait Engine: ClauseSink {
    /// Sets the verbosity of progress messages, `1` being the default.
    fn set_verbose_level(&mut self, level: u32);

    /// Solves the formula added so far.
    fn solve(&mut self) -> SolveResult;

    /// Value of variable `var` after a satisfiable result, as `var` if true and `-var` if false.
    fn value(&self, var: i32) -> i32;

    /// Statistics of this engine, readable while the engine is running.
    fn statistics(&self) -> Arc<Statistics>;
}

/// Counters updated by an engine and read concurrently by the reporter.
///
/// All counters are atomics, so reading them never blocks or allocates, which makes them usable
/// from a signal handler.
#[derive(Default, Debug)]
pub struct Statistics {
    added_literals: AtomicU64,
    added_clauses: AtomicU64,
    decisions: AtomicU64,
    propagations: AtomicU64,
    conflicts: AtomicU64,
}

impl Statistics {
    pub fn add_literal(&self) {
        self.added_literals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_clause(&self) {
        self.added_clauses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decision(&self) {
        self.decisions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn propagation(&self) {
        self.propagations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads all counters.
    pub fn snapshot(&self) -> Counters {
        Counters {
            added_literals: self.added_literals.load(Ordering::Relaxed),
            added_clauses: self.added_clauses.load(Ordering::Relaxed),
            decisions: self.decisions.load(Ordering::Relaxed),
            propagations: self.propagations.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
        }
    }
}

/// A consistent copy of the [`Statistics`] counters.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct Counters {
    pub added_literals: u64,
    pub added_clauses: u64,
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
}

impl Counters {
    /// Writes the counters as `c` lines.
    ///
    /// Numbers are rendered with `itoap` and written piece by piece, so this does not allocate
    /// when `out` does not.
    pub fn write_report(&self, out: &mut impl Write) -> io::Result<()> {
        write_counter(out, "added literals:", self.added_literals)?;
        write_counter(out, "added clauses: ", self.added_clauses)?;
        write_counter(out, "decisions:     ", self.decisions)?;
        write_counter(out, "propagations:  ", self.propagations)?;
        write_counter(out, "conflicts:     ", self.conflicts)?;
        out.flush()
    }
}

fn write_counter(out: &mut impl Write, label: &str, value: u64) -> io::Result<()> {
    out.write_all(b"c ")?;
    out.write_all(label.as_bytes())?;
    out.write_all(b" ")?;
    itoap::write(&mut *out, value)?;
    out.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_codes() {
        assert_eq!(SolveResult::Satisfiable.code(), 10);
        assert_eq!(SolveResult::Unsatisfiable.code(), 20);
        assert_eq!(SolveResult::Unknown.code(), 0);
    }

    #[test]
    fn counters_report() {
        let stats = Statistics::default();
        for _ in 0..3 {
            stats.add_literal();
        }
        stats.add_clause();
        stats.decision();
        stats.conflict();
        stats.conflict();

        let counters = stats.snapshot();
        assert_eq!(
            counters,
            Counters {
                added_literals: 3,
                added_clauses: 1,
                decisions: 1,
                propagations: 0,
                conflicts: 2,
            }
        );

        let mut out = vec![];
        counters.write_report(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "c added literals: 3\n\
             c added clauses:  1\n\
             c decisions:      1\n\
             c propagations:   0\n\
             c conflicts:      2\n"
        );
    }
}
