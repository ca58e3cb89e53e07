//! A small DPLL engine with unit propagation and chronological backtracking.
use std::sync::Arc;

use log::{debug, trace};

use satfront_cnf::{ClauseSink, Clauses};

use super::{Engine, SolveResult, Statistics};

const INITIAL_VARS: usize = 1 << 10;

/// Number of conflicts between progress messages at verbose level 2 and above.
const REPORT_INTERVAL: u64 = 1 << 16;

#[derive(Copy, Clone, Debug)]
struct Decision {
    trail_len: usize,
    lit: i32,
    flipped: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Propagation {
    Done,
    Conflict,
}

/// Plain DPLL over the clauses as added, without clause learning.
pub struct Dpll {
    clauses: Clauses,
    // Indexed by variable, `0` is unassigned, `1` true and `-1` false.
    values: Vec<i8>,
    trail: Vec<i32>,
    decisions: Vec<Decision>,
    stats: Arc<Statistics>,
    verbose: u32,
    // Set when the formula could not be stored.
    out_of_memory: bool,
}

impl Dpll {
    /// Creates an engine, returning `None` if the initial allocation fails.
    pub fn new() -> Option<Self> {
        let mut values = vec![];
        values.try_reserve(INITIAL_VARS + 1).ok()?;
        values.push(0);
        Some(Self {
            clauses: Clauses::default(),
            values,
            trail: vec![],
            decisions: vec![],
            stats: Arc::default(),
            verbose: 1,
            out_of_memory: false,
        })
    }

    fn lit_value(&self, lit: i32) -> i8 {
        let value = self.values[lit.unsigned_abs() as usize];
        if lit < 0 {
            -value
        } else {
            value
        }
    }

    fn assign(&mut self, lit: i32) {
        trace!("assign {lit}");
        self.values[lit.unsigned_abs() as usize] = if lit < 0 { -1 } else { 1 };
        self.trail.push(lit);
    }

    fn backtrack(&mut self, trail_len: usize) {
        for lit in self.trail.drain(trail_len..) {
            self.values[lit.unsigned_abs() as usize] = 0;
        }
    }

    fn propagate(&mut self) -> Propagation {
        loop {
            let mut changed = false;
            for index in 0..self.clauses.clauses.len() {
                let mut unit = None;
                let mut unassigned = 0;
                let mut satisfied = false;
                for &lit in &self.clauses.clauses[index] {
                    match self.lit_value(lit) {
                        1 => {
                            satisfied = true;
                            break;
                        }
                        0 => {
                            unassigned += 1;
                            unit = Some(lit);
                        }
                        _ => {}
                    }
                }
                if satisfied {
                    continue;
                }
                match (unassigned, unit) {
                    (0, _) => {
                        trace!("conflict in clause {index}");
                        return Propagation::Conflict;
                    }
                    (1, Some(lit)) => {
                        self.stats.propagation();
                        self.assign(lit);
                        changed = true;
                    }
                    _ => {}
                }
            }
            if !changed {
                return Propagation::Done;
            }
        }
    }

    fn unassigned_variable(&self) -> Option<i32> {
        (1..self.values.len())
            .find(|&var| self.values[var] == 0)
            .map(|var| var as i32)
    }

    /// Undoes decisions up to the most recent one not yet flipped and flips it.
    ///
    /// Returns `false` when all decisions were flipped already.
    fn resolve_conflict(&mut self) -> bool {
        while let Some(decision) = self.decisions.pop() {
            self.backtrack(decision.trail_len);
            if !decision.flipped {
                trace!("flip {}", decision.lit);
                self.decisions.push(Decision {
                    lit: -decision.lit,
                    flipped: true,
                    ..decision
                });
                self.assign(-decision.lit);
                return true;
            }
        }
        false
    }
}

impl ClauseSink for Dpll {
    fn add_lit(&mut self, lit: i32) {
        if lit == 0 {
            self.stats.add_clause();
        } else {
            self.stats.add_literal();
        }
        if self.out_of_memory {
            return;
        }
        let var = lit.unsigned_abs() as usize;
        if var >= self.values.len() {
            if self.values.try_reserve(var + 1 - self.values.len()).is_err() {
                self.out_of_memory = true;
                return;
            }
            self.values.resize(var + 1, 0);
        }
        self.clauses.add_lit(lit);
    }
}

impl Engine for Dpll {
    fn set_verbose_level(&mut self, level: u32) {
        self.verbose = level;
    }

    fn solve(&mut self) -> SolveResult {
        if self.out_of_memory {
            debug!("formula exceeds available memory");
            return SolveResult::Unknown;
        }
        debug!(
            "solving {} variables and {} clauses",
            self.values.len() - 1,
            self.clauses.clauses.len()
        );
        if self.clauses.clauses.iter().any(|clause| clause.is_empty()) {
            debug!("found empty clause");
            return SolveResult::Unsatisfiable;
        }

        loop {
            if self.propagate() == Propagation::Conflict {
                self.stats.conflict();
                let conflicts = self.stats.snapshot().conflicts;
                if self.verbose > 1 && conflicts % REPORT_INTERVAL == 0 {
                    debug!(
                        "{conflicts} conflicts, {} decisions on the trail",
                        self.decisions.len()
                    );
                }
                if !self.resolve_conflict() {
                    return SolveResult::Unsatisfiable;
                }
                continue;
            }

            let Some(var) = self.unassigned_variable() else {
                return SolveResult::Satisfiable;
            };
            self.stats.decision();
            trace!("decide {}", -var);
            self.decisions.push(Decision {
                trail_len: self.trail.len(),
                lit: -var,
                flipped: false,
            });
            self.assign(-var);
        }
    }

    fn value(&self, var: i32) -> i32 {
        match self.values.get(var as usize) {
            Some(1) => var,
            _ => -var,
        }
    }

    fn statistics(&self) -> Arc<Statistics> {
        self.stats.clone()
    }
}
