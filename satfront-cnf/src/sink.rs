/// Receiver of the literals of a DIMACS CNF body.
///
/// The parser forwards every literal in input order, including the `0` terminating each clause,
/// as soon as it is parsed. This matches the incremental `add` interface of SAT solvers, so a
/// solver can consume the input without the parser buffering any clause.
pub trait ClauseSink {
    /// Adds a literal, or finishes the current clause when `lit` is `0`.
    fn add_lit(&mut self, lit: i32);
}

impl ClauseSink for Vec<i32> {
    fn add_lit(&mut self, lit: i32) {
        self.push(lit);
    }
}

impl<S: ClauseSink + ?Sized> ClauseSink for &mut S {
    fn add_lit(&mut self, lit: i32) {
        (**self).add_lit(lit);
    }
}

/// Collects literals into clauses, dropping the terminating zeros.
#[derive(Default, Debug)]
pub struct Clauses {
    /// All finished clauses in input order.
    pub clauses: Vec<Vec<i32>>,
    current: Vec<i32>,
}

impl Clauses {
    /// Literals added after the last terminating zero.
    pub fn pending(&self) -> &[i32] {
        &self.current
    }
}

impl ClauseSink for Clauses {
    fn add_lit(&mut self, lit: i32) {
        if lit == 0 {
            self.clauses.push(std::mem::take(&mut self.current));
        } else {
            self.current.push(lit);
        }
    }
}
