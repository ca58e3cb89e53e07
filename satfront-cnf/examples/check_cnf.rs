use satfront_cnf::{cnf, Clauses, ParseError};

fn main() {
    if let Err(err) = main_err() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn main_err() -> Result<(), ParseError> {
    let stdin = std::io::stdin();

    let mut clauses = Clauses::default();
    let header = cnf::parse(stdin.lock(), "<stdin>", &mut clauses)?;

    let longest = clauses.clauses.iter().map(Vec::len).max().unwrap_or(0);
    println!(
        "{} variables, {} clauses, longest clause has {longest} literals",
        header.var_count, header.clause_count
    );
    Ok(())
}
