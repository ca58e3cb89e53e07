//! Command line front end of a SAT solver reading DIMACS CNF input.
//!
//! The exit code follows the SAT competition conventions: `10` for satisfiable, `20` for
//! unsatisfiable and `0` if no result was determined. Errors exit with `1`.
use std::{
    env,
    io::{self, Write},
    process,
    time::Instant,
};

use log::info;

use satfront_cnf::{
    cnf::{self, Header},
    witness::write_witness,
};

mod config;
mod engine;
mod error;
mod input;
mod output;
mod signals;

use config::Config;
use engine::{Dpll, Engine, SolveResult};
use error::Error;
use input::Input;
use output::section;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            err.exit_code()
        }
    };
    process::exit(code);
}

fn report(err: &Error) {
    match err {
        Error::Cli(err) => {
            let _ = err.print();
        }
        Error::Version => println!("{err}"),
        Error::Format(err) => eprintln!("satfront: {err}"),
        err => eprintln!("satfront: error: {err}"),
    }
}

fn run() -> Result<i32, Error> {
    let start = Instant::now();
    let config = Config::from_args(env::args_os())?;

    let mut engine = Dpll::new().ok_or(Error::EngineInit)?;
    if !config.quiet {
        engine.set_verbose_level(config.verbose);
    }
    output::init_logger(config.level_filter());

    let input = Input::open(config.path.as_deref())?;
    let signals = signals::install(config.quiet, engine.statistics())?;
    output::banner();

    let header = parse(input, &mut engine)?;

    section("solving");
    let result = engine.solve();
    section("result");
    print_result(&config, header, &engine, result)?;

    if !config.quiet {
        section("statistics");
        let mut stdout = io::stdout().lock();
        engine.statistics().snapshot().write_report(&mut stdout)?;
        writeln!(
            stdout,
            "c elapsed time:   {:.2} seconds",
            start.elapsed().as_secs_f64()
        )?;
        stdout.flush()?;
    }

    signals.restore();
    section("shutting down");
    drop(engine);

    let code = result.code();
    info!("exit {code}");
    Ok(code)
}

/// Parses the input into `engine` and releases the input.
fn parse(mut input: Input, engine: &mut impl Engine) -> Result<Header, Error> {
    section("parsing");
    let path = input.path().to_owned();
    info!("parsing '{path}'");
    let start = Instant::now();

    let mut parser = cnf::Parser::from_read(&mut input, path.as_str())?;
    let header = parser.header();
    info!(
        "parsed 'p cnf {} {}' header",
        header.var_count, header.clause_count
    );

    let clauses = parser.parse_clauses(engine)?;
    let seconds = start.elapsed().as_secs_f64();
    if clauses == 1 {
        info!("parsed exactly one clause in {seconds:.2} seconds");
    } else {
        info!("parsed {clauses} clauses in {seconds:.2} seconds");
    }
    let bytes = parser.bytes();
    drop(parser);

    input.close()?;
    info!("closed '{path}'");
    info!(
        "after reading {bytes} bytes ({:.0} MB)",
        bytes as f64 / (1 << 20) as f64
    );
    Ok(header)
}

fn print_result(
    config: &Config,
    header: Header,
    engine: &impl Engine,
    result: SolveResult,
) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match result {
        SolveResult::Satisfiable => {
            writeln!(stdout, "s SATISFIABLE")?;
            if config.witness {
                let values = (1..=header.var_count).map(|var| engine.value(var));
                write_witness(&mut stdout, values)?;
            }
        }
        SolveResult::Unsatisfiable => writeln!(stdout, "s UNSATISFIABLE")?,
        SolveResult::Unknown => {
            drop(stdout);
            info!("no result");
            return Ok(());
        }
    }
    stdout.flush()
}
