//! Command line options.
use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;

use crate::error::Error;

pub const USAGE: &str = "\
usage: satfront [ <option> ... ] [ <dimacs> ]

where '<option>' is one of the following

  -h | --help          print this option summary
  --version            print solver version and exit
  -n | --no-witness    disable printing of model / satisfying assignment
  -q | --quiet         disable verbose messages
  -v | --verbose       increment verbose level
  -l | --log           enable logging messages

where '<dimacs>' is an optionally compressed CNF in DIMACS format by
default read from '<stdin>'.  For decompression the solver relies on
external tools 'gzip', 'bzip2' and 'xz' determined by the path suffix.
";

/// Options of a single run, fixed after parsing the command line.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Config {
    /// Print the satisfying assignment.
    pub witness: bool,
    pub quiet: bool,
    /// Verbose level, starting at `1` and incremented by each `-v`, saturating at `u32::MAX`.
    pub verbose: u32,
    /// Enable the most detailed messages.
    pub logging: bool,
    /// Input path, `None` for standard input.
    pub path: Option<String>,
}

/// Exact spellings of all options, other `-` prefixed arguments are rejected.
const OPTIONS: &[&str] = &[
    "-h",
    "--help",
    "--version",
    "-n",
    "--no-witness",
    "-q",
    "--quiet",
    "-v",
    "--verbose",
    "-l",
    "--log",
];

/// What a left to right pass over the raw arguments found.
#[derive(Default, Debug)]
struct Scan {
    verbose: u32,
}

/// Checks the arguments left to right, up to the first request for help or version information.
///
/// Only the exact option spellings and a single path are accepted, so clap never sees an
/// argument it would interpret differently, like `--`, `-` or combined short flags.
fn scan<T: Into<OsString>>(args: impl IntoIterator<Item = T>) -> Result<Scan, Error> {
    let mut scan = Scan::default();
    let mut path: Option<String> = None;
    for arg in args.into_iter().skip(1) {
        let arg = arg.into().to_string_lossy().into_owned();
        match arg.as_str() {
            "-h" | "--help" => break,
            "--version" => return Err(Error::Version),
            "-v" | "--verbose" => scan.verbose = scan.verbose.saturating_add(1),
            _ if arg.starts_with('-') && !OPTIONS.contains(&arg.as_str()) => {
                return Err(Error::Config(format!(
                    "invalid command option '{arg}' (try '-h')"
                )));
            }
            _ if arg.starts_with('-') => {}
            _ => {
                if let Some(first) = &path {
                    return Err(Error::Config(format!(
                        "multiple files '{first}' and '{arg}' (try '-h')"
                    )));
                }
                path = Some(arg);
            }
        }
    }
    Ok(scan)
}

fn command() -> Command {
    Command::new("satfront")
        .override_help(USAGE)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::Help),
        )
        .arg(
            Arg::new("no-witness")
                .short('n')
                .long("no-witness")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("log")
                .short('l')
                .long("log")
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("dimacs"))
}

impl Config {
    /// Parses the command line, `args` including the program name.
    ///
    /// Requests for help or version information are returned as [`Error::Cli`] or
    /// [`Error::Version`] with an exit code of `0`.
    pub fn from_args<I, T>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let scan = scan(args.iter().cloned())?;
        let matches = command().try_get_matches_from(args)?;
        Self::from_matches(&matches, &scan)
    }

    fn from_matches(matches: &ArgMatches, scan: &Scan) -> Result<Self, Error> {
        let path = matches.get_one::<String>("dimacs").cloned();

        let logging = matches.get_flag("log");
        if logging && !cfg!(feature = "logging") {
            return Err(Error::Config(
                "solver configured without logging support".to_owned(),
            ));
        }

        let config = Config {
            witness: !matches.get_flag("no-witness"),
            quiet: matches.get_flag("quiet"),
            verbose: scan.verbose.saturating_add(1),
            logging,
            path,
        };

        if config.quiet && config.logging {
            return Err(Error::Config(
                "can not combine '--quiet' and '--log'".to_owned(),
            ));
        }
        if config.quiet && config.verbose > 1 {
            return Err(Error::Config(
                "can not combine '--quiet' and '--verbose'".to_owned(),
            ));
        }

        Ok(config)
    }

    /// Maximal level of messages shown for this configuration.
    pub fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }
        if self.logging {
            return LevelFilter::Trace;
        }
        match self.verbose {
            0 | 1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
