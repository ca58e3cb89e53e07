//! Messages on standard output, all prefixed with `c` as comments of the SAT competition format.
use std::io::Write;

use env_logger::{Builder, Target};
use log::{info, Level, LevelFilter};

/// Environment variable overriding the level filter, using the `env_logger` syntax.
pub const LOG_ENV: &str = "SATFRONT_LOG";

/// Sets up the `log` facade to print to standard output.
///
/// Records are printed as `c <message>`, trace records as `c LOG <message>` and warnings as
/// `c WARNING <message>`. With `LevelFilter::Off` nothing is printed, even when [`LOG_ENV`] is
/// set.
pub fn init_logger(level: LevelFilter) {
    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .filter_level(level)
        .format(|buf, record| {
            let prefix = match record.level() {
                Level::Trace => "c LOG ",
                Level::Warn | Level::Error => "c WARNING ",
                _ => "c ",
            };
            match record.args().as_str() {
                Some("") if record.level() > Level::Warn => writeln!(buf, "c"),
                _ => writeln!(buf, "{prefix}{}", record.args()),
            }
        });
    if level != LevelFilter::Off {
        builder.parse_env(LOG_ENV);
    }
    // Only fails when a logger was installed before, which then stays in place.
    let _ = builder.try_init();
}

/// Prints a section header, as in `c ---- [ parsing ] ----`.
pub fn section(name: &str) {
    info!("");
    info!("---- [ {name} ] ----");
    info!("");
}

pub fn banner() {
    section("banner");
    info!("satfront SAT solver");
    info!("");
    info!("Version {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Compiled for {}-{}",
        std::env::consts::ARCH,
        std::env::consts::OS
    );
}
