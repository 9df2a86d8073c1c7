//! CLI command definitions, argument parsing, and logging setup.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use tracing_subscriber::EnvFilter;

use guidecheck::constants::ENV_LOG;
use guidecheck::env::Env;

/// Default log filter for a `-v` count.
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr log subscriber.
///
/// An explicit `-v` wins; otherwise `GUIDECHECK_LOG` then `RUST_LOG` are
/// used as filter directives, falling back to `warn`.
pub fn init_logging(verbose: u8) {
    let from_env = if verbose == 0 {
        Env::real()
            .first_of(&[ENV_LOG, "RUST_LOG"])
            .and_then(|spec| EnvFilter::try_new(spec).ok())
    } else {
        None
    };
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
