// src/infra/logger.rs — Structured logging with tracing

use tracing_subscriber::{fmt, EnvFilter};

/// Map `-v` repetitions to a default filter level.
pub fn level_for_verbosity(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // reqwest/hyper are chatty at debug
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn,h2=warn"))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0, false), "warn");
        assert_eq!(level_for_verbosity(1, false), "info");
        assert_eq!(level_for_verbosity(3, false), "debug");
        assert_eq!(level_for_verbosity(2, true), "error");
    }
}
