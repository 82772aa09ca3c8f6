use crate::config::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `FINFO_LOG` overrides the verbosity level.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(9), "trace");
    }
}
