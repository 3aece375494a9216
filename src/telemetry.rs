//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured `log_level` filter. Production
/// emits JSON lines for the log pipeline; other environments keep the
/// human-readable format. Calling this more than once is a no-op.
pub fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.is_production() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn repeated_init_does_not_panic() {
        let config = ServerConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }

    #[test]
    fn production_init_does_not_panic() {
        let config = ServerConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        init_tracing(&config);
    }
}
