use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,simple_html_downloader=debug";

/// Structured logging to stderr. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let initialized = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if initialized.is_ok() {
        tracing::debug!("logging initialized");
    }
}
