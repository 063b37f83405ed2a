// src/logging.rs
use std::env;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_DIRECTIVES: &str = "info,confidx=info";

/// Filter built from a `RUST_LOG`-style string, falling back to
/// [`DEFAULT_DIRECTIVES`] when it is unset or does not parse.
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Global fmt subscriber on stderr, honouring `RUST_LOG`.
/// Stdout stays free for command output.
pub fn init_stderr() {
    let directives = env::var("RUST_LOG").ok();
    fmt::Subscriber::builder()
        .with_env_filter(env_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}
