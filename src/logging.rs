use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Diagnostics go to stderr; outcome lines for the user stay on stdout.
pub fn setup_logger() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("AUTOCOMMIT_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
