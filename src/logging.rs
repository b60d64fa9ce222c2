use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "wt=warn",
        1 => "wt=info",
        _ => "wt=debug",
    }
}

/// Install the global subscriber. Diagnostics always go to stderr so that
/// stdout stays clean for paths and JSON.
pub fn init(verbosity: u8) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(default_filter(verbosity)));

    // `try_init` so tests that call into `main`-level code don't panic on a
    // second install.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
