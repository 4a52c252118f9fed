use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter for each `-v` count; `RUST_LOG` takes precedence.
fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "poster=info",
        1 => "poster=debug,info",
        _ => "poster=trace,debug",
    }
}

/// Install a compact subscriber writing to stderr, so stdout only carries results.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
