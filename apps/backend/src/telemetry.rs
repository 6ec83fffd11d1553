use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,actix_web=info,durak_backend=info";

/// Install the process-wide subscriber for the server binary.
///
/// Output is one JSON object per event unless `LOG_FORMAT=pretty`, which is
/// easier to read when running a local server. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("pretty"));
    let fmt_layer = if pretty {
        fmt::layer().with_target(false).compact().boxed()
    } else {
        fmt::layer()
            .with_ansi(false)
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}
