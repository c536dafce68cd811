use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. Log lines go to stderr so command
/// output on stdout stays clean. `RUST_LOG` overrides the default filter.
pub fn init_tracing(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,docsift=info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
