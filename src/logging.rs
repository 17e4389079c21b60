//! Logging setup: env-filtered tracing to stderr, pretty for humans or
//! JSON lines when `SYNAPSE_LOG_JSON=1`.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = match std::env::var("SYNAPSE_LOG_JSON").as_deref() {
        Ok("1") => builder.json().try_init(),
        _ => builder.pretty().try_init(),
    };
}
