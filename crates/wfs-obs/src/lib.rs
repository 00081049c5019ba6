//! Observability initialisation
//!
//! JSON structured logging with `RUST_LOG` respected; defaults to
//! "info,wfs=debug". Safe to call more than once (tests, embedded use).

use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

pub fn init(service_name: &str) {
    INIT.call_once(|| {
        let default_filter = "info,wfs=debug";
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

        tracing_subscriber::registry()
            .with(EnvFilter::new(env_filter))
            .with(tracing_subscriber::fmt::layer().json())
            .init();

        tracing::info!(service = %service_name, "Observability initialized");
    });
}
