/// Tracing subscriber setup
///
/// `RUST_LOG` overrides the default filter. Audit records are written under
/// the `tokengate::audit` target, so `RUST_LOG=tokengate::audit=warn`
/// isolates them.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "tokengate_api=info,tokengate_shared=info,tokengate::audit=warn,tower_http=info";

/// Installs the global subscriber, as JSON lines or human-readable text
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
