use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when RUST_LOG is unset or invalid
pub const DEFAULT_FILTER: &str = "strength_log_core=info";

/// Install a formatted subscriber filtered by RUST_LOG.
///
/// Safe to call more than once; if a global subscriber is already set (by the
/// host app or an earlier call) this does nothing.
pub fn init_tracing() {
  let installed = tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
    .with(tracing_subscriber::fmt::layer())
    .try_init()
    .is_ok();

  if installed {
    tracing::info!("Starting strength-log-core v{}", env!("CARGO_PKG_VERSION"));
  }
}
