//! Logging setup and the per-attempt tracing span.

use tracing::Span;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Installs a global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Returns false when
/// a subscriber was already installed, which leaves the existing one in place.
pub fn init_logging(json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        fmt().json().with_env_filter(filter).try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    result.is_ok()
}

/// Opens the span wrapping one gated save attempt.
#[must_use]
pub fn attempt_span(attempt_id: Uuid, item_id: u64, user_id: u64, content_type: &str) -> Span {
    tracing::info_span!(
        "fieldgate.attempt",
        attempt_id = %attempt_id,
        item_id,
        user_id,
        content_type = %content_type
    )
}
