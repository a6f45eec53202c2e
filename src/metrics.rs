//! Pipeline counters, served in Prometheus text format.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

lazy_static! {
    pub static ref SUBMISSIONS_ACCEPTED: IntCounter = IntCounter::new(
        "meldeschein_submissions_accepted_total",
        "Submissions validated and stored"
    )
    .expect("metric can be created");
    pub static ref VALIDATION_REJECTIONS: IntCounter = IntCounter::new(
        "meldeschein_validation_rejections_total",
        "Submissions rejected by validation or malformed input"
    )
    .expect("metric can be created");
    pub static ref RENDER_FAILURES: IntCounter = IntCounter::new(
        "meldeschein_render_failures_total",
        "Documents that failed to render or timed out"
    )
    .expect("metric can be created");
    pub static ref DELIVERY_FAILURES: IntCounter = IntCounter::new(
        "meldeschein_delivery_failures_total",
        "Emails the transport did not accept"
    )
    .expect("metric can be created");
    pub static ref REGISTRY: Registry = build_registry();
}

fn build_registry() -> Registry {
    let registry = Registry::new();
    let counters: [&IntCounter; 4] = [
        &SUBMISSIONS_ACCEPTED,
        &VALIDATION_REJECTIONS,
        &RENDER_FAILURES,
        &DELIVERY_FAILURES,
    ];
    for counter in counters {
        if let Err(e) = registry.register(Box::new(counter.clone())) {
            log::warn!("Failed to register pipeline metric: {}", e);
        }
    }
    registry
}

/// Encode all pipeline counters.
pub fn gather_text() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
