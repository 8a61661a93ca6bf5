//! Simulated CDM track feed

use axum::{
    extract::Query,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use bf_core::events::cdm::{cdm_feed, CdmFeedConfig};
use bf_protocol::sim_models::CdmFeedQuery;
use futures_util::stream::StreamExt;
use std::time::Duration;

/// Stream simulated CDM events via SSE until the client disconnects.
///
/// Query: `sources` (comma-separated `link16`/`vmf`) and `intervalMs`
/// (clamped to 200..=2000, default 800).
pub async fn cdm_events(Query(query): Query<CdmFeedQuery>) -> impl IntoResponse {
    let config = CdmFeedConfig::from_query(&query);
    tracing::debug!(
        sources = ?config.sources(),
        interval_ms = config.interval().as_millis() as u64,
        "cdm feed subscriber connected"
    );

    let stream = cdm_feed(config).map(|event| Event::default().json_data(&event));

    (
        [("x-accel-buffering", "no")],
        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("ping"),
        ),
    )
}
