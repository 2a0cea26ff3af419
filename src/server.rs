//! HTTP surface: a streaming GET that relays every broadcast to the client
//! and a POST that publishes each non-blank body line as one message.
//!
//! Both live under the `/_` prefix; every other path is a 404. Streaming
//! responses are Server-Sent-Events compatible: one raw line per message,
//! flushed as it arrives.

use std::convert::Infallible;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures_util::StreamExt;

use crate::bus::BusHandle;
use crate::ingest::non_blank_lines;

/// Build the router for a bus handle. `/_` and everything below it serve the
/// streaming and ingestion endpoints; unmatched paths fall back to 404.
pub fn router(bus: BusHandle) -> Router {
    Router::new()
        .route("/_", get(stream).post(ingest))
        .route("/_/{*rest}", get(stream).post(ingest))
        .with_state(bus)
}

/// Long-lived streaming endpoint. Registers a subscriber and relays every
/// subsequent broadcast onto the response, one line per message. Client
/// disconnect drops the stream, which deregisters the subscriber exactly
/// once via the subscription's drop.
async fn stream(State(bus): State<BusHandle>) -> Response {
    let subscription = match bus.subscribe().await {
        Ok(subscription) => subscription,
        Err(_) => return (StatusCode::SERVICE_UNAVAILABLE, "bus closed\n").into_response(),
    };
    tracing::debug!(id = %subscription.id(), "streaming client connected");

    let body = Body::from_stream(
        subscription
            .into_stream()
            .map(|message| Ok::<_, Infallible>(message.to_line())),
    );

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        body,
    )
        .into_response()
}

/// Ingestion endpoint. Publishes each non-blank line of the request body as
/// one message and echoes every accepted line back as confirmation.
async fn ingest(State(bus): State<BusHandle>, body: String) -> Response {
    let mut accepted = String::new();
    for line in non_blank_lines(&body) {
        if bus.publish(line).is_err() {
            return (StatusCode::SERVICE_UNAVAILABLE, "bus closed\n").into_response();
        }
        accepted.push_str("ok: ");
        accepted.push_str(line);
        accepted.push('\n');
    }
    accepted.into_response()
}
