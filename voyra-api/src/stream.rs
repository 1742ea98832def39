use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/stream", get(change_stream))
}

/// GET /v1/stream
/// Server-sent change feed. Dashboards refetch whatever entity an event
/// names; a lagging subscriber just misses events and resyncs on the next
/// fetch.
async fn change_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).unwrap_or_default();
                Some(Ok(Event::default().event("change").data(data)))
            }
            Err(_) => None, // Lagged receiver, drop silently
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
