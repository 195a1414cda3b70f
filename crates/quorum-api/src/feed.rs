//! The server-sent-events change feed.
//!
//! Streams [`FeedEvent`]s from the store's broadcast channel as SSE data
//! frames, one JSON object per event. A subscriber that falls behind the
//! channel's buffer receives a `reconnected` event instead of the dropped
//! changes; clients treat that as "reload everything".

use std::convert::Infallible;

use axum::{
  Router,
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
  routing::get,
};
use futures::stream::Stream;
use quorum_core::feed::FeedEvent;
use tokio::sync::broadcast;

/// Build a router serving `GET /feed` from `feed`.
pub fn feed_router(feed: broadcast::Sender<FeedEvent>) -> Router<()> {
  Router::new().route("/feed", get(handler)).with_state(feed)
}

/// `GET /feed` — an unbounded SSE stream of availability changes.
async fn handler(
  State(feed): State<broadcast::Sender<FeedEvent>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
  let rx = feed.subscribe();

  let stream = futures::stream::unfold(rx, |mut rx| async move {
    loop {
      let event = match rx.recv().await {
        Ok(event) => event,
        // Dropped events cannot be recovered; tell the client to reload.
        Err(broadcast::error::RecvError::Lagged(_)) => FeedEvent::Reconnected,
        Err(broadcast::error::RecvError::Closed) => return None,
      };
      match serde_json::to_string(&event) {
        Ok(json) => return Some((Ok(Event::default().data(json)), rx)),
        Err(_) => continue,
      }
    }
  });

  Sse::new(stream).keep_alive(KeepAlive::default())
}
