//! Scroll-driven window extension.
//!
//! The controller watches a caller-supplied viewport over the date list and
//! decides when to extend the window. Backward extensions report the exact
//! scroll delta the prepended rows introduce so the rendering layer can keep
//! the viewport visually still. A second trigger in a direction that already
//! has an extension in flight is a no-op.

use quorum_core::{clock::Clock, store::ScheduleStore};

use crate::{cache::PartyCache, error::Result};

/// Which end of the date list an extension grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
  Past,
  Future,
}

/// The caller's current view over the date list.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
  /// Index of the first visible date row.
  pub first_visible: usize,
  /// Number of date rows on screen.
  pub visible_rows:  usize,
  /// Rendered height of one date row, in the caller's pixel unit.
  pub row_extent:    f64,
}

/// The outcome of a completed extension.
#[derive(Debug, Clone, Copy)]
pub struct Extension {
  pub edge:         Edge,
  /// How many dates were added.
  pub added:        usize,
  /// Scroll correction to apply so the viewport does not jump. Zero for
  /// forward extensions; `added × row_extent` for backward ones.
  pub scroll_delta: f64,
}

pub struct WindowController {
  /// How close (in rows) the viewport must be to an edge to trigger.
  threshold_rows:   usize,
  /// How far each extension reaches.
  extend_weeks:     u32,
  past_in_flight:   bool,
  future_in_flight: bool,
}

impl WindowController {
  pub fn new(threshold_rows: usize, extend_weeks: u32) -> Self {
    Self {
      threshold_rows,
      extend_weeks,
      past_in_flight: false,
      future_in_flight: false,
    }
  }

  /// Decide whether the viewport warrants an extension.
  ///
  /// Past wins over future when both edges are near (tiny windows); the next
  /// scroll event will pick the other up.
  pub fn plan(
    &self,
    view: &Viewport,
    total_rows: usize,
    has_more_past: bool,
  ) -> Option<Edge> {
    if view.first_visible <= self.threshold_rows
      && has_more_past
      && !self.past_in_flight
    {
      return Some(Edge::Past);
    }

    let last_visible = view.first_visible + view.visible_rows;
    if last_visible + self.threshold_rows >= total_rows && !self.future_in_flight
    {
      return Some(Edge::Future);
    }

    None
  }

  /// Run an extension against the cache. Returns `None` when an extension in
  /// the same direction is already in flight (the trigger is coalesced).
  pub async fn extend<S, C>(
    &mut self,
    edge: Edge,
    cache: &mut PartyCache<S, C>,
    view: &Viewport,
  ) -> Result<Option<Extension>>
  where
    S: ScheduleStore,
    C: Clock,
  {
    if !self.begin(edge) {
      return Ok(None);
    }

    let result = match edge {
      Edge::Past => cache.extend_past(self.extend_weeks).await,
      Edge::Future => cache.extend_future(self.extend_weeks).await,
    };
    self.finish(edge);

    let added = result?;
    let scroll_delta = match edge {
      Edge::Past => added as f64 * view.row_extent,
      Edge::Future => 0.0,
    };
    Ok(Some(Extension { edge, added, scroll_delta }))
  }

  /// Mark `edge` in flight. Returns `false` if it already was.
  pub(crate) fn begin(&mut self, edge: Edge) -> bool {
    let flag = match edge {
      Edge::Past => &mut self.past_in_flight,
      Edge::Future => &mut self.future_in_flight,
    };
    if *flag {
      return false;
    }
    *flag = true;
    true
  }

  pub(crate) fn finish(&mut self, edge: Edge) {
    match edge {
      Edge::Past => self.past_in_flight = false,
      Edge::Future => self.future_in_flight = false,
    }
  }
}
