//! Calendar and monthly insight derivations
//!
//! Pure, read-only rollups over the session table: monthly KPI counts,
//! per-day calendar markers, day listings, and the per-type duration sums
//! feeding the insight charts. Nothing here mutates or caches - every call
//! re-reads current state - and nothing re-validates referential
//! integrity; inputs are assumed consistent.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::{Session, SessionType};
use crate::schema::Table;
use crate::store::{Store, StoreError};

/// Per-day markers: date to the set of session types present that day.
pub type DayMarkers = BTreeMap<String, BTreeSet<SessionType>>;

/// ---------------------------------------------------------------------------
/// Rollup Types
/// ---------------------------------------------------------------------------

/// One total per session type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
  pub gym: i64,
  pub basketball: i64,
  pub other: i64,
}

impl TypeTotals {
  fn tally(&mut self, session_type: SessionType, amount: i64) {
    match session_type {
      SessionType::Gym => self.gym += amount,
      SessionType::Basketball => self.basketball += amount,
      SessionType::Other => self.other += amount,
    }
  }
}

/// Monthly KPI header: total session count partitioned by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
  pub total: i64,
  pub counts_by_type: TypeTotals,
}

impl MonthSummary {
  /// Count the given sessions by type.
  pub fn compute(sessions: &[Session]) -> Self {
    let mut summary = Self::default();
    for session in sessions {
      summary.total += 1;
      summary.counts_by_type.tally(session.session_type, 1);
    }
    summary
  }
}

/// Chart input: minutes of activity per session type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DurationRollup {
  pub minutes_by_type: TypeTotals,
}

impl DurationRollup {
  /// Sum session durations by type.
  pub fn compute(sessions: &[Session]) -> Self {
    let mut rollup = Self::default();
    for session in sessions {
      rollup
        .minutes_by_type
        .tally(session.session_type, session.duration_min.max(0));
    }
    rollup
  }
}

/// Markers for the calendar grid. Set semantics: a second gym session on
/// the same day adds nothing.
pub fn compute_markers(sessions: &[Session]) -> DayMarkers {
  let mut markers = DayMarkers::new();
  for session in sessions {
    markers
      .entry(session.date_iso.clone())
      .or_default()
      .insert(session.session_type);
  }
  markers
}

/// ---------------------------------------------------------------------------
/// Store Readers
/// ---------------------------------------------------------------------------

async fn sessions_by_index(
  store: &Store,
  index: &str,
  value: &str,
) -> Result<Vec<Session>, StoreError> {
  store
    .get_all_by_index(Table::Sessions, index, value)
    .await?
    .into_iter()
    .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
    .collect()
}

/// KPI counts for one month (`YYYY-MM`).
pub async fn month_summary(store: &Store, month_key: &str) -> Result<MonthSummary, StoreError> {
  let sessions = sessions_by_index(store, "by_month", month_key).await?;
  Ok(MonthSummary::compute(&sessions))
}

/// Calendar markers for one month.
pub async fn calendar_markers(store: &Store, month_key: &str) -> Result<DayMarkers, StoreError> {
  let sessions = sessions_by_index(store, "by_month", month_key).await?;
  Ok(compute_markers(&sessions))
}

/// Sessions of one day, newest first (descending id).
pub async fn day_sessions(store: &Store, date_iso: &str) -> Result<Vec<Session>, StoreError> {
  let mut sessions = sessions_by_index(store, "by_date", date_iso).await?;
  sessions.sort_by_key(|s| std::cmp::Reverse(s.id.unwrap_or(0)));
  Ok(sessions)
}

/// Minutes per type for one month, chart input.
pub async fn monthly_duration_rollup(
  store: &Store,
  month_key: &str,
) -> Result<DurationRollup, StoreError> {
  let sessions = sessions_by_index(store, "by_month", month_key).await?;
  Ok(DurationRollup::compute(&sessions))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
