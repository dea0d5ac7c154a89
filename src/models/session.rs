use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// ---------------------------------------------------------------------------
/// Session Type
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
  Gym,
  Basketball,
  Other,
}

impl std::fmt::Display for SessionType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Gym => write!(f, "gym"),
      Self::Basketball => write!(f, "basketball"),
      Self::Other => write!(f, "other"),
    }
  }
}

impl std::str::FromStr for SessionType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "gym" => Ok(Self::Gym),
      "basketball" => Ok(Self::Basketball),
      "other" => Ok(Self::Other),
      _ => Err(format!("Unknown session type: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Session
/// ---------------------------------------------------------------------------

/// One recorded workout/activity occurrence.
///
/// `month_key` is a denormalized copy of the date's `YYYY-MM` prefix kept
/// for month-indexed queries; every write path recomputes it from
/// `date_iso` via [`month_key_for`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  #[serde(rename = "dateISO")]
  pub date_iso: String,
  pub month_key: String,
  #[serde(rename = "type")]
  pub session_type: SessionType,
  pub duration_min: i64,
  #[serde(default)]
  pub notes: Option<String>,
  /// Only meaningful for basketball sessions.
  #[serde(default)]
  pub intensity: Option<String>,
  /// Only meaningful for "other" sessions.
  #[serde(default)]
  pub other_name: Option<String>,
}

/// Derive the month key (`YYYY-MM`) for a calendar date, rejecting anything
/// that is not a real `YYYY-MM-DD` date.
pub fn month_key_for(date_iso: &str) -> Result<String, StoreError> {
  let date = NaiveDate::parse_from_str(date_iso, "%Y-%m-%d")
    .map_err(|_| StoreError::InvalidDate(date_iso.to_string()))?;
  Ok(date.format("%Y-%m").to_string())
}

/// ---------------------------------------------------------------------------
/// Session Detail Rows
/// ---------------------------------------------------------------------------

/// Join record binding one exercise to one session occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExercise {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub session_id: i64,
  pub exercise_id: i64,
  #[serde(with = "int_bool")]
  pub done: bool,
  /// Sort key for display and re-save; unique within a session but not
  /// globally, and not necessarily contiguous.
  pub order_index: i64,
}

/// One strength set of a session exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub session_exercise_id: i64,
  /// 1-based, sequential within the parent.
  pub set_number: i64,
  pub reps: i64,
  pub weight_kg: f64,
}

/// Cardio detail of a session exercise; at most one row per parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardioEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  pub session_exercise_id: i64,
  pub minutes: f64,
  pub km: f64,
}

/// `done` is stored as 0/1 in the documents.
pub(crate) mod int_bool {
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(i64::from(*value))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(i64::deserialize(deserializer)? != 0)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
