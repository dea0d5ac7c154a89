use serde::{Deserialize, Serialize};

/// One row of the singleton key/value table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
  pub key: String,
  pub value: String,
}
