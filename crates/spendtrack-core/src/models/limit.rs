use serde::{Deserialize, Serialize};

/// Spending limit preset offered by the backend
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredefinedLimit {
    pub id: i64,
    pub amount: f64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}
