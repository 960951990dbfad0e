use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "transactionDate")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub transaction_date: NaiveDate,
    pub amount: f64,
}

/// Body of `POST /transaction/category/{id}`
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    #[serde(rename = "transactionDate")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub transaction_date: NaiveDate,
    pub amount: f64,
}
