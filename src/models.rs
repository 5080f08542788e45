use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::month_year::MonthYear;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<MonthYear>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated input for inserting a row; id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    pub end_date: Option<MonthYear>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionPayload {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// What a partial update does to `end_date`.
///
/// A missing (or `null`) field leaves the column alone, an empty string clears
/// it, and anything else must be a `MM-YYYY` date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EndDateUpdate {
    #[default]
    Unchanged,
    Clear,
    Set(String),
}

impl EndDateUpdate {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, EndDateUpdate::Unchanged)
    }
}

impl<'de> Deserialize<'de> for EndDateUpdate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => EndDateUpdate::Unchanged,
            Some(value) if value.is_empty() => EndDateUpdate::Clear,
            Some(value) => EndDateUpdate::Set(value),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionPayload {
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub end_date: EndDateUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionSummary {
    pub total_cost: i64,
}

/// Raw `page`/`limit` query parameters. Unparseable values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}
