use uuid::Uuid;

use crate::constants::*;
use crate::error::{SubscriptionError, SubscriptionResult};

pub fn parse_uuid(value: &str, field_name: &str) -> SubscriptionResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|e| SubscriptionError::validation(format!("invalid {}: {}", field_name, e)))
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> SubscriptionResult<()> {
    if value.trim().is_empty() {
        return Err(SubscriptionError::validation(format!(
            "{} cannot be empty",
            field_name
        )));
    }
    if value.len() > max_length {
        return Err(SubscriptionError::validation(format!(
            "{} must be at most {} characters",
            field_name, max_length
        )));
    }
    Ok(())
}

pub fn validate_service_name(name: &str) -> SubscriptionResult<()> {
    validate_string_length(name, "service_name", MAX_SERVICE_NAME_LENGTH)
}

pub fn validate_price(price: i64) -> SubscriptionResult<()> {
    if price < MIN_PRICE {
        return Err(SubscriptionError::validation(format!(
            "price must be at least {}",
            MIN_PRICE
        )));
    }
    Ok(())
}

/// Page/limit after defaulting, plus the row offset they imply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Non-positive page becomes 1, non-positive limit becomes the default, and
/// limit is capped at `MAX_LIST_LIMIT`.
pub fn normalize_pagination(page: i64, limit: i64) -> Pagination {
    let page = if page <= 0 { DEFAULT_PAGE } else { page };
    let limit = if limit <= 0 {
        DEFAULT_LIST_LIMIT
    } else {
        limit.min(MAX_LIST_LIMIT)
    };
    let offset = (page - 1).saturating_mul(limit);

    Pagination {
        page,
        limit,
        offset,
    }
}

/// Query-string integers are parsed leniently: garbage reads as 0, which
/// pagination then treats as "use the default".
pub fn parse_query_int(value: Option<&str>) -> i64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
