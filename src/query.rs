//! Parameterised statement assembly for the two queries whose shape depends on
//! the request: partial updates and the filtered price sum.
//!
//! Values never touch the SQL text. Each bound value gets the next positional
//! ordinal (`?1`, `?2`, ...) in the order clauses are appended.

use libsql::Value;
use uuid::Uuid;

use crate::error::{SubscriptionError, SubscriptionResult};
use crate::models::{EndDateUpdate, SummaryPayload, UpdateSubscriptionPayload};
use crate::month_year::MonthYear;
use crate::utils::{parse_uuid, validate_price, validate_service_name};

pub const TABLE: &str = "subscriptions";

/// Rendered SQL plus its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn into_parts(self) -> (String, libsql::params::Params) {
        (self.sql, libsql::params::Params::Positional(self.params))
    }
}

#[derive(Debug, Default)]
struct Binder {
    values: Vec<Value>,
}

impl Binder {
    fn bind(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("?{}", self.values.len())
    }
}

/// `UPDATE <table> SET a = ?1, b = ?2 ... WHERE <key> = ?N`
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    pub fn set(mut self, column: &'static str, value: Value) -> Self {
        self.assignments.push((column, value));
        self
    }

    pub fn build(self, key_column: &'static str, key: Value) -> Statement {
        let mut binder = Binder::default();
        let assignments: Vec<String> = self
            .assignments
            .into_iter()
            .map(|(column, value)| format!("{} = {}", column, binder.bind(value)))
            .collect();
        let key_placeholder = binder.bind(key);

        Statement {
            sql: format!(
                "UPDATE {} SET {} WHERE {} = {}",
                self.table,
                assignments.join(", "),
                key_column,
                key_placeholder
            ),
            params: binder.values,
        }
    }
}

/// Builds the partial update for one subscription.
///
/// `updated_at` is always the first assignment; then `service_name`, `price`,
/// `end_date` in that order, each only when the request supplies it.
pub fn build_update(
    id: Uuid,
    update: &UpdateSubscriptionPayload,
    updated_at_nanos: i64,
) -> SubscriptionResult<Statement> {
    let mut builder = UpdateBuilder::new(TABLE).set("updated_at", Value::Integer(updated_at_nanos));

    if let Some(name) = &update.service_name {
        validate_service_name(name)?;
        builder = builder.set("service_name", Value::Text(name.clone()));
    }

    if let Some(price) = update.price {
        validate_price(price)?;
        builder = builder.set("price", Value::Integer(price));
    }

    match &update.end_date {
        EndDateUpdate::Unchanged => {}
        EndDateUpdate::Clear => builder = builder.set("end_date", Value::Null),
        EndDateUpdate::Set(raw) => {
            let end_date = MonthYear::parse(raw)
                .map_err(|_| SubscriptionError::validation(format!("invalid end_date: {raw:?}")))?;
            builder = builder.set("end_date", Value::Text(end_date.to_storage()));
        }
    }

    Ok(builder.build("id", Value::Text(id.to_string())))
}

/// `SELECT COALESCE(SUM(<column>), 0) FROM <table> WHERE ...` with conjunctive predicates.
#[derive(Debug, Default)]
pub struct SumQuery {
    binder: Binder,
    predicates: Vec<String>,
}

impl SumQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate; `{}` in `template` is replaced by the next placeholder
    /// for each value, in order.
    ///
    /// Panics if the number of `{}` markers differs from the number of values.
    pub fn and_where(mut self, template: &str, values: Vec<Value>) -> Self {
        let markers = template.matches("{}").count();
        assert_eq!(
            markers,
            values.len(),
            "predicate {template:?} has {markers} placeholders but {} values",
            values.len()
        );

        let mut rendered = String::with_capacity(template.len() + 4 * values.len());
        let mut pieces = template.split("{}");
        if let Some(first) = pieces.next() {
            rendered.push_str(first);
        }
        for (value, piece) in values.into_iter().zip(pieces) {
            rendered.push_str(&self.binder.bind(value));
            rendered.push_str(piece);
        }
        self.predicates.push(rendered);
        self
    }

    pub fn and_eq(self, column: &str, value: Value) -> Self {
        self.and_where(&format!("{column} = {{}}"), vec![value])
    }

    pub fn build(self, table: &str, column: &str) -> Statement {
        let mut sql = format!("SELECT COALESCE(SUM({column}), 0) FROM {table}");
        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        Statement {
            sql,
            params: self.binder.values,
        }
    }
}

/// Builds the summary query: subscriptions whose active interval intersects
/// `[start_date, end_date]`, where a missing `end_date` means still active.
pub fn build_summary(request: &SummaryPayload) -> SubscriptionResult<Statement> {
    let window_start = MonthYear::parse(&request.start_date).map_err(|_| {
        SubscriptionError::validation(format!("invalid start_date: {:?}", request.start_date))
    })?;
    let window_end = MonthYear::parse(&request.end_date).map_err(|_| {
        SubscriptionError::validation(format!("invalid end_date: {:?}", request.end_date))
    })?;
    // An inverted window is a client error, even though the overlap predicate
    // would still match subscriptions spanning both months.
    if window_end < window_start {
        return Err(SubscriptionError::validation(
            "end_date must not be before start_date",
        ));
    }

    let mut query = SumQuery::new().and_where(
        "start_date <= {} AND (end_date IS NULL OR end_date >= {})",
        vec![
            Value::Text(window_end.to_storage()),
            Value::Text(window_start.to_storage()),
        ],
    );

    if let Some(user_id) = &request.user_id {
        let user_id = parse_uuid(user_id, "user_id")?;
        query = query.and_eq("user_id", Value::Text(user_id.to_string()));
    }

    if let Some(service_name) = &request.service_name {
        query = query.and_eq("service_name", Value::Text(service_name.clone()));
    }

    Ok(query.build(TABLE, "price"))
}
