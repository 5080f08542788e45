//! Persistence for subscriptions.
//!
//! Every operation is a single statement on its own connection, bounded by the
//! configured query timeout. Dropping a returned future abandons the statement.

use async_trait::async_trait;
use libsql::{Connection, Row, Value};
use std::{future::Future, time::Duration};
use time::OffsetDateTime;
use tokio::time::timeout;
use tracing::{Span, debug, warn};
use uuid::Uuid;

use crate::database::Db;
use crate::error::{StoreFailure, SubscriptionError, SubscriptionResult};
use crate::models::{NewSubscription, Subscription, SummaryPayload, UpdateSubscriptionPayload};
use crate::month_year::MonthYear;
use crate::query::{build_summary, build_update};

const SELECT_COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Inserts a row with a fresh id and `created_at == updated_at == now`.
    async fn create(&self, new: NewSubscription) -> SubscriptionResult<Subscription>;

    async fn get_by_id(&self, id: Uuid) -> SubscriptionResult<Subscription>;

    /// Applies a partial update; returns the number of rows touched.
    async fn update(&self, id: Uuid, update: &UpdateSubscriptionPayload) -> SubscriptionResult<u64>;

    /// Hard delete; returns the number of rows removed.
    async fn delete(&self, id: Uuid) -> SubscriptionResult<u64>;

    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> SubscriptionResult<Vec<Subscription>>;

    async fn get_summary(&self, request: &SummaryPayload) -> SubscriptionResult<i64>;
}

#[derive(Clone)]
pub struct LibsqlSubscriptionStore {
    db: Db,
    query_timeout: Duration,
    span: Span,
}

impl LibsqlSubscriptionStore {
    pub fn new(db: Db, query_timeout: Duration, span: Span) -> Self {
        Self {
            db,
            query_timeout,
            span,
        }
    }

    /// Opens a connection for one statement. SQLite lock contention waits at
    /// most the query timeout.
    fn connect(&self, operation: &'static str) -> SubscriptionResult<Connection> {
        let conn = self.db.connect().map_err(db_error(operation))?;
        conn.busy_timeout(self.query_timeout)
            .map_err(db_error(operation))?;
        Ok(conn)
    }

    async fn run<T, F>(&self, operation: &'static str, fut: F) -> SubscriptionResult<T>
    where
        F: Future<Output = SubscriptionResult<T>>,
    {
        bounded(operation, self.query_timeout, &self.span, fut).await
    }
}

/// Runs `fut` with a deadline, mapping expiry to `StoreFailure::TimedOut`.
async fn bounded<T, F>(
    operation: &'static str,
    limit: Duration,
    span: &Span,
    fut: F,
) -> SubscriptionResult<T>
where
    F: Future<Output = SubscriptionResult<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(parent: span, operation, timeout = ?limit, "Store statement timed out");
            Err(SubscriptionError::store(operation, StoreFailure::TimedOut(limit)))
        }
    }
}

fn db_error(operation: &'static str) -> impl Fn(libsql::Error) -> SubscriptionError {
    move |e| SubscriptionError::store(operation, e)
}

fn now_nanos() -> Result<i64, StoreFailure> {
    let now = OffsetDateTime::now_utc();
    i64::try_from(now.unix_timestamp_nanos())
        .map_err(|_| StoreFailure::CorruptRow(format!("timestamp out of range: {now}")))
}

fn timestamp_from_nanos(nanos: i64) -> Result<OffsetDateTime, StoreFailure> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
        .map_err(|e| StoreFailure::CorruptRow(format!("invalid timestamp {nanos}: {e}")))
}

fn corrupt(column: &str) -> impl Fn(libsql::Error) -> StoreFailure + '_ {
    move |e| StoreFailure::CorruptRow(format!("failed to read {column}: {e}"))
}

fn uuid_column(row: &Row, idx: i32, column: &str) -> Result<Uuid, StoreFailure> {
    let raw: String = row.get(idx).map_err(corrupt(column))?;
    Uuid::parse_str(&raw).map_err(|e| StoreFailure::CorruptRow(format!("{column} {raw:?}: {e}")))
}

fn month_column(value: &str, column: &str) -> Result<MonthYear, StoreFailure> {
    MonthYear::from_storage(value)
        .ok_or_else(|| StoreFailure::CorruptRow(format!("{column} {value:?} is not a stored month")))
}

/// Maps a row selected with `SELECT_COLUMNS`.
pub fn extract_subscription_from_row(row: &Row) -> Result<Subscription, StoreFailure> {
    let id = uuid_column(row, 0, "id")?;
    let service_name: String = row.get(1).map_err(corrupt("service_name"))?;
    let price: i64 = row.get(2).map_err(corrupt("price"))?;
    let user_id = uuid_column(row, 3, "user_id")?;
    let start_date: String = row.get(4).map_err(corrupt("start_date"))?;
    let end_date = match row.get_value(5).map_err(corrupt("end_date"))? {
        Value::Null => None,
        Value::Text(value) => Some(month_column(&value, "end_date")?),
        other => {
            return Err(StoreFailure::CorruptRow(format!(
                "end_date has unexpected type: {other:?}"
            )));
        }
    };
    let created_at: i64 = row.get(6).map_err(corrupt("created_at"))?;
    let updated_at: i64 = row.get(7).map_err(corrupt("updated_at"))?;

    Ok(Subscription {
        id,
        service_name,
        price,
        user_id,
        start_date: month_column(&start_date, "start_date")?,
        end_date,
        created_at: timestamp_from_nanos(created_at)?,
        updated_at: timestamp_from_nanos(updated_at)?,
    })
}

#[async_trait]
impl SubscriptionStore for LibsqlSubscriptionStore {
    async fn create(&self, new: NewSubscription) -> SubscriptionResult<Subscription> {
        const OP: &str = "create_subscription";
        self.run(OP, async {
            let nanos = now_nanos().map_err(|e| SubscriptionError::store(OP, e))?;
            let stamp = timestamp_from_nanos(nanos).map_err(|e| SubscriptionError::store(OP, e))?;

            let subscription = Subscription {
                id: Uuid::new_v4(),
                service_name: new.service_name,
                price: new.price,
                user_id: new.user_id,
                start_date: new.start_date,
                end_date: new.end_date,
                created_at: stamp,
                updated_at: stamp,
            };

            let params = vec![
                Value::Text(subscription.id.to_string()),
                Value::Text(subscription.service_name.clone()),
                Value::Integer(subscription.price),
                Value::Text(subscription.user_id.to_string()),
                Value::Text(subscription.start_date.to_storage()),
                subscription
                    .end_date
                    .map(|d| Value::Text(d.to_storage()))
                    .unwrap_or(Value::Null),
                Value::Integer(nanos),
                Value::Integer(nanos),
            ];

            let conn = self.connect(OP)?;
            conn.execute(
                "INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params::Params::Positional(params),
            )
            .await
            .map_err(db_error(OP))?;

            debug!(parent: &self.span, operation = OP, id = %subscription.id, "Inserted subscription row");
            Ok(subscription)
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> SubscriptionResult<Subscription> {
        const OP: &str = "get_subscription";
        self.run(OP, async {
            let conn = self.connect(OP)?;
            let id_text = id.to_string();
            let mut rows = conn
                .query(
                    &format!("SELECT {SELECT_COLUMNS} FROM subscriptions WHERE id = ?1"),
                    [id_text.as_str()],
                )
                .await
                .map_err(db_error(OP))?;

            match rows.next().await.map_err(db_error(OP))? {
                Some(row) => {
                    extract_subscription_from_row(&row).map_err(|e| SubscriptionError::store(OP, e))
                }
                None => Err(SubscriptionError::NotFound(id)),
            }
        })
        .await
    }

    async fn update(&self, id: Uuid, update: &UpdateSubscriptionPayload) -> SubscriptionResult<u64> {
        const OP: &str = "update_subscription";
        let nanos = now_nanos().map_err(|e| SubscriptionError::store(OP, e))?;
        let (sql, params) = build_update(id, update, nanos)?.into_parts();
        debug!(parent: &self.span, operation = OP, %id, sql = %sql, "Built partial update");

        self.run(OP, async {
            let conn = self.connect(OP)?;
            conn.execute(&sql, params).await.map_err(db_error(OP))
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> SubscriptionResult<u64> {
        const OP: &str = "delete_subscription";
        self.run(OP, async {
            let conn = self.connect(OP)?;
            let id_text = id.to_string();
            conn.execute("DELETE FROM subscriptions WHERE id = ?1", [id_text.as_str()])
                .await
                .map_err(db_error(OP))
        })
        .await
    }

    async fn list(&self, limit: i64, offset: i64) -> SubscriptionResult<Vec<Subscription>> {
        const OP: &str = "list_subscriptions";
        self.run(OP, async {
            let conn = self.connect(OP)?;
            let mut rows = conn
                .query(
                    &format!(
                        "SELECT {SELECT_COLUMNS} FROM subscriptions ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
                    ),
                    (limit, offset),
                )
                .await
                .map_err(db_error(OP))?;

            let mut subscriptions = Vec::new();
            while let Some(row) = rows.next().await.map_err(db_error(OP))? {
                subscriptions.push(
                    extract_subscription_from_row(&row)
                        .map_err(|e| SubscriptionError::store(OP, e))?,
                );
            }
            Ok(subscriptions)
        })
        .await
    }

    async fn get_summary(&self, request: &SummaryPayload) -> SubscriptionResult<i64> {
        const OP: &str = "get_summary";
        let (sql, params) = build_summary(request)?.into_parts();
        debug!(parent: &self.span, operation = OP, sql = %sql, "Built summary query");

        self.run(OP, async {
            let conn = self.connect(OP)?;
            let mut rows = conn.query(&sql, params).await.map_err(db_error(OP))?;
            match rows.next().await.map_err(db_error(OP))? {
                Some(row) => row
                    .get::<i64>(0)
                    .map_err(|e| SubscriptionError::store(OP, corrupt("total")(e))),
                None => Ok(0),
            }
        })
        .await
    }
}
