#![allow(dead_code)]

use std::{sync::Arc, time::Duration};
use subscription_tracker::database::{Db, init_db};
use subscription_tracker::models::{CreateSubscriptionPayload, Subscription, SummaryPayload};
use subscription_tracker::service::SubscriptionService;
use subscription_tracker::store::LibsqlSubscriptionStore;
use tempfile::{TempDir, tempdir};
use tracing::Span;
use uuid::Uuid;

pub const TEST_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn setup_test_environment() -> (SubscriptionService, Db, TempDir) {
    setup_with_timeout(TEST_QUERY_TIMEOUT).await
}

pub async fn setup_with_timeout(query_timeout: Duration) -> (SubscriptionService, Db, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();

    let db = init_db(&data_path)
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize database at {}: {}", data_path, e));

    let store = LibsqlSubscriptionStore::new(db.clone(), query_timeout, Span::none());
    let service = SubscriptionService::new(Arc::new(store), Span::none());

    (service, db, temp_dir)
}

pub fn create_payload(
    service_name: &str,
    price: i64,
    user_id: Uuid,
    start_date: &str,
    end_date: Option<&str>,
) -> CreateSubscriptionPayload {
    CreateSubscriptionPayload {
        service_name: service_name.to_string(),
        price,
        user_id: user_id.to_string(),
        start_date: start_date.to_string(),
        end_date: end_date.map(str::to_string),
    }
}

pub async fn create_test_subscription(
    service: &SubscriptionService,
    service_name: &str,
    price: i64,
    user_id: Uuid,
    start_date: &str,
    end_date: Option<&str>,
) -> Subscription {
    service
        .create(create_payload(
            service_name,
            price,
            user_id,
            start_date,
            end_date,
        ))
        .await
        .unwrap_or_else(|e| panic!("Failed to create test subscription '{}': {}", service_name, e))
}

pub fn summary_payload(start_date: &str, end_date: &str) -> SummaryPayload {
    SummaryPayload {
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        user_id: None,
        service_name: None,
    }
}

pub async fn count_rows(db: &Db) -> i64 {
    let conn = db.connect().expect("Failed to open connection");
    let mut rows = conn
        .query("SELECT COUNT(*) FROM subscriptions", ())
        .await
        .expect("Failed to execute count query");

    if let Some(row) = rows.next().await.expect("Failed to read count row") {
        row.get(0).expect("Failed to get count value")
    } else {
        0
    }
}

pub async fn raw_end_date(db: &Db, id: Uuid) -> Option<String> {
    let conn = db.connect().expect("Failed to open connection");
    let id_text = id.to_string();
    let mut rows = conn
        .query(
            "SELECT end_date FROM subscriptions WHERE id = ?1",
            [id_text.as_str()],
        )
        .await
        .expect("Failed to execute end_date query");

    let row = rows
        .next()
        .await
        .expect("Failed to read end_date row")
        .expect("Subscription row missing");
    match row.get_value(0).expect("Failed to get end_date value") {
        libsql::Value::Text(value) => Some(value),
        _ => None,
    }
}
