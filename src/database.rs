use anyhow::Result;
use libsql::{Builder, Database};
use std::{path::Path, sync::Arc};

use crate::constants::DATABASE_FILE_NAME;

const CREATE_SUBSCRIPTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS subscriptions (
    id            TEXT    PRIMARY KEY NOT NULL,
    service_name  TEXT    NOT NULL,
    price         INTEGER NOT NULL CHECK (price >= 1),
    user_id       TEXT    NOT NULL,
    start_date    TEXT    NOT NULL,
    end_date      TEXT,
    created_at    INTEGER NOT NULL,
    updated_at    INTEGER NOT NULL
);
"#;

const CREATE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_subscriptions_created_at ON subscriptions (created_at)";

/// Shared handle; every store operation opens its own connection from it.
pub type Db = Arc<Database>;

/// Opens (or creates) `subscriptions.db` under `data_dir` and ensures the schema exists.
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE_NAME);
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    conn.execute(CREATE_SUBSCRIPTIONS_TABLE, ()).await?;
    conn.execute(CREATE_CREATED_AT_INDEX, ()).await?;
    Ok(Arc::new(db))
}
