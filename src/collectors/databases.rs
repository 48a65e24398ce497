use crate::collectors::round2;
use crate::config::DatabaseConfig;
use serde::Serialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Row};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Engine-internal schemas that never represent user data.
pub const SYSTEM_SCHEMAS: [&str; 4] = ["information_schema", "mysql", "performance_schema", "sys"];

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseSummary {
    pub name: String,
    pub table_count: u64,
    pub size_megabytes: f64,
}

/// Inventories user databases on the configured server. Connectivity
/// failure is an expected outage, not an error: it is logged and an
/// empty inventory is returned so the page still renders. A database
/// that fails introspection is skipped, the rest are kept.
pub async fn collect_databases(cfg: &DatabaseConfig) -> BTreeMap<String, DatabaseSummary> {
    let mut conn = match connect(cfg).await {
        Some(conn) => conn,
        None => return BTreeMap::new(),
    };

    let names = match list_database_names(&mut conn).await {
        Ok(names) => names,
        Err(err) => {
            warn!(host = %cfg.host, error = %err, "failed to list databases");
            let _ = conn.close().await;
            return BTreeMap::new();
        }
    };

    let mut inventory = BTreeMap::new();
    for name in user_databases(names) {
        match summarize_database(&mut conn, &name).await {
            Ok(summary) => {
                inventory.insert(name, summary);
            }
            Err(err) => {
                warn!(database = %name, error = %err, "skipping database after introspection failure");
            }
        }
    }

    let _ = conn.close().await;
    inventory
}

async fn connect(cfg: &DatabaseConfig) -> Option<MySqlConnection> {
    let options = MySqlConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.resolved_password());

    let timeout = Duration::from_millis(cfg.connect_timeout_ms);
    match tokio::time::timeout(timeout, MySqlConnection::connect_with(&options)).await {
        Ok(Ok(conn)) => Some(conn),
        Ok(Err(err)) => {
            warn!(host = %cfg.host, port = cfg.port, error = %err, "database connection failed");
            None
        }
        Err(_) => {
            warn!(host = %cfg.host, port = cfg.port, timeout_ms = cfg.connect_timeout_ms, "database connection timed out");
            None
        }
    }
}

async fn list_database_names(conn: &mut MySqlConnection) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query("SHOW DATABASES").fetch_all(conn).await?;
    Ok(rows.iter().map(|row| row.get::<String, _>(0)).collect())
}

/// Keeps only user schemas, preserving server enumeration order.
fn user_databases(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !SYSTEM_SCHEMAS.contains(&name.as_str()))
        .collect()
}

async fn summarize_database(
    conn: &mut MySqlConnection,
    name: &str,
) -> Result<DatabaseSummary, sqlx::Error> {
    let table_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;

    // SUM over an empty schema is NULL; always attempted, even with
    // zero tables.
    let size_bytes: Option<f64> = sqlx::query_scalar(
        "SELECT CAST(SUM(data_length + index_length) AS DOUBLE) \
         FROM information_schema.tables WHERE table_schema = ?",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(summary_from_counts(name, table_count, size_bytes))
}

fn summary_from_counts(name: &str, table_count: i64, size_bytes: Option<f64>) -> DatabaseSummary {
    DatabaseSummary {
        name: name.to_string(),
        table_count: table_count.max(0) as u64,
        size_megabytes: round2(size_bytes.unwrap_or(0.0).max(0.0) / 1024.0 / 1024.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    #[test]
    fn system_schemas_are_filtered_out() {
        let names = vec![
            "information_schema".to_string(),
            "shop".to_string(),
            "mysql".to_string(),
            "performance_schema".to_string(),
            "blog".to_string(),
            "sys".to_string(),
        ];
        assert_eq!(user_databases(names), ["shop", "blog"]);
    }

    #[test]
    fn summary_rounds_size_to_two_decimals() {
        let summary = summary_from_counts("shop", 5, Some(12.3456 * 1024.0 * 1024.0));
        assert_eq!(summary.name, "shop");
        assert_eq!(summary.table_count, 5);
        assert_eq!(summary.size_megabytes, 12.35);
    }

    #[test]
    fn empty_database_reports_zero_size() {
        let summary = summary_from_counts("testdb", 0, None);
        assert_eq!(summary.table_count, 0);
        assert_eq!(summary.size_megabytes, 0.0);
    }

    #[test]
    fn negative_raw_values_clamp_to_zero() {
        let summary = summary_from_counts("odd", -3, Some(-1024.0));
        assert_eq!(summary.table_count, 0);
        assert_eq!(summary.size_megabytes, 0.0);
    }

    #[tokio::test]
    async fn unreachable_server_yields_empty_inventory() {
        let cfg = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            // Reserved port nothing listens on.
            port: 1,
            user: "root".to_string(),
            password: String::new(),
            password_env: "DEVDASH_TEST_NO_SUCH_PASSWORD".to_string(),
            connect_timeout_ms: 500,
        };
        let inventory = collect_databases(&cfg).await;
        assert!(inventory.is_empty());
    }
}
