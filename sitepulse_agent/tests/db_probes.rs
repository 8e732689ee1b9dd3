//! Database-backed probes against an in-memory fake.
use async_trait::async_trait;
use sitepulse_agent::db::{
    buffer_pool_chain, db_size_chain, read_buffer_pool, read_counts, Database, SharedDatabase,
    TableStatus,
};
use sitepulse_agent::provider::{ProbeError, ResolveContext};
use sitepulse_agent::types::{BufferPool, Counts};
use std::collections::HashMap;
use std::sync::Arc;

const MB: u64 = 1024 * 1024;

#[derive(Default)]
struct FakeDb {
    tables: Vec<TableStatus>,
    variables: HashMap<&'static str, &'static str>,
    status: HashMap<&'static str, &'static str>,
    deny_variables: bool,
    fail_counts: bool,
}

#[async_trait]
impl Database for FakeDb {
    async fn table_status(&self, _prefix: &str) -> Result<Vec<TableStatus>, ProbeError> {
        Ok(self.tables.clone())
    }

    async fn global_variable(&self, name: &str) -> Result<Option<String>, ProbeError> {
        if self.deny_variables {
            return Err(ProbeError::Unavailable("access denied".into()));
        }
        Ok(self.variables.get(name).map(|v| v.to_string()))
    }

    async fn global_status(&self, name: &str) -> Result<Option<String>, ProbeError> {
        Ok(self.status.get(name).map(|v| v.to_string()))
    }

    async fn count_published(&self, _prefix: &str, post_type: &str) -> Result<u64, ProbeError> {
        if self.fail_counts {
            return Err(ProbeError::Unavailable("no posts table".into()));
        }
        Ok(if post_type == "post" { 12 } else { 3 })
    }

    async fn count_users(&self, _prefix: &str) -> Result<u64, ProbeError> {
        if self.fail_counts {
            return Err(ProbeError::Unavailable("no users table".into()));
        }
        Ok(2)
    }
}

fn pool_db() -> FakeDb {
    FakeDb {
        variables: HashMap::from([
            ("innodb_buffer_pool_size", "134217728"),
            ("innodb_page_size", "16384"),
        ]),
        status: HashMap::from([
            ("Innodb_buffer_pool_pages_data", "2048"),
            ("Innodb_buffer_pool_pages_total", "8192"),
        ]),
        ..FakeDb::default()
    }
}

#[tokio::test]
async fn buffer_pool_usage() {
    let bp = read_buffer_pool(&pool_db()).await;
    assert_eq!(
        bp,
        BufferPool::Usage {
            used_mb: 32.0,
            total_mb: 128.0,
            percent: 25.0
        }
    );
    assert_eq!(bp.formatted(), "32 / 128 MB (25%)");
}

#[tokio::test]
async fn buffer_pool_denied_is_a_value() {
    let db = FakeDb {
        deny_variables: true,
        ..pool_db()
    };
    let bp = read_buffer_pool(&db).await;
    assert_eq!(bp, BufferPool::PermissionDenied);
    assert_eq!(bp.formatted(), "Permission Denied");
    assert_eq!(bp.used_mb(), 0.0);
}

#[tokio::test]
async fn buffer_pool_without_page_counters() {
    let mut db = pool_db();
    db.status.clear();
    assert_eq!(
        read_buffer_pool(&db).await,
        BufferPool::AllocatedOnly { total_mb: 128.0 }
    );

    db.variables.clear();
    assert_eq!(read_buffer_pool(&db).await, BufferPool::Unavailable);
}

#[tokio::test]
async fn buffer_pool_chain_without_database() {
    let chain = buffer_pool_chain(None);
    assert_eq!(
        chain.resolve(&ResolveContext::default()).await,
        BufferPool::Unavailable
    );
}

#[tokio::test]
async fn db_size_sums_tables() {
    let db: SharedDatabase = Arc::new(FakeDb {
        tables: vec![
            TableStatus {
                data_length: 3 * MB,
                index_length: MB,
            },
            TableStatus {
                data_length: MB / 2,
                index_length: 0,
            },
        ],
        ..FakeDb::default()
    });
    let chain = db_size_chain(Some(db), "wp_");
    assert_eq!(chain.resolve(&ResolveContext::default()).await, 4.5);
}

#[tokio::test]
async fn db_size_is_zero_without_tables_or_database() {
    let empty: SharedDatabase = Arc::new(FakeDb::default());
    let ctx = ResolveContext::default();
    assert_eq!(db_size_chain(Some(empty), "wp_").resolve(&ctx).await, 0.0);
    assert_eq!(db_size_chain(None, "wp_").resolve(&ctx).await, 0.0);
}

#[tokio::test]
async fn counts_degrade_to_zero() {
    let ok = FakeDb::default();
    assert_eq!(
        read_counts(Some(&ok as &dyn Database), "wp_").await,
        Counts {
            posts: 12,
            pages: 3,
            users: 2
        }
    );
    let failing = FakeDb {
        fail_counts: true,
        ..FakeDb::default()
    };
    assert_eq!(read_counts(Some(&failing as &dyn Database), "wp_").await, Counts::default());
    assert_eq!(read_counts(None, "wp_").await, Counts::default());
}
