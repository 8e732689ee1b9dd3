//! Application database probes (MySQL/MariaDB): table footprint, InnoDB
//! buffer-pool usage and content counts.

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use std::sync::Arc;
use std::time::Duration;

use crate::host::round_to;
use crate::provider::{ProbeError, Provider, ProviderChain, ResolveContext};
use crate::types::{BufferPool, Counts};

const MB: f64 = 1024.0 * 1024.0;

/// Per-table storage footprint in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStatus {
    pub data_length: u64,
    pub index_length: u64,
}

/// The queries the resolver needs from the application database.
#[async_trait]
pub trait Database: Send + Sync {
    /// Tables whose name starts with `prefix`.
    async fn table_status(&self, prefix: &str) -> Result<Vec<TableStatus>, ProbeError>;
    async fn global_variable(&self, name: &str) -> Result<Option<String>, ProbeError>;
    async fn global_status(&self, name: &str) -> Result<Option<String>, ProbeError>;
    async fn count_published(&self, prefix: &str, post_type: &str) -> Result<u64, ProbeError>;
    async fn count_users(&self, prefix: &str) -> Result<u64, ProbeError>;
}

pub type SharedDatabase = Arc<dyn Database>;

/// Escape LIKE wildcards so `wp_` matches literally.
pub fn like_prefix(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + 4);
    for c in prefix.chars() {
        if matches!(c, '_' | '%' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

// MySQL reports these as unsigned, MariaDB sometimes as signed.
fn column_u64(row: &MySqlRow, name: &str) -> u64 {
    row.try_get::<Option<u64>, _>(name)
        .ok()
        .flatten()
        .or_else(|| {
            row.try_get::<Option<i64>, _>(name)
                .ok()
                .flatten()
                .map(|v| v.max(0) as u64)
        })
        .unwrap_or(0)
}

// SHOW VARIABLES values arrive as text or, with binary collations, as bytes.
fn column_text(row: &MySqlRow, name: &str) -> Option<String> {
    row.try_get::<String, _>(name).ok().or_else(|| {
        row.try_get::<Vec<u8>, _>(name)
            .ok()
            .map(|b| String::from_utf8_lossy(&b).into_owned())
    })
}

pub struct MySqlDatabase {
    pool: MySqlPool,
}

impl MySqlDatabase {
    /// Lazily connected pool; nothing touches the network until the first probe.
    pub fn connect_lazy(url: &str) -> Result<Self, ProbeError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(3))
            .connect_lazy(url)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    async fn table_status(&self, prefix: &str) -> Result<Vec<TableStatus>, ProbeError> {
        let rows = sqlx::query("SHOW TABLE STATUS LIKE ?")
            .bind(like_prefix(prefix))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|r| TableStatus {
                data_length: column_u64(r, "Data_length"),
                index_length: column_u64(r, "Index_length"),
            })
            .collect())
    }

    async fn global_variable(&self, name: &str) -> Result<Option<String>, ProbeError> {
        let row = sqlx::query("SHOW GLOBAL VARIABLES LIKE ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().and_then(|r| column_text(r, "Value")))
    }

    async fn global_status(&self, name: &str) -> Result<Option<String>, ProbeError> {
        let row = sqlx::query("SHOW GLOBAL STATUS LIKE ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().and_then(|r| column_text(r, "Value")))
    }

    async fn count_published(&self, prefix: &str, post_type: &str) -> Result<u64, ProbeError> {
        // prefix is validated as [A-Za-z0-9_]+ at startup
        let sql = format!(
            "SELECT COUNT(*) FROM `{prefix}posts` WHERE post_type = ? AND post_status = 'publish'"
        );
        let n: i64 = sqlx::query_scalar(&sql)
            .bind(post_type)
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }

    async fn count_users(&self, prefix: &str) -> Result<u64, ProbeError> {
        let sql = format!("SELECT COUNT(*) FROM `{prefix}users`");
        let n: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(n.max(0) as u64)
    }
}

// ---------- providers ----------

pub struct TableFootprint {
    pub db: SharedDatabase,
    pub prefix: String,
}

#[async_trait]
impl Provider<f64> for TableFootprint {
    fn name(&self) -> &'static str {
        "table_status"
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<f64, ProbeError> {
        let tables = self.db.table_status(&self.prefix).await?;
        if tables.is_empty() {
            return Err(ProbeError::Unavailable(format!("no tables with prefix {}", self.prefix)));
        }
        let bytes: u64 = tables
            .iter()
            .map(|t| t.data_length.saturating_add(t.index_length))
            .sum();
        Ok(round_to(bytes as f64 / MB, 2))
    }
}

pub fn db_size_chain(db: Option<SharedDatabase>, prefix: &str) -> ProviderChain<f64> {
    let chain = ProviderChain::new("db_size", |_| 0.0);
    match db {
        Some(db) => chain.with(TableFootprint {
            db,
            prefix: prefix.to_string(),
        }),
        None => chain,
    }
}

fn as_number(v: Option<String>) -> f64 {
    v.and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

/// Buffer-pool reading from the allocated size plus page counters. A failing
/// allocated-size query means the account lacks the privilege and yields
/// [`BufferPool::PermissionDenied`] rather than an error.
pub async fn read_buffer_pool(db: &dyn Database) -> BufferPool {
    let total_bytes = match db.global_variable("innodb_buffer_pool_size").await {
        Ok(v) => as_number(v),
        Err(_) => return BufferPool::PermissionDenied,
    };
    let total_mb = if total_bytes > 0.0 {
        round_to(total_bytes / MB, 2)
    } else {
        0.0
    };

    let used_pages = as_number(db.global_status("Innodb_buffer_pool_pages_data").await.ok().flatten());
    let total_pages = as_number(db.global_status("Innodb_buffer_pool_pages_total").await.ok().flatten());
    let page_size = as_number(db.global_variable("innodb_page_size").await.ok().flatten());

    if total_pages <= 0.0 || page_size <= 0.0 {
        return if total_mb > 0.0 {
            BufferPool::AllocatedOnly { total_mb }
        } else {
            BufferPool::Unavailable
        };
    }

    BufferPool::Usage {
        used_mb: round_to(used_pages * page_size / MB, 2),
        total_mb,
        percent: round_to(used_pages / total_pages * 100.0, 1).clamp(0.0, 100.0),
    }
}

pub struct InnoDbBufferPool {
    pub db: SharedDatabase,
}

#[async_trait]
impl Provider<BufferPool> for InnoDbBufferPool {
    fn name(&self) -> &'static str {
        "innodb_buffer_pool"
    }

    async fn read(&self, _ctx: &ResolveContext) -> Result<BufferPool, ProbeError> {
        Ok(read_buffer_pool(self.db.as_ref()).await)
    }
}

pub fn buffer_pool_chain(db: Option<SharedDatabase>) -> ProviderChain<BufferPool> {
    let chain = ProviderChain::new("mysql_buffer", |_| BufferPool::Unavailable);
    match db {
        Some(db) => chain.with(InnoDbBufferPool { db }),
        None => chain,
    }
}

/// Published posts, published pages and registered users; a count that
/// cannot be read is 0.
pub async fn read_counts(db: Option<&dyn Database>, prefix: &str) -> Counts {
    let Some(db) = db else {
        return Counts::default();
    };
    Counts {
        posts: db.count_published(prefix, "post").await.unwrap_or(0),
        pages: db.count_published(prefix, "page").await.unwrap_or(0),
        users: db.count_users(prefix).await.unwrap_or(0),
    }
}
