use crate::llm::ProviderKind;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Durable request counters: one per provider tier plus the total.
/// Invariant: `total` equals the sum of the per-tier counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSnapshot {
    pub openai: i64,
    pub ollama: i64,
    pub huggingface: i64,
    pub cohere: i64,
    pub keyword: i64,
    pub total: i64,
    pub updated_at: DateTime<Utc>,
}

impl BudgetSnapshot {
    pub fn zero() -> Self {
        Self {
            openai: 0,
            ollama: 0,
            huggingface: 0,
            cohere: 0,
            keyword: 0,
            total: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn count(&self, kind: ProviderKind) -> i64 {
        match kind {
            ProviderKind::OpenAi => self.openai,
            ProviderKind::Ollama => self.ollama,
            ProviderKind::HuggingFace => self.huggingface,
            ProviderKind::Cohere => self.cohere,
            ProviderKind::Keyword => self.keyword,
        }
    }

    fn bump(&mut self, kind: ProviderKind) {
        match kind {
            ProviderKind::OpenAi => self.openai += 1,
            ProviderKind::Ollama => self.ollama += 1,
            ProviderKind::HuggingFace => self.huggingface += 1,
            ProviderKind::Cohere => self.cohere += 1,
            ProviderKind::Keyword => self.keyword += 1,
        }
        self.total += 1;
        self.updated_at = Utc::now();
    }
}

/// Injected accounting service. Increments must be atomic per counter so
/// concurrent requests never lose updates.
#[async_trait::async_trait]
pub trait BudgetStore: Send + Sync {
    async fn snapshot(&self) -> anyhow::Result<BudgetSnapshot>;

    /// Records one completed attempt for `kind` and returns the counters
    /// after the increment.
    async fn record(&self, kind: ProviderKind) -> anyhow::Result<BudgetSnapshot>;

    async fn reset(&self) -> anyhow::Result<()>;
}

/// Postgres-backed store: a single upsertable row, incremented with an
/// atomic `ON CONFLICT DO UPDATE` so there is no read-modify-write window.
#[derive(Debug, Clone)]
pub struct PgBudgetStore {
    pool: sqlx::PgPool,
}

type CounterRow = (i64, i64, i64, i64, i64, i64, DateTime<Utc>);

const SELECT_COUNTERS: &str = "SELECT openai, ollama, huggingface, cohere, keyword, total, updated_at \
     FROM request_log WHERE id";

impl PgBudgetStore {
    /// Loads the counter row, inserting the all-zero row if absent.
    pub async fn load_or_init(pool: sqlx::PgPool) -> anyhow::Result<Self> {
        sqlx::query("INSERT INTO request_log (id) VALUES (TRUE) ON CONFLICT (id) DO NOTHING")
            .execute(&pool)
            .await
            .context("failed to initialize request_log row")?;
        let store = Self { pool };
        let snapshot = store.snapshot().await?;
        tracing::info!(total = snapshot.total, "loaded request counters");
        Ok(store)
    }

    fn column(kind: ProviderKind) -> &'static str {
        // Remote tiers map to their own columns; local fallbacks share
        // the keyword column (the durable record keeps five counters).
        match kind {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Cohere => "cohere",
            ProviderKind::Keyword => "keyword",
        }
    }

    fn snapshot_from_row(row: CounterRow) -> BudgetSnapshot {
        let (openai, ollama, huggingface, cohere, keyword, total, updated_at) = row;
        BudgetSnapshot {
            openai,
            ollama,
            huggingface,
            cohere,
            keyword,
            total,
            updated_at,
        }
    }
}

#[async_trait::async_trait]
impl BudgetStore for PgBudgetStore {
    async fn snapshot(&self) -> anyhow::Result<BudgetSnapshot> {
        let row: CounterRow = sqlx::query_as(SELECT_COUNTERS)
            .fetch_one(&self.pool)
            .await
            .context("failed to read request_log")?;
        Ok(Self::snapshot_from_row(row))
    }

    async fn record(&self, kind: ProviderKind) -> anyhow::Result<BudgetSnapshot> {
        let col = Self::column(kind);
        let sql = format!(
            "INSERT INTO request_log (id, {col}, total) VALUES (TRUE, 1, 1) \
             ON CONFLICT (id) DO UPDATE SET \
             {col} = request_log.{col} + 1, \
             total = request_log.total + 1, \
             updated_at = now() \
             RETURNING openai, ollama, huggingface, cohere, keyword, total, updated_at"
        );
        let row: CounterRow = sqlx::query_as(&sql)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("failed to increment request_log.{col}"))?;
        Ok(Self::snapshot_from_row(row))
    }

    async fn reset(&self) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE request_log SET openai = 0, ollama = 0, huggingface = 0, \
             cohere = 0, keyword = 0, total = 0, updated_at = now() WHERE id",
        )
        .execute(&self.pool)
        .await
        .context("failed to reset request_log")?;
        Ok(())
    }
}

/// In-memory store for tests and for running without a database.
#[derive(Debug, Default)]
pub struct MemoryBudgetStore {
    inner: tokio::sync::Mutex<Option<BudgetSnapshot>>,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BudgetStore for MemoryBudgetStore {
    async fn snapshot(&self) -> anyhow::Result<BudgetSnapshot> {
        let mut guard = self.inner.lock().await;
        Ok(guard.get_or_insert_with(BudgetSnapshot::zero).clone())
    }

    async fn record(&self, kind: ProviderKind) -> anyhow::Result<BudgetSnapshot> {
        let mut guard = self.inner.lock().await;
        let snapshot = guard.get_or_insert_with(BudgetSnapshot::zero);
        snapshot.bump(kind);
        Ok(snapshot.clone())
    }

    async fn reset(&self) -> anyhow::Result<()> {
        let mut guard = self.inner.lock().await;
        *guard = Some(BudgetSnapshot::zero());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_keeps_total_in_sync() {
        let store = MemoryBudgetStore::new();
        store.record(ProviderKind::OpenAi).await.unwrap();
        store.record(ProviderKind::Keyword).await.unwrap();
        let snap = store.record(ProviderKind::Keyword).await.unwrap();

        assert_eq!(snap.openai, 1);
        assert_eq!(snap.keyword, 2);
        assert_eq!(snap.total, 3);
        assert_eq!(
            snap.total,
            snap.openai + snap.ollama + snap.huggingface + snap.cohere + snap.keyword
        );
    }

    #[tokio::test]
    async fn memory_store_reset_zeroes_counters() {
        let store = MemoryBudgetStore::new();
        store.record(ProviderKind::Cohere).await.unwrap();
        store.reset().await.unwrap();
        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.total, 0);
        assert_eq!(snap.cohere, 0);
    }
}
