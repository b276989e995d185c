//! Checkpoint storage. One row per executed node; the newest row of a thread
//! is the state a new invocation starts from.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::workflow::graph::{GraphKind, NodeId};
use crate::workflow::state::WorkflowState;

#[derive(Debug, Clone, Serialize)]
pub struct Checkpoint {
    pub thread_id: String,
    pub checkpoint_id: Uuid,
    /// Strictly increasing per thread.
    pub seq: i64,
    pub graph: GraphKind,
    /// The node that just ran (or the interrupt that paused the run).
    pub node: NodeId,
    /// Where the next invocation resumes. None once the run reached END.
    pub next: Option<NodeId>,
    pub state: WorkflowState,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(
        thread_id: &str,
        seq: i64,
        graph: GraphKind,
        node: NodeId,
        next: Option<NodeId>,
        state: WorkflowState,
    ) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            checkpoint_id: Uuid::new_v4(),
            seq,
            graph,
            node,
            next,
            state,
            created_at: Utc::now(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn put(&self, checkpoint: Checkpoint) -> Result<()>;

    async fn latest(&self, thread_id: &str) -> Result<Option<Checkpoint>>;

    /// Oldest first.
    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>>;

    /// Returns how many checkpoints were removed.
    async fn clear(&self, thread_id: &str) -> Result<u64>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryCheckpointer: default, process-local
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryCheckpointer {
    threads: RwLock<HashMap<String, Vec<Checkpoint>>>,
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for MemoryCheckpointer {
    async fn put(&self, checkpoint: Checkpoint) -> Result<()> {
        let mut threads = self.threads.write().await;
        let history = threads.entry(checkpoint.thread_id.clone()).or_default();

        if let Some(last) = history.last() {
            if checkpoint.seq <= last.seq {
                bail!(
                    "Checkpoint seq {} for thread '{}' does not follow {}",
                    checkpoint.seq,
                    checkpoint.thread_id,
                    last.seq
                );
            }
        }

        debug!(
            "Checkpoint {} #{} after {}",
            checkpoint.thread_id, checkpoint.seq, checkpoint.node
        );
        history.push(checkpoint);
        Ok(())
    }

    async fn latest(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self
            .threads
            .read()
            .await
            .get(thread_id)
            .and_then(|history| history.last().cloned()))
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>> {
        Ok(self
            .threads
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn clear(&self, thread_id: &str) -> Result<u64> {
        let removed = self
            .threads
            .write()
            .await
            .remove(thread_id)
            .map(|history| history.len() as u64)
            .unwrap_or(0);
        info!("Cleared {removed} checkpoints for thread '{thread_id}'");
        Ok(removed)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PostgresCheckpointer: `workflow_checkpoints` table
// ────────────────────────────────────────────────────────────────────────────

pub struct PostgresCheckpointer {
    pool: PgPool,
}

impl PostgresCheckpointer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CheckpointRow {
    checkpoint_id: Uuid,
    thread_id: String,
    seq: i64,
    graph: String,
    node: String,
    next_node: Option<String>,
    state: Json<WorkflowState>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CheckpointRow> for Checkpoint {
    type Error = anyhow::Error;

    fn try_from(row: CheckpointRow) -> Result<Self> {
        let graph = row
            .graph
            .parse::<GraphKind>()
            .map_err(|e| anyhow!("Corrupt checkpoint {}: {e}", row.checkpoint_id))?;
        let node = NodeId::parse(&row.node)
            .ok_or_else(|| anyhow!("Corrupt checkpoint {}: unknown node '{}'", row.checkpoint_id, row.node))?;
        let next = match row.next_node.as_deref() {
            Some(name) => Some(NodeId::parse(name).ok_or_else(|| {
                anyhow!("Corrupt checkpoint {}: unknown node '{name}'", row.checkpoint_id)
            })?),
            None => None,
        };

        Ok(Checkpoint {
            thread_id: row.thread_id,
            checkpoint_id: row.checkpoint_id,
            seq: row.seq,
            graph,
            node,
            next,
            state: row.state.0,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "checkpoint_id, thread_id, seq, graph, node, next_node, state, created_at";

#[async_trait]
impl Checkpointer for PostgresCheckpointer {
    async fn put(&self, checkpoint: Checkpoint) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workflow_checkpoints
                (checkpoint_id, thread_id, seq, graph, node, next_node, state, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(checkpoint.checkpoint_id)
        .bind(&checkpoint.thread_id)
        .bind(checkpoint.seq)
        .bind(checkpoint.graph.as_str())
        .bind(checkpoint.node.as_str())
        .bind(checkpoint.next.map(|n| n.as_str()))
        .bind(Json(&checkpoint.state))
        .bind(checkpoint.created_at)
        .execute(&self.pool)
        .await?;

        debug!(
            "Checkpoint {} #{} after {}",
            checkpoint.thread_id, checkpoint.seq, checkpoint.node
        );
        Ok(())
    }

    async fn latest(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        let row = sqlx::query_as::<_, CheckpointRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM workflow_checkpoints \
             WHERE thread_id = $1 ORDER BY seq DESC LIMIT 1"
        ))
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Checkpoint::try_from).transpose()
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>> {
        let rows = sqlx::query_as::<_, CheckpointRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM workflow_checkpoints \
             WHERE thread_id = $1 ORDER BY seq ASC"
        ))
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Checkpoint::try_from).collect()
    }

    async fn clear(&self, thread_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM workflow_checkpoints WHERE thread_id = $1")
            .bind(thread_id)
            .execute(&self.pool)
            .await?;

        info!(
            "Cleared {} checkpoints for thread '{thread_id}'",
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
