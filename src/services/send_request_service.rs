use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::{
    channel_model::{ChannelPayload, ChannelType},
    send_log_model::Page,
    send_request_model::{SendRequestRecord, REQUEST_PENDING},
};

#[derive(Clone, Debug)]
pub struct SendRequestService {
    db_pool: Pool<Sqlite>,
}

#[derive(sqlx::FromRow)]
struct SendRequestRow {
    id: String,
    channel_type: String,
    payload: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SendRequestRow> for SendRequestRecord {
    type Error = anyhow::Error;

    fn try_from(r: SendRequestRow) -> Result<Self> {
        Ok(SendRequestRecord {
            id: r.id,
            channel_type: r.channel_type,
            // payload ilegible no invalida el registro
            payload: serde_json::from_str(&r.payload).ok(),
            status: r.status,
            created_at: r.created_at.parse()?,
            updated_at: r.updated_at.parse()?,
        })
    }
}

impl SendRequestService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SendRequestService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Fallo en migraciones del notifier")?;
        Ok(())
    }

    /// Crea la solicitud en DB con estado "pending"
    pub async fn create_request(
        &self,
        channel_type: ChannelType,
        payload: &ChannelPayload,
    ) -> Result<SendRequestRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let payload_json = serde_json::to_value(payload)?;

        sqlx::query(
            r#"
            INSERT INTO send_requests (
                id, channel_type, payload, status, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(channel_type.as_str())
        .bind(payload_json.to_string())
        .bind(REQUEST_PENDING)
        .bind(&now_str)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar send_request")?;

        Ok(SendRequestRecord {
            id,
            channel_type: channel_type.as_str().to_string(),
            payload: Some(payload_json),
            status: REQUEST_PENDING.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Actualiza el estado agregado (único campo mutable)
    pub async fn update_status(&self, request_id: &str, status: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE send_requests
            SET status = ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(request_id)
        .bind(status)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar send_request")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("No se encontró send_request con id {}", request_id);
        }
        Ok(())
    }

    pub async fn get_request(&self, request_id: &str) -> Result<SendRequestRecord> {
        let row = sqlx::query_as::<_, SendRequestRow>(
            r#"
            SELECT id, channel_type, payload, status, created_at, updated_at
            FROM send_requests
            WHERE id = ?1
            "#,
        )
        .bind(request_id)
        .fetch_one(&self.db_pool)
        .await
        .context("No se encontró send_request con ese id")?;

        row.try_into()
    }

    /// Lista solicitudes con paginación (más recientes primero)
    pub async fn list_requests(&self, page: u64, page_size: u64) -> Result<Page<SendRequestRecord>> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);
        let offset = (page - 1) * page_size;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM send_requests")
            .fetch_one(&self.db_pool)
            .await?;

        let rows = sqlx::query_as::<_, SendRequestRow>(
            r#"
            SELECT id, channel_type, payload, status, created_at, updated_at
            FROM send_requests
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page_size as i64)
        .bind(offset as i64)
        .fetch_all(&self.db_pool)
        .await?;

        let items = rows
            .into_iter()
            .map(SendRequestRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            total: total as u64,
            page,
            page_size,
            items,
        })
    }
}
