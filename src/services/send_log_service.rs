//! services/send_log_service.rs
//! Logs de envío: un registro por destinatario y por intento (solo inserción).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::models::{
    channel_model::ChannelType,
    send_log_model::{
        NewSendLog, Page, SendLogFilter, SendLogRecord, SendPushLogFilter, SendPushLogRecord,
    },
};

/// Lo único que el despachador necesita del almacenamiento de logs.
/// Debe poder llamarse en paralelo desde varios despachos.
#[async_trait]
pub trait SendLogStore: Send + Sync {
    async fn create(&self, log: NewSendLog) -> Result<SendLogRecord>;
}

#[derive(Clone, Debug)]
pub struct SendLogService {
    db_pool: Pool<Sqlite>,
}

#[derive(sqlx::FromRow)]
struct SendLogRow {
    id: String,
    send_request_id: Option<String>,
    channel_type: String,
    channel_name: String,
    receiver: String,
    status: String,
    error_message: Option<String>,
    metadata: Option<String>,
    created_at: String,
}

impl TryFrom<SendLogRow> for SendLogRecord {
    type Error = anyhow::Error;

    fn try_from(r: SendLogRow) -> Result<Self> {
        Ok(SendLogRecord {
            id: r.id,
            send_request_id: r.send_request_id,
            channel_type: r.channel_type,
            channel_name: r.channel_name,
            receiver: r.receiver,
            status: r.status,
            error_message: r.error_message,
            metadata: r
                .metadata
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .context("metadata no es JSON válido")?,
            created_at: r.created_at.parse()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SendPushLogRow {
    id: String,
    send_log_id: String,
    message_id: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
    created_at: String,
}

impl TryFrom<SendPushLogRow> for SendPushLogRecord {
    type Error = anyhow::Error;

    fn try_from(r: SendPushLogRow) -> Result<Self> {
        Ok(SendPushLogRecord {
            id: r.id,
            send_log_id: r.send_log_id,
            message_id: r.message_id,
            error_code: r.error_code,
            error_message: r.error_message,
            created_at: r.created_at.parse()?,
        })
    }
}

/// Valor de metadata como texto (acepta string o número).
fn meta_str(metadata: &Option<serde_json::Value>, key: &str) -> Option<String> {
    match metadata.as_ref()?.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl SendLogService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SendLogService { db_pool }
    }

    pub async fn get_log(&self, log_id: &str) -> Result<SendLogRecord> {
        let row = sqlx::query_as::<_, SendLogRow>(
            r#"
            SELECT id, send_request_id, channel_type, channel_name, receiver,
                   status, error_message, metadata, created_at
            FROM send_logs
            WHERE id = ?1
            "#,
        )
        .bind(log_id)
        .fetch_one(&self.db_pool)
        .await
        .context("No se encontró el log de envío")?;

        row.try_into()
    }

    /// Búsqueda por igualdad sobre los filtros presentes, paginada.
    pub async fn search_logs(
        &self,
        filter: &SendLogFilter,
        page: u64,
        page_size: u64,
    ) -> Result<Page<SendLogRecord>> {
        let (page, page_size) = normalize_page(page, page_size);

        let conditions = [
            ("send_request_id", &filter.send_request_id),
            ("channel_type", &filter.channel_type),
            ("channel_name", &filter.channel_name),
            ("receiver", &filter.receiver),
            ("status", &filter.status),
        ];

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM send_logs");
        push_conditions(&mut count_qb, &conditions);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await
            .context("Error contando logs de envío")?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, send_request_id, channel_type, channel_name, receiver, \
             status, error_message, metadata, created_at FROM send_logs",
        );
        push_conditions(&mut qb, &conditions);
        // rowid mantiene el orden de inserción dentro del mismo instante
        qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(page_size as i64)
            .push(" OFFSET ")
            .push_bind(((page - 1) * page_size) as i64);

        let rows = qb
            .build_query_as::<SendLogRow>()
            .fetch_all(&self.db_pool)
            .await
            .context("Error buscando logs de envío")?;

        Ok(Page {
            total: total as u64,
            page,
            page_size,
            items: rows
                .into_iter()
                .map(SendLogRecord::try_from)
                .collect::<Result<_>>()?,
        })
    }

    /// Logs de una solicitud en el orden en que se procesaron los destinatarios.
    pub async fn list_logs_for_request(&self, send_request_id: &str) -> Result<Vec<SendLogRecord>> {
        let rows = sqlx::query_as::<_, SendLogRow>(
            r#"
            SELECT id, send_request_id, channel_type, channel_name, receiver,
                   status, error_message, metadata, created_at
            FROM send_logs
            WHERE send_request_id = ?1
            ORDER BY rowid ASC
            "#,
        )
        .bind(send_request_id)
        .fetch_all(&self.db_pool)
        .await?;

        rows.into_iter().map(SendLogRecord::try_from).collect()
    }

    pub async fn search_push_logs(
        &self,
        filter: &SendPushLogFilter,
        page: u64,
        page_size: u64,
    ) -> Result<Page<SendPushLogRecord>> {
        let (page, page_size) = normalize_page(page, page_size);

        let conditions = [
            ("id", &filter.id),
            ("send_log_id", &filter.send_log_id),
            ("message_id", &filter.message_id),
            ("error_code", &filter.error_code),
            ("error_message", &filter.error_message),
        ];

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM send_push_logs");
        push_conditions(&mut count_qb, &conditions);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await
            .context("Error contando push logs")?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, send_log_id, message_id, error_code, error_message, created_at \
             FROM send_push_logs",
        );
        push_conditions(&mut qb, &conditions);
        qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(page_size as i64)
            .push(" OFFSET ")
            .push_bind(((page - 1) * page_size) as i64);

        let rows = qb
            .build_query_as::<SendPushLogRow>()
            .fetch_all(&self.db_pool)
            .await
            .context("Error buscando push logs")?;

        Ok(Page {
            total: total as u64,
            page,
            page_size,
            items: rows
                .into_iter()
                .map(SendPushLogRecord::try_from)
                .collect::<Result<_>>()?,
        })
    }
}

#[async_trait]
impl SendLogStore for SendLogService {
    /// Inserta el log; si es PUSH agrega además el detalle en
    /// `send_push_logs` dentro de la misma transacción.
    async fn create(&self, log: NewSendLog) -> Result<SendLogRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let metadata_str = log
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut tx = self
            .db_pool
            .begin()
            .await
            .context("No se pudo abrir la transacción")?;

        sqlx::query(
            r#"
            INSERT INTO send_logs (
                id, send_request_id, channel_type, channel_name, receiver,
                status, error_message, metadata, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(&log.send_request_id)
        .bind(log.channel_type.as_str())
        .bind(&log.channel_name)
        .bind(&log.receiver)
        .bind(log.status.as_str())
        .bind(&log.error_message)
        .bind(&metadata_str)
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .context("Error insertando send_log")?;

        if log.channel_type == ChannelType::Push {
            let error_message =
                meta_str(&log.metadata, "errorMessage").or_else(|| log.error_message.clone());
            sqlx::query(
                r#"
                INSERT INTO send_push_logs (
                    id, send_log_id, message_id, error_code, error_message, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(meta_str(&log.metadata, "messageId"))
            .bind(meta_str(&log.metadata, "errorCode"))
            .bind(error_message)
            .bind(&now_str)
            .execute(&mut *tx)
            .await
            .context("Error insertando send_push_log")?;
        }

        tx.commit().await.context("Error confirmando send_log")?;

        Ok(SendLogRecord {
            id,
            send_request_id: log.send_request_id,
            channel_type: log.channel_type.as_str().to_string(),
            channel_name: log.channel_name,
            receiver: log.receiver,
            status: log.status.as_str().to_string(),
            error_message: log.error_message,
            metadata: log.metadata,
            created_at: now,
        })
    }
}

fn normalize_page(page: u64, page_size: u64) -> (u64, u64) {
    (page.max(1), page_size.clamp(1, 100))
}

fn push_conditions<'a>(
    qb: &mut QueryBuilder<'a, Sqlite>,
    conditions: &[(&str, &'a Option<String>)],
) {
    let mut first = true;
    for (column, value) in conditions {
        if let Some(v) = *value {
            qb.push(if first { " WHERE " } else { " AND " });
            qb.push(*column).push(" = ").push_bind(v.as_str());
            first = false;
        }
    }
}
