//! handlers/send_log_handler.rs
//! Consulta de solicitudes y logs de envío.
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    models::send_log_model::{SendLogFilter, SendPushLogFilter},
    services::{send_log_service::SendLogService, send_request_service::SendRequestService},
};

#[derive(Deserialize)]
pub struct PaginationQuery {
    page: Option<u64>,
    page_size: Option<u64>,
}

/// GET /api/notifier/requests
pub async fn list_requests_endpoint(
    request_service: web::Data<SendRequestService>,
    query: web::Query<PaginationQuery>,
) -> HttpResponse {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(10);

    match request_service.list_requests(page, page_size).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "success": false,
            "error": format!("{:#}", e)
        })),
    }
}

/// GET /api/notifier/requests/{id}
/// Devuelve la solicitud junto con sus logs, en el orden de los destinatarios.
pub async fn get_request_endpoint(
    request_service: web::Data<SendRequestService>,
    log_service: web::Data<SendLogService>,
    path: web::Path<String>,
) -> HttpResponse {
    let request_id = path.into_inner();

    match request_service.get_request(&request_id).await {
        Ok(record) => match log_service.list_logs_for_request(&request_id).await {
            Ok(logs) => HttpResponse::Ok().json(serde_json::json!({
                "request": record,
                "logs": logs
            })),
            Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": format!("{:#}", e)
            })),
        },
        Err(e) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": format!("Send request not found: {:#}", e)
        })),
    }
}

/// GET /api/notifier/logs?send_request_id=..&status=..&page=..
pub async fn search_logs_endpoint(
    log_service: web::Data<SendLogService>,
    filter: web::Query<SendLogFilter>,
    pagination: web::Query<PaginationQuery>,
) -> HttpResponse {
    let page = pagination.page.unwrap_or(1);
    let page_size = pagination.page_size.unwrap_or(10);

    match log_service.search_logs(&filter, page, page_size).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "success": false,
            "error": format!("{:#}", e)
        })),
    }
}

/// GET /api/notifier/logs/{id}
pub async fn get_log_endpoint(
    log_service: web::Data<SendLogService>,
    path: web::Path<String>,
) -> HttpResponse {
    let log_id = path.into_inner();

    match log_service.get_log(&log_id).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": format!("Send log not found: {:#}", e)
        })),
    }
}

/// GET /api/notifier/push-logs
pub async fn search_push_logs_endpoint(
    log_service: web::Data<SendLogService>,
    filter: web::Query<SendPushLogFilter>,
    pagination: web::Query<PaginationQuery>,
) -> HttpResponse {
    let page = pagination.page.unwrap_or(1);
    let page_size = pagination.page_size.unwrap_or(10);

    match log_service.search_push_logs(&filter, page, page_size).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "success": false,
            "error": format!("{:#}", e)
        })),
    }
}
