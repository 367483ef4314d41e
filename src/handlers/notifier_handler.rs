use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    errors::NotifierError,
    models::send_options_model::{NotifyRequest, NotifyResponse},
    services::{notifier_service::NotifierService, send_request_service::SendRequestService},
};

/// POST /api/notifier/send
pub async fn send_notification_endpoint(
    body: web::Json<NotifyRequest>,
    notifier_service: web::Data<NotifierService>,
    request_service: web::Data<SendRequestService>,
) -> HttpResponse {
    let req_body = body.into_inner();

    if req_body.recipient.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "La lista de destinatarios está vacía"
        }));
    }

    if !req_body.async_send {
        return match notifier_service.notify(req_body).await {
            Ok(resp) => HttpResponse::Ok().json(resp),
            Err(e) => error_response(&e),
        };
    }

    // Asíncrono: se registra la solicitud y se despacha en segundo plano
    let record = match request_service
        .create_request(req_body.channel_type, &req_body.payload)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": format!("Send request creation failed: {}", e)
            }))
        }
    };

    let request_id = record.id.clone();
    let service_clone = notifier_service.clone();
    tokio::spawn(async move {
        match service_clone
            .dispatch_request(request_id.clone(), req_body)
            .await
        {
            Ok(resp) => log::info!(
                "Envío asíncrono {} terminado con estado '{}'",
                request_id,
                resp.status
            ),
            Err(e) => log::error!("Envío asíncrono {} falló: {}", request_id, e),
        }
    });

    HttpResponse::Accepted().json(NotifyResponse {
        success: true,
        send_request_id: record.id,
        status: record.status,
        log_ids: vec![],
        provider_payloads: vec![],
    })
}

fn error_response(e: &NotifierError) -> HttpResponse {
    match e {
        NotifierError::UnconfiguredChannel { .. } => HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": e.to_string()
        })),
        NotifierError::Storage(_) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": e.to_string()
        })),
    }
}
