//! app.rs
use crate::handlers::{notifier_handler, send_log_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notifier")
            .route(
                "/send",
                web::post().to(notifier_handler::send_notification_endpoint),
            )
            .service(
                web::scope("/requests")
                    .route(
                        "",
                        web::get().to(send_log_handler::list_requests_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(send_log_handler::get_request_endpoint),
                    ),
            )
            .service(
                web::scope("/logs")
                    .route("", web::get().to(send_log_handler::search_logs_endpoint))
                    .route("/{id}", web::get().to(send_log_handler::get_log_endpoint)),
            )
            .route(
                "/push-logs",
                web::get().to(send_log_handler::search_push_logs_endpoint),
            ),
    );
}
