//! tests/send_log_tests.rs

#[cfg(test)]
mod tests {
    use actix_rt::test;
    use serde_json::json;

    use crate::{
        models::{
            channel_model::{ChannelPayload, ChannelType, DeliveryStatus},
            send_log_model::{NewSendLog, SendLogFilter, SendPushLogFilter},
            send_request_model::{REQUEST_PENDING, REQUEST_SENT},
        },
        services::{
            send_log_service::{SendLogService, SendLogStore},
            send_request_service::SendRequestService,
        },
        tests::test_pool,
    };

    fn entry(
        request_id: Option<&str>,
        channel_type: ChannelType,
        receiver: &str,
        status: DeliveryStatus,
    ) -> NewSendLog {
        NewSendLog {
            send_request_id: request_id.map(String::from),
            channel_type,
            channel_name: "smsc".to_string(),
            receiver: receiver.to_string(),
            status,
            error_message: None,
            metadata: None,
        }
    }

    #[test]
    async fn create_and_get_keep_metadata() {
        let service = SendLogService::new(test_pool().await);
        let mut new_log = entry(None, ChannelType::Sms, "79161234567", DeliveryStatus::Error);
        new_log.error_message = Some("SMSC: invalid number".to_string());
        new_log.metadata = Some(json!({"error": "invalid number", "error_code": 7}));

        let created = service.create(new_log).await.unwrap();
        let fetched = service.get_log(&created.id).await.unwrap();

        assert_eq!(fetched.status, "ERROR");
        assert_eq!(fetched.channel_type, "SMS");
        assert_eq!(fetched.receiver, "79161234567");
        assert_eq!(fetched.send_request_id, None);
        assert_eq!(fetched.error_message.as_deref(), Some("SMSC: invalid number"));
        assert_eq!(fetched.metadata.unwrap()["error_code"], 7);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[test]
    async fn get_unknown_log_fails() {
        let service = SendLogService::new(test_pool().await);
        assert!(service.get_log("no-existe").await.is_err());
    }

    #[test]
    async fn search_filters_and_paginates() {
        let service = SendLogService::new(test_pool().await);
        for receiver in ["71111111111", "72222222222", "73333333333"] {
            service
                .create(entry(Some("req-1"), ChannelType::Sms, receiver, DeliveryStatus::Sent))
                .await
                .unwrap();
        }
        service
            .create(entry(Some("req-1"), ChannelType::Sms, "74444444444", DeliveryStatus::Error))
            .await
            .unwrap();
        service
            .create(entry(Some("req-2"), ChannelType::Call, "75555555555", DeliveryStatus::Sent))
            .await
            .unwrap();

        let filter = SendLogFilter {
            send_request_id: Some("req-1".to_string()),
            status: Some("SENT".to_string()),
            ..Default::default()
        };
        let first = service.search_logs(&filter, 1, 2).await.unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.items.len(), 2);
        // más recientes primero
        assert_eq!(first.items[0].receiver, "73333333333");

        let second = service.search_logs(&filter, 2, 2).await.unwrap();
        assert_eq!(second.total, 3);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].receiver, "71111111111");

        let calls = SendLogFilter {
            channel_type: Some("CALL".to_string()),
            ..Default::default()
        };
        assert_eq!(service.search_logs(&calls, 1, 20).await.unwrap().total, 1);

        let everything = service.search_logs(&SendLogFilter::default(), 0, 0).await.unwrap();
        assert_eq!(everything.total, 5);
        assert_eq!(everything.page, 1);
        assert_eq!(everything.page_size, 1);
    }

    #[test]
    async fn logs_for_request_keep_insertion_order() {
        let service = SendLogService::new(test_pool().await);
        for receiver in ["73333333333", "71111111111", "72222222222"] {
            service
                .create(entry(Some("req-1"), ChannelType::Sms, receiver, DeliveryStatus::Sent))
                .await
                .unwrap();
        }

        let receivers: Vec<String> = service
            .list_logs_for_request("req-1")
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.receiver)
            .collect();
        assert_eq!(receivers, vec!["73333333333", "71111111111", "72222222222"]);
    }

    #[test]
    async fn push_detail_is_written_only_for_push_logs() {
        let service = SendLogService::new(test_pool().await);

        let mut ok = entry(None, ChannelType::Push, "token-ok", DeliveryStatus::Sent);
        ok.channel_name = "firebase".to_string();
        ok.metadata = Some(json!({"messageId": "0:1500415314455276", "name": "projects/p/messages/0:1500415314455276"}));
        let ok = service.create(ok).await.unwrap();

        let mut failed = entry(None, ChannelType::Push, "token-bad", DeliveryStatus::Error);
        failed.channel_name = "firebase".to_string();
        failed.error_message = Some("Firebase: Requested entity was not found.".to_string());
        failed.metadata = Some(json!({
            "errorCode": "UNREGISTERED",
            "errorMessage": "Requested entity was not found."
        }));
        let failed = service.create(failed).await.unwrap();

        service
            .create(entry(None, ChannelType::Sms, "79161234567", DeliveryStatus::Sent))
            .await
            .unwrap();

        let all = service
            .search_push_logs(&SendPushLogFilter::default(), 1, 20)
            .await
            .unwrap();
        assert_eq!(all.total, 2);

        let by_log = SendPushLogFilter {
            send_log_id: Some(ok.id.clone()),
            ..Default::default()
        };
        let detail = service.search_push_logs(&by_log, 1, 20).await.unwrap();
        assert_eq!(detail.items[0].message_id.as_deref(), Some("0:1500415314455276"));
        assert_eq!(detail.items[0].error_code, None);

        let by_code = SendPushLogFilter {
            error_code: Some("UNREGISTERED".to_string()),
            ..Default::default()
        };
        let detail = service.search_push_logs(&by_code, 1, 20).await.unwrap();
        assert_eq!(detail.total, 1);
        assert_eq!(detail.items[0].send_log_id, failed.id);
        assert_eq!(
            detail.items[0].error_message.as_deref(),
            Some("Requested entity was not found.")
        );

        let by_message = SendPushLogFilter {
            error_message: Some("Requested entity was not found.".to_string()),
            ..Default::default()
        };
        let by_message = service.search_push_logs(&by_message, 1, 20).await.unwrap();
        assert_eq!(by_message.total, 1);

        let by_id = SendPushLogFilter {
            id: Some(by_message.items[0].id.clone()),
            ..Default::default()
        };
        let by_id = service.search_push_logs(&by_id, 1, 20).await.unwrap();
        assert_eq!(by_id.total, 1);
        assert_eq!(by_id.items[0].send_log_id, failed.id);
    }

    #[test]
    async fn requests_are_created_pending_and_listed_newest_first() {
        let service = SendRequestService::new(test_pool().await);
        let first = service
            .create_request(ChannelType::Sms, &ChannelPayload::text("uno"))
            .await
            .unwrap();
        let second = service
            .create_request(ChannelType::Mail, &ChannelPayload::text("dos"))
            .await
            .unwrap();
        assert_eq!(first.status, REQUEST_PENDING);

        service.update_status(&first.id, REQUEST_SENT).await.unwrap();
        let stored = service.get_request(&first.id).await.unwrap();
        assert_eq!(stored.status, REQUEST_SENT);
        assert_eq!(stored.payload.unwrap()["message"], "uno");
        assert!(stored.updated_at >= stored.created_at);

        let page = service.list_requests(1, 1).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, second.id);
    }

    #[test]
    async fn update_status_of_unknown_request_fails() {
        let service = SendRequestService::new(test_pool().await);
        let err = service
            .update_status("no-existe", REQUEST_SENT)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no-existe"));
        assert_eq!(service.list_requests(1, 10).await.unwrap().total, 0);
    }
}
