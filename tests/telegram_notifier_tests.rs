use outage_report::config::TelegramConfig;
use outage_report::notify::{ChatNotifier, NotifyError, TelegramNotifier};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> TelegramConfig {
    TelegramConfig {
        bot_token: "123:abc".into(),
        chat_id: "-1001234567898".into(),
        api_base: format!("{}/", server.uri()),
    }
}

#[tokio::test]
async fn test_send_message_posts_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_string_contains("chat_id=-1001234567898"))
        .and(body_string_contains("parse_mode=HTML"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true,"result":{}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::new(&config(&server)).unwrap();
    notifier.notify("<b>Отчеты</b> готовы").await.unwrap();
}

#[tokio::test]
async fn test_non_200_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"ok":false,"description":"Bad Request: chat not found"}"#),
        )
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::new(&config(&server)).unwrap();
    let err = notifier.notify("hello").await.unwrap_err();
    match err {
        NotifyError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Bad Request: chat not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_an_error() {
    let notifier = TelegramNotifier::new(&TelegramConfig {
        bot_token: "t".into(),
        chat_id: "1".into(),
        api_base: "http://127.0.0.1:9".into(),
    })
    .unwrap();
    assert!(matches!(
        notifier.notify("hello").await,
        Err(NotifyError::Http(_))
    ));
}
