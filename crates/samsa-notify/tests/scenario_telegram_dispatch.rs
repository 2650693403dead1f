//! scenario_telegram_dispatch
//!
//! Drives `TelegramNotifier` against a local httpmock server standing in for
//! api.telegram.org. No real network access.

use std::time::Duration;

use httpmock::prelude::*;
use samsa_config::secrets::TelegramSecrets;
use samsa_config::TelegramSettings;
use samsa_notify::{NotificationError, Notifier, TelegramNotifier};
use serde_json::json;

const TOKEN: &str = "4242:test-token";

fn notifier(server: &MockServer, token: Option<&str>, chats: &[&str]) -> TelegramNotifier {
    let settings = TelegramSettings {
        api_base: server.base_url(),
        timeout_secs: 5,
        ..TelegramSettings::default()
    };
    let secrets = TelegramSecrets {
        bot_token: token.map(str::to_string),
        chat_ids: chats.iter().map(|c| c.to_string()).collect(),
    };
    TelegramNotifier::new(&settings, secrets).expect("client must build")
}

#[tokio::test]
async fn every_recipient_gets_one_html_message() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/bot{TOKEN}/sendMessage"))
                .json_body(json!({"chat_id": "111", "text": "hello", "parse_mode": "HTML"}));
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/bot{TOKEN}/sendMessage"))
                .json_body(json!({"chat_id": "222", "text": "hello", "parse_mode": "HTML"}));
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;

    let n = notifier(&server, Some(TOKEN), &["111", "222"]);
    assert!(n.notify("hello").await);

    first.assert_hits_async(1).await;
    second.assert_hits_async(1).await;
}

#[tokio::test]
async fn one_failing_recipient_fails_dispatch_but_others_still_receive() {
    let server = MockServer::start_async().await;
    let ok = server
        .mock_async(|when, then| {
            when.method(POST).json_body_partial(r#"{"chat_id": "111"}"#);
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;
    let rejected = server
        .mock_async(|when, then| {
            when.method(POST).json_body_partial(r#"{"chat_id": "222"}"#);
            then.status(400)
                .json_body(json!({"ok": false, "description": "Bad Request: chat not found"}));
        })
        .await;

    let n = notifier(&server, Some(TOKEN), &["222", "111"]);
    let report = n.dispatch("order").await;

    assert!(!report.all_delivered());
    assert_eq!(report.delivered(), 1);
    match &report.outcomes[0] {
        Err(NotificationError::Status {
            recipient,
            status,
            body,
        }) => {
            assert_eq!(*recipient, 0);
            assert_eq!(*status, 400);
            assert!(body.contains("chat not found"), "{body}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(report.outcomes[1].is_ok());

    ok.assert_hits_async(1).await;
    rejected.assert_hits_async(1).await;

    assert!(!n.notify("order").await);
}

#[tokio::test]
async fn missing_token_fails_closed_without_network() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("sendMessage");
            then.status(200);
        })
        .await;

    let n = notifier(&server, None, &["111", "222"]);
    assert!(!n.notify("order").await);
    let report = n.dispatch("order").await;
    assert!(matches!(
        report.outcomes.as_slice(),
        [Err(NotificationError::NotConfigured)]
    ));

    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn no_recipients_fails_closed_without_network() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("sendMessage");
            then.status(200);
        })
        .await;

    let n = notifier(&server, Some(TOKEN), &[]);
    assert!(!n.notify("order").await);

    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    // Nothing listens on the discard port of the loopback interface.
    let settings = TelegramSettings {
        api_base: "http://127.0.0.1:9".to_string(),
        timeout_secs: 2,
        ..TelegramSettings::default()
    };
    let secrets = TelegramSecrets {
        bot_token: Some(TOKEN.to_string()),
        chat_ids: vec!["111".to_string()],
    };
    let n = TelegramNotifier::new(&settings, secrets).unwrap();

    let report = n.dispatch("order").await;
    match &report.outcomes[..] {
        [Err(e @ NotificationError::Transport { .. })] => {
            assert!(!e.to_string().contains("test-token"), "token leaked: {e}");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn hung_recipient_times_out_without_blocking_the_others() {
    let server = MockServer::start_async().await;
    let slow = server
        .mock_async(|when, then| {
            when.method(POST).json_body_partial(r#"{"chat_id": "111"}"#);
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"ok": true}));
        })
        .await;
    let fast = server
        .mock_async(|when, then| {
            when.method(POST).json_body_partial(r#"{"chat_id": "222"}"#);
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;

    let settings = TelegramSettings {
        api_base: server.base_url(),
        timeout_secs: 1,
        ..TelegramSettings::default()
    };
    let secrets = TelegramSecrets {
        bot_token: Some(TOKEN.to_string()),
        chat_ids: vec!["111".to_string(), "222".to_string()],
    };
    let n = TelegramNotifier::new(&settings, secrets).unwrap();

    let report = n.dispatch("order").await;
    match &report.outcomes[0] {
        Err(e @ NotificationError::Transport { recipient, .. }) => {
            assert_eq!(*recipient, 0);
            assert!(!e.to_string().contains("test-token"), "token leaked: {e}");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(report.outcomes[1].is_ok());
    assert!(!report.all_delivered());

    slow.assert_hits_async(1).await;
    fast.assert_hits_async(1).await;
}
