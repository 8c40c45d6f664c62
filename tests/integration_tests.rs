use std::collections::BTreeMap;
use std::io::Write;

use kube_alert_notifier::{
    load_event_file, load_provider_configs_with_env, AlertManager, Email, Event,
    Notifier, NotifyError, ProviderConfig, Slack, Teams, Wechat,
};

fn oom_event() -> Event {
    Event {
        name: "test-pod".to_string(),
        container: "test-container".to_string(),
        namespace: "default".to_string(),
        reason: "OOMKILLED".to_string(),
        logs: "test\ntestlogs".to_string(),
        events: "event1-event2-event3-event1-event2-event3-event1-event2-\
                 event3\nevent5\nevent6-event8-event11-event12"
            .to_string(),
    }
}

#[test]
fn test_missing_required_keys_disable_every_provider() {
    let empty = ProviderConfig::new();
    assert!(Slack::new(&empty).is_none());
    assert!(Teams::new(&empty).is_none());
    assert!(Wechat::new(&empty).is_none());
    assert!(Email::new(&empty).is_none());

    let blank = ProviderConfig::new().with("webhook", "");
    assert!(Slack::new(&blank).is_none());
    assert!(Teams::new(&blank).is_none());
    assert!(Wechat::new(&blank).is_none());
}

#[test]
fn test_email_requires_each_key() {
    let full = [
        ("from", "test@test.com"),
        ("to", "test12@test.com"),
        ("password", "testPassword"),
        ("host", "chat.google.com"),
        ("port", "587"),
    ];
    assert!(Email::new(&full.iter().copied().collect()).is_some());

    for skip in 0..full.len() {
        let partial: ProviderConfig = full
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, kv)| *kv)
            .collect();
        assert!(Email::new(&partial).is_none(), "accepted without {}", full[skip].0);
    }
}

#[test]
fn test_provider_names_are_fixed() {
    let webhook = ProviderConfig::new().with("webhook", "testtest");
    assert_eq!(Slack::new(&webhook).unwrap().name(), "Slack");
    assert_eq!(Teams::new(&webhook).unwrap().name(), "Microsoft Teams");
    assert_eq!(Wechat::new(&webhook).unwrap().name(), "Wechat");
}

#[tokio::test]
async fn test_webhook_providers_against_http_mock() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("POST", "/ok")
        .with_status(200)
        .with_body(r#"{"isOk": true}"#)
        .expect(6)
        .create_async()
        .await;
    let url = format!("{}/ok", server.url());
    let config = ProviderConfig::new().with("webhook", url.as_str());

    let notifiers: Vec<Box<dyn Notifier>> = vec![
        Box::new(Slack::new(&config).unwrap()) as Box<dyn Notifier>,
        Box::new(Teams::new(&config).unwrap()),
        Box::new(Wechat::new(&config).unwrap()),
    ];
    for n in &notifiers {
        assert!(n.send_message("test").await.is_ok(), "{} message", n.name());
        assert!(n.send_event(&oom_event()).await.is_ok(), "{} event", n.name());
    }
    ok.assert_async().await;
}

#[tokio::test]
async fn test_webhook_providers_report_rejection() {
    let mut server = mockito::Server::new_async().await;
    let _bad = server
        .mock("POST", "/bad")
        .with_status(502)
        .with_body("upstream down")
        .create_async()
        .await;
    let config = ProviderConfig::new().with("webhook", format!("{}/bad", server.url()));

    let err = Teams::new(&config).unwrap().send_message("test").await.unwrap_err();
    match err {
        NotifyError::Rejected { provider, status, body } => {
            assert_eq!(provider, "Microsoft Teams");
            assert_eq!(status, 502);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(Slack::new(&config).unwrap().send_event(&oom_event()).await.is_err());
}

#[tokio::test]
async fn test_malformed_webhooks_fail_at_send_time() {
    for webhook in ["h ttp://localhost", "http://localhost:132323"] {
        let config = ProviderConfig::new().with("webhook", webhook);
        let slack = Slack::new(&config).expect("webhook is not validated up front");
        let err = slack.send_message("test").await.unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)), "{}: {:?}", webhook, err);
    }
}

#[tokio::test]
async fn test_env_to_alertmanager_round() {
    let mut server = mockito::Server::new_async().await;
    let slack_mock = server
        .mock("POST", "/slack")
        .match_body(mockito::Matcher::PartialJsonString(
            r##"{"channel":"#ops","text":"deploy finished"}"##.to_string(),
        ))
        .with_body("ok")
        .create_async()
        .await;
    let wechat_mock = server
        .mock("POST", "/wechat")
        .with_status(500)
        .create_async()
        .await;

    let env = BTreeMap::from([
        ("SLACK_WEBHOOK", format!("{}/slack", server.url())),
        ("SLACK_CHANNEL", "#ops".to_string()),
        ("WECHAT_WEBHOOK", format!("{}/wechat", server.url())),
        ("EMAIL_FROM", "a@test.com".to_string()),
    ]);

    let manager = AlertManager::from_configs(&load_provider_configs_with_env(&env));
    assert_eq!(manager.provider_names(), vec!["Slack", "Wechat"]);

    let summary = manager.notify_message("deploy finished").await;
    let failed: Vec<_> = summary.failures().map(|d| d.provider).collect();
    assert_eq!(failed, vec!["Wechat"]);
    slack_mock.assert_async().await;
    wechat_mock.assert_async().await;
}

#[test]
fn test_load_event_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"name":"test-pod","namespace":"default","reason":"OOMKILLED","logs":"a\nb"}}"#
    )
    .unwrap();

    let ev = load_event_file(file.path()).unwrap();
    assert_eq!(ev.name, "test-pod");
    assert_eq!(ev.logs, "a\nb");
    assert!(ev.container.is_empty());

    let mut broken = tempfile::NamedTempFile::new().unwrap();
    write!(broken, "not json").unwrap();
    let err = load_event_file(broken.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid event JSON"));
}
