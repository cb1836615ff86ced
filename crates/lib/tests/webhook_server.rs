//! Integration tests: start the fulfillment server on a free port and drive
//! the webhook with reqwest. No NLU platform required. Server tasks are left
//! running when a test ends.

use lib::config::Config;
use lib::dispatch::HandlerRegistry;
use lib::response::{CardButton, ResponseModel, RichContent};
use lib::webhook;
use serde_json::{json, Value};
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

fn test_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new(Box::new(|_request| {
        ResponseModel::text("Sorry, I didn't catch that.", "")
    }));
    registry.register(
        "facts.card",
        Box::new(|_request| {
            ResponseModel::text("Here is the card.", "Here is the card.").with_content(
                RichContent::BasicCard {
                    title: "Card title".to_string(),
                    body: "Card body".to_string(),
                    button: Some(CardButton {
                        label: "Read more".to_string(),
                        url: "https://example.com/more".to_string(),
                    }),
                    image: None,
                },
            )
        }),
    );
    registry
}

/// Spawn a server with the test registry on a free port and wait until the
/// health probe answers. Panics when the server does not come up within 5s.
async fn start_server() -> (u16, reqwest::Client) {
    let port = free_port();
    let mut config = Config::default();
    config.server.port = port;
    config.server.bind = "127.0.0.1".to_string();

    tokio::spawn(async move {
        let _ = webhook::run_server(config, test_registry()).await;
    });

    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/", port);
    for _ in 0..100 {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return (port, client);
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("GET {} did not return 200 within 5s", url);
}

#[tokio::test]
async fn health_responds_with_running() {
    let (port, client) = start_server().await;
    let json: Value = client
        .get(format!("http://127.0.0.1:{}/", port))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(json.get("runtime").and_then(Value::as_str), Some("running"));
    assert_eq!(json.get("port").and_then(Value::as_u64), Some(port as u64));
}

#[tokio::test]
async fn missing_action_resolves_to_default_handler() {
    let (port, client) = start_server().await;
    let url = format!("http://127.0.0.1:{}/fulfillment", port);

    // Empty body object: no result.action at all.
    let reply: Value = client
        .post(&url)
        .json(&json!({}))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(
        reply.get("speech").and_then(Value::as_str),
        Some("Sorry, I didn't catch that.")
    );
    // Fallback rule fills displayText from speech.
    assert_eq!(
        reply.get("displayText").and_then(Value::as_str),
        Some("Sorry, I didn't catch that.")
    );

    // A body that is not JSON at all degrades the same way.
    let response = client
        .post(&url)
        .body("not json")
        .send()
        .await
        .expect("send");
    assert!(response.status().is_success());
    let reply: Value = response.json().await.expect("parse JSON");
    assert_eq!(
        reply.get("speech").and_then(Value::as_str),
        Some("Sorry, I didn't catch that.")
    );
}

#[tokio::test]
async fn assistant_source_gets_rich_response_envelope() {
    let (port, client) = start_server().await;
    let url = format!("http://127.0.0.1:{}/fulfillment", port);
    let body = json!({
        "result": { "action": "facts.card", "parameters": {}, "contexts": [] },
        "originalRequest": { "source": "google" }
    });
    let reply: Value = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("parse JSON");

    let items = reply["data"]["google"]["richResponse"]["items"]
        .as_array()
        .expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0]["simpleResponse"]["textToSpeech"],
        "Here is the card."
    );
    assert_eq!(items[1]["basicCard"]["title"], "Card title");
    assert_eq!(items[1]["basicCard"]["buttons"][0]["title"], "Read more");
}

#[tokio::test]
async fn non_assistant_source_gets_generic_payload() {
    let (port, client) = start_server().await;
    let url = format!("http://127.0.0.1:{}/fulfillment", port);
    let body = json!({
        "result": { "action": "facts.card" },
        "originalRequest": { "source": "slack" }
    });
    let reply: Value = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(
        reply.get("speech").and_then(Value::as_str),
        Some("Here is the card.")
    );
    // No assistant envelope and no attachments registered for this handler.
    assert!(reply.get("data").is_none());
}
