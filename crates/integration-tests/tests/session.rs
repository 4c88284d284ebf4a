mod harness;

use harness::mock_upstream::MockUpstream;
use harness::server::TestServer;

async fn set_password(server: &TestServer, new: &str, current: Option<&str>) -> reqwest::Response {
    let mut body = serde_json::json!({
        "action": "dashboard_password",
        "new_password": new,
    });
    if let Some(current) = current {
        body["current_password"] = current.into();
    }

    let mut request = server.client().post(server.url("/config")).json(&body);
    if let Some(current) = current {
        request = request.header("Cookie", format!("dashboard_session={current}"));
    }
    request.send().await.unwrap()
}

#[tokio::test]
async fn dashboard_is_open_without_a_password() {
    let mock = MockUpstream::start(&[("alpha/model-a:free", 32_000)])
        .await
        .unwrap();
    let server = TestServer::start(mock.base_url()).await.unwrap();
    server.wait_until_synced().await;

    let response = server.client().get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let state: serde_json::Value = response.json().await.unwrap();
    assert_eq!(state["mode"], "auto");
    assert_eq!(state["models"][0]["id"], "alpha/model-a:free");
    assert!(state["usage_stats"]["success"].is_u64());
}

#[tokio::test]
async fn password_gates_dashboard_but_not_the_chat_api() {
    let mock = MockUpstream::start(&[("alpha/model-a:free", 32_000)])
        .await
        .unwrap();
    let server = TestServer::start(mock.base_url()).await.unwrap();
    server.wait_until_synced().await;

    assert_eq!(
        set_password(&server, "hunter2", None).await.status(),
        reqwest::StatusCode::OK
    );

    // Dashboard surface now requires the cookie
    let response = server.client().get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let response = server
        .client()
        .get(server.url("/"))
        .header("Cookie", "dashboard_session=hunter2")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // The chat API and health stay open
    let response = server
        .client()
        .post(server.url("/chat"))
        .json(&serde_json::json!({ "prompt": "Hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = server
        .client()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn login_issues_the_session_cookie() {
    let mock = MockUpstream::start(&[]).await.unwrap();
    let server = TestServer::start(mock.base_url()).await.unwrap();
    server.wait_until_synced().await;

    set_password(&server, "hunter2", None).await;

    let response = server
        .client()
        .post(server.url("/login"))
        .json(&serde_json::json!({ "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let response = server
        .client()
        .post(server.url("/login"))
        .json(&serde_json::json!({ "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("dashboard_session=hunter2"));

    let response = server
        .client()
        .post(server.url("/logout"))
        .send()
        .await
        .unwrap();
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn password_change_requires_the_current_password() {
    let mock = MockUpstream::start(&[]).await.unwrap();
    let server = TestServer::start(mock.base_url()).await.unwrap();
    server.wait_until_synced().await;

    set_password(&server, "first", None).await;

    let response = set_password(&server, "second", Some("wrong")).await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let response = server
        .client()
        .post(server.url("/config"))
        .header("Cookie", "dashboard_session=first")
        .json(&serde_json::json!({
            "action": "dashboard_password",
            "new_password": "second",
            "current_password": "wrong",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "config_conflict");

    let response = set_password(&server, "second", Some("first")).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // The change clears existing sessions
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));

    // Old password no longer opens the gate
    let response = server
        .client()
        .get(server.url("/"))
        .header("Cookie", "dashboard_session=first")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn switching_to_auto_clears_the_fixed_model() {
    let mock = MockUpstream::start(&[("alpha/model-a:free", 32_000)])
        .await
        .unwrap();
    let server = TestServer::start(mock.base_url()).await.unwrap();
    server.wait_until_synced().await;

    let response = server
        .client()
        .post(server.url("/config"))
        .json(&serde_json::json!({
            "action": "mode",
            "mode": "manual",
            "model_id": "omega/fixed",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let state: serde_json::Value = server
        .client()
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["mode"], "manual");
    assert_eq!(state["fixed_model"], "omega/fixed");

    let response = server
        .client()
        .post(server.url("/config"))
        .json(&serde_json::json!({ "action": "mode", "mode": "auto" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let state: serde_json::Value = server
        .client()
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["mode"], "auto");
    assert!(state["fixed_model"].is_null());

    // Manual without a model id clears it as well
    server
        .client()
        .post(server.url("/config"))
        .json(&serde_json::json!({
            "action": "mode",
            "mode": "manual",
            "model_id": "omega/fixed",
        }))
        .send()
        .await
        .unwrap();
    server
        .client()
        .post(server.url("/config"))
        .json(&serde_json::json!({ "action": "mode", "mode": "manual" }))
        .send()
        .await
        .unwrap();

    let state: serde_json::Value = server
        .client()
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(state["fixed_model"].is_null());
}

#[tokio::test]
async fn advanced_settings_show_up_in_the_dashboard_state() {
    let mock = MockUpstream::start(&[]).await.unwrap();
    let server = TestServer::start(mock.base_url()).await.unwrap();
    server.wait_until_synced().await;

    let response = server
        .client()
        .post(server.url("/config"))
        .json(&serde_json::json!({
            "action": "advanced_settings",
            "refresh_interval": 5,
            "request_timeout": 30,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let state: serde_json::Value = server
        .client()
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["config_overrides"]["refresh_interval"], 5);
    assert_eq!(state["config_overrides"]["request_timeout"], 30);
}
