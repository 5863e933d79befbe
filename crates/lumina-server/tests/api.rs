use actix_web::{test, web, App};
use lumina_core::{Provider, Settings};
use lumina_server::{configure, AppState};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn network_tests_disabled() -> bool {
    std::env::var_os("CODEX_SANDBOX_NETWORK_DISABLED").is_some()
}

fn state_with(settings: Settings) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(settings, dir.path().join("settings.json"));
    (state, dir)
}

fn sse_delta(text: &str) -> String {
    format!("data: {}\n\n", json!({ "choices": [{ "delta": { "content": text } }] }))
}

/// Split an SSE body into `(event, data)` pairs.
fn parse_frames(body: &str) -> Vec<(String, Value)> {
    body.split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .map(|frame| {
            let mut event = String::new();
            let mut data = String::new();
            for line in frame.lines() {
                if let Some(rest) = line.strip_prefix("event: ") {
                    event = rest.to_string();
                } else if let Some(rest) = line.strip_prefix("data: ") {
                    data.push_str(rest);
                }
            }
            (event, serde_json::from_str(&data).unwrap())
        })
        .collect()
}

#[actix_web::test]
async fn health_check() {
    let (state, _dir) = state_with(Settings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(test::read_body(resp).await, "OK");
}

#[actix_web::test]
async fn settings_are_masked_and_persisted() {
    let (state, dir) = state_with(Settings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/settings")
        .set_json(json!({
            "provider": "openrouter",
            "api_key": "sk-or-v1-0123456789abcdef",
            "model": "anthropic/claude-3.5-sonnet"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["provider"], "openrouter");
    assert_eq!(body["api_key_masked"], "sk-or-v1...cdef");
    assert_eq!(body["has_api_key"], true);
    assert!(body.get("api_key").is_none());

    // an empty key keeps the stored one
    let req = test::TestRequest::post()
        .uri("/api/settings")
        .set_json(json!({ "api_key": "", "model": "openai/gpt-4o" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["model"], "openai/gpt-4o");
    assert_eq!(body["has_api_key"], true);

    let req = test::TestRequest::get().uri("/api/settings").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["api_key_masked"], "sk-or-v1...cdef");

    let saved = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
    assert!(saved.contains("sk-or-v1-0123456789abcdef"));
}

#[actix_web::test]
async fn default_project_is_available_before_any_chat() {
    let (state, _dir) = state_with(Settings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/projects/default/files").to_request();
    let seeded: Value = test::call_and_read_body_json(&app, req).await;
    assert!(seeded["files"]["App.tsx"].is_string());
    assert!(seeded["files"]["styles.css"].is_string());
    assert_eq!(seeded["revision"], 1);
}

#[actix_web::test]
async fn project_files_snapshot_and_import() {
    let (state, _dir) = state_with(Settings::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/api/projects/demo/files")
        .set_json(json!({
            "files": {
                "src/App.tsx": "import { motion } from 'framer-motion';\nexport default () => null;",
                "./util.ts": "export const x = 1;"
            }
        }))
        .to_request();
    let imported: Value = test::call_and_read_body_json(&app, req).await;
    // seed, then the import
    assert_eq!(imported["revision"], 2);
    let files = imported["files"].as_object().unwrap();
    let mut paths: Vec<_> = files.keys().cloned().collect();
    paths.sort();
    assert_eq!(paths, vec!["App.tsx", "util.ts"]);

    let req = test::TestRequest::get().uri("/api/projects/demo/files").to_request();
    let pulled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(pulled, imported);

    let req = test::TestRequest::get()
        .uri("/api/projects/demo/dependencies")
        .to_request();
    let deps: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deps, json!({ "dependencies": ["framer-motion"] }));

    assert_eq!(state.projects.read().await.len(), 2);
}

#[actix_web::test]
async fn reads_of_unknown_projects_do_not_create_sessions() {
    let (state, _dir) = state_with(Settings::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure),
    )
    .await;

    for uri in ["/api/projects/ghost/files", "/api/projects/ghost/dependencies"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["type"], "not_found_error");
    }

    assert!(state.existing_project("ghost").await.is_none());
    assert_eq!(state.projects.read().await.len(), 1);
}

#[actix_web::test]
async fn stop_without_running_turn_is_not_found() {
    let (state, _dir) = state_with(Settings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

    let req = test::TestRequest::post().uri("/api/stop/demo").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "not_found_error");
    assert_eq!(body["error"]["message"], "No active generation for project demo");
}

#[actix_web::test]
async fn stop_cancels_running_turn() {
    let (state, _dir) = state_with(Settings::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure),
    )
    .await;
    let turn = state.begin_turn("demo").await;

    let req = test::TestRequest::post().uri("/api/stop/demo").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "success": true, "message": "Generation stopped" }));
    assert!(turn.cancel_token.is_cancelled());
}

#[actix_web::test]
async fn chat_rejects_empty_message() {
    let (state, _dir) = state_with(Settings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "   ", "history": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Message is required");
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[actix_web::test]
async fn chat_without_api_key_streams_configuration_error() {
    let (state, _dir) = state_with(Settings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body = test::read_body(resp).await;
    let frames = parse_frames(std::str::from_utf8(&body).unwrap());

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, "error");
}

#[actix_web::test]
async fn test_connection_reports_success_and_failure() {
    if network_tests_disabled() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": " Connection successful! " } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13 }
        })))
        .mount(&server)
        .await;

    let settings = Settings::new(Provider::Custom, "sk-test-0123456789", "test-model", server.uri());
    let (state, _dir) = state_with(settings);
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

    let req = test::TestRequest::post().uri("/api/test-connection").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Connection successful!");
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["endpoint"], format!("{}/v1/chat/completions", server.uri()));

    // unsaved overrides are tried without being persisted
    let req = test::TestRequest::post()
        .uri("/api/test-connection")
        .set_json(json!({ "endpoint": format!("{}/nowhere", server.uri()) }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "upstream_error");
    assert!(body["error"].as_str().unwrap().starts_with("HTTP 404"));

    let req = test::TestRequest::get().uri("/api/settings").to_request();
    let settings: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(settings["endpoint"], server.uri());
}

#[actix_web::test]
async fn chat_streams_events_and_applies_changes() {
    if network_tests_disabled() {
        return;
    }

    let response = concat!(
        "<response><thinking>Add a button.</thinking><changes>",
        "<change><file>Button.tsx</file><action>create</action><description>Button</description>",
        "<content><![CDATA[import { clsx } from 'clsx';\nexport const Button = () => <button className={clsx('b')} />;]]></content></change>",
        "<change><file>App.tsx</file><action>patch</action><patch><find><![CDATA[</h1>]]></find>",
        "<replace><![CDATA[</h1><Button />]]></replace></patch></change>",
        "</changes><message>Added a button.</message></response>"
    );
    let chars: Vec<char> = response.chars().collect();
    let mut sse: String = chars
        .chunks(40)
        .map(|chunk| sse_delta(&chunk.iter().collect::<String>()))
        .collect();
    sse.push_str("data: [DONE]\n\n");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings::new(Provider::Custom, "sk-test-0123456789", "test-model", server.uri());
    let (state, _dir) = state_with(settings);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({
            "message": "Add a button",
            "history": [{ "role": "assistant", "content": "Hi" }],
            "project_id": "demo"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );

    let body = test::read_body(resp).await;
    let frames = parse_frames(std::str::from_utf8(&body).unwrap());
    let names: Vec<&str> = frames.iter().map(|(event, _)| event.as_str()).collect();

    let tail = &names[names.len() - 3..];
    assert_eq!(tail, ["done", "complete", "changes"]);
    assert!(names[..names.len() - 3].iter().all(|name| *name == "content"));

    let (_, complete) = &frames[frames.len() - 2];
    assert_eq!(complete["full_response"], response);

    let (_, changes) = &frames[frames.len() - 1];
    assert_eq!(changes["message"], "Added a button.");
    assert_eq!(changes["changes"][0]["action"], "created");
    assert_eq!(changes["changes"][1]["action"], "patched");
    assert!(changes["dependencies"]
        .as_array()
        .unwrap()
        .contains(&json!("clsx")));

    let session = state.project("demo").await;
    let session = session.lock().await;
    assert!(session.store().exists("Button.tsx"));
    assert!(session.store().read("App.tsx").unwrap().contains("<Button />"));
}
