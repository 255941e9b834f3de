//! Conversation and audio route tests.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use parlance_agent::{ChatClient, ChatConfig, TurnOrchestrator};
use parlance_db::{create_pool, DbPool, DbRuntimeSettings};
use parlance_server::{app, AppState};
use parlance_types::Turn;
use parlance_voice::{MediaStore, SpeechConfig, SttService, TtsService};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app() -> (axum::Router, DbPool, TempDir) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let pool = create_pool(db_path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    {
        let conn = pool.get().unwrap();
        parlance_db::run_migrations(&conn).unwrap();
    }

    let speech = SpeechConfig {
        stt_url: "http://127.0.0.1:9/stt".to_string(),
        tts_url: "http://127.0.0.1:9/tts".to_string(),
        api_key: "test".to_string(),
        ..SpeechConfig::default()
    };
    let chat_config = ChatConfig {
        url: "http://127.0.0.1:9/chat".to_string(),
        ..ChatConfig::default()
    };

    let stt = SttService::new(&speech).unwrap();
    let tts = TtsService::new(&speech).unwrap();
    let chat = ChatClient::new(&chat_config).unwrap();
    let media = MediaStore::new(dir.path().join("media"), "http://localhost:3000");

    let orchestrator = Arc::new(TurnOrchestrator::new(
        pool.clone(),
        stt,
        tts,
        chat.clone(),
        media,
    ));
    let state = AppState {
        pool: pool.clone(),
        orchestrator,
        chat,
        media_dir: dir.path().join("media").to_string_lossy().into_owned(),
    };
    (app(state), pool, dir)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Seeds one single-user conversation with a persisted turn.
fn seed_conversation(pool: &DbPool, owner: &str, prompt: &str) -> String {
    let conn = pool.get().unwrap();
    let id = parlance_db::open_or_create_single(&conn, owner).unwrap();
    parlance_db::append_turn(
        &conn,
        &id,
        &Turn {
            prompt_text: prompt.to_string(),
            answer_text: String::new(),
            prompt_audio_url: "http://localhost:3000/media/x/prompt.mp3".to_string(),
            answer_audio_url: String::new(),
        },
    )
    .unwrap();
    id
}

#[tokio::test]
async fn empty_store_queries_are_not_found() {
    let (app, _pool, _dir) = test_app();

    let all = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/get-all-conversations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(all.status(), StatusCode::NOT_FOUND);

    let user = app
        .oneshot(
            Request::builder()
                .uri("/api/get-user-conversations/nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(user.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_conversations_are_returned_with_legacy_field_names() {
    let (app, pool, _dir) = test_app();
    let id = seed_conversation(&pool, "user-1", "hej på dig");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/get-user-conversations/user-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let conversation = &json[0];
    assert_eq!(conversation["ConversationId"], id.as_str());
    assert_eq!(conversation["Ended"], false);
    assert_eq!(conversation["PromptsAndAnswers"][0]["Prompt"], "hej på dig");
}

#[tokio::test]
async fn date_range_validation_rejects_inverted_bounds() {
    let (app, pool, _dir) = test_app();
    seed_conversation(&pool, "user-1", "hej");

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/get-conversations",
            serde_json::json!({
                "startDate": "2030-01-01",
                "endDate": "2020-01-01",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn date_range_includes_todays_conversations() {
    let (app, pool, _dir) = test_app();
    seed_conversation(&pool, "user-1", "hej");
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/get-conversations",
            serde_json::json!({
                "userId": "user-1",
                "startDate": today,
                "endDate": today,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn end_conversation_without_open_conversation_is_a_no_op() {
    let (app, _pool, _dir) = test_app();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/end-conversation",
            serde_json::json!({"participants": ["user-1"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"No open conversation to end.");
}

#[tokio::test]
async fn end_conversation_closes_the_open_one() {
    let (app, pool, _dir) = test_app();
    seed_conversation(&pool, "user-1", "hej");

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/end-conversation",
            serde_json::json!({"participants": ["user-1"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Conversation ended.");

    // The conversation is now marked ended, with a timestamp.
    let json = body_json(
        app.oneshot(
            Request::builder()
                .uri("/api/get-user-conversations/user-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(json[0]["Ended"], true);
    assert!(json[0]["EndedAt"].is_string());
}

#[tokio::test]
async fn audio_files_listing_filters_by_conversation() {
    let (app, pool, _dir) = test_app();
    let id = seed_conversation(&pool, "user-1", "hej");
    seed_conversation(&pool, "user-2", "hallå");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/get-audio-files?conversationId={id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(
        json[0]["promptAudioURL"],
        "http://localhost:3000/media/x/prompt.mp3"
    );

    // No filters returns everything.
    let all = body_json(
        app.oneshot(
            Request::builder()
                .uri("/api/get-audio-files")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn process_audio_requires_an_audio_field() {
    let (app, _pool, _dir) = test_app();

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"participants\"\r\n\r\n\
         [\"user-1\"]\r\n\
         --{boundary}--\r\n"
    );
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/process-audio")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn process_audio_rejects_malformed_participants() {
    let (app, _pool, _dir) = test_app();

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"audio\"; filename=\"snippet.webm\"\r\n\
         Content-Type: audio/webm\r\n\r\n\
         not-really-audio\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"participants\"\r\n\r\n\
         not-json\r\n\
         --{boundary}--\r\n"
    );
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/process-audio")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
