//! End-to-end battery runs against an in-process mock backend.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use apiparamedic::config::{HarnessConfig, Timeouts};
use apiparamedic::report::{Category, CategoryStatus, RunReport};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn env_file_with_credentials() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "GROQ_API_KEY=gsk_test_key").unwrap();
    writeln!(file, "PRODUCTHUNT_DEVELOPER_TOKEN=ph_token").unwrap();
    writeln!(file, "NEXT_PUBLIC_FIREBASE_PROJECT_ID=probe-project").unwrap();
    file
}

fn test_config(base_url: String, env_file: &Path) -> HarnessConfig {
    HarnessConfig {
        base_url,
        env_file: env_file.to_path_buf(),
        timeouts: Timeouts {
            quick_secs: 5,
            read_secs: 5,
            agent_secs: 5,
            generate_secs: 5,
        },
        ..HarnessConfig::default()
    }
}

fn failure_messages(report: &RunReport, category: Category) -> Vec<String> {
    report
        .categories
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, r)| {
            r.records
                .iter()
                .filter(|rec| !rec.success)
                .map(|rec| rec.message.clone())
                .collect()
        })
        .unwrap_or_default()
}

// --- mock handlers -------------------------------------------------------

async fn sorted_tools() -> Json<Value> {
    Json(json!({
        "tools": [
            {"id": "1", "name": "Notion AI", "description": "Docs assistant", "url": "https://example.com/1",
             "votes": 120, "date": "2024-06-02T00:00:00Z", "topics": ["productivity"]},
            {"id": "2", "name": "Zapier AI", "description": "Automation", "url": "https://example.com/2",
             "votes": 80, "date": "2024-06-01T00:00:00Z", "topics": ["automation"]},
        ]
    }))
}

async fn plain_tools() -> Json<Value> {
    // Required fields only, no enhanced date fields.
    Json(json!({
        "tools": [
            {"id": "1", "name": "X", "description": "d", "url": "u", "votes": 5}
        ]
    }))
}

async fn reversed_tools() -> Json<Value> {
    Json(json!({
        "tools": [
            {"id": "2", "name": "Zapier AI", "description": "Automation", "url": "https://example.com/2",
             "votes": 80, "date": "2024-06-01T00:00:00Z", "topics": ["automation"]},
            {"id": "1", "name": "Notion AI", "description": "Docs assistant", "url": "https://example.com/1",
             "votes": 120, "date": "2024-06-02T00:00:00Z", "topics": ["productivity"]},
        ]
    }))
}

async fn agent_output(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({ "output": "Here is a polished summary tailored to your input." }))
}

async fn workflow_output(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({ "workflow": { "name": "generated", "nodes": [], "connections": {} } }))
}

async fn create_chatbot(Json(body): Json<Value>) -> Json<Value> {
    let kb = body
        .get("knowledgeBase")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Json(json!({
        "chatbot": {
            "id": "bot_1",
            "name": body.get("name"),
            "description": body.get("description"),
            "knowledgeBase": format!("{} Q: What do you offer? A: Premium software solutions.", kb),
            "originalKnowledge": kb,
            "color": body.get("color"),
            "userId": body.get("userId"),
            "createdAt": "2024-06-01T00:00:00Z",
        }
    }))
}

async fn list_chatbots() -> Json<Value> {
    Json(json!({
        "chatbots": [
            {"id": "bot_1", "name": "Support", "description": "Support bot", "color": "#3B82F6",
             "createdAt": "2024-06-01T00:00:00Z", "userId": "u1"}
        ]
    }))
}

async fn chatbot_reply(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({ "response": "We are available 24/7 and offer a 30-day money-back guarantee." }))
}

async fn groq_key_error(Json(_body): Json<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Invalid Groq API key configuration" })),
    )
}

async fn firebase_error(Json(_body): Json<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "7 PERMISSION_DENIED: Missing or insufficient permissions." })),
    )
}

/// Assemble a backend from per-route method routers. Unregistered paths 404
/// and wrong methods on registered paths 405, like the real backend.
fn backend(
    tools: MethodRouter,
    agents: MethodRouter,
    workflows: MethodRouter,
    chatbots: MethodRouter,
    chatbot_test: MethodRouter,
) -> Router {
    Router::new()
        .route("/api/ai-tools", tools)
        .route("/api/ai-agents", agents)
        .route("/api/workflows", workflows)
        .route("/api/chatbots", chatbots)
        .route("/api/chatbots/test", chatbot_test)
}

fn healthy_backend() -> Router {
    backend(
        get(sorted_tools),
        post(agent_output),
        post(workflow_output),
        get(list_chatbots).post(create_chatbot),
        post(chatbot_reply),
    )
}

// --- scenarios -----------------------------------------------------------

#[tokio::test]
async fn healthy_backend_passes_every_category() {
    let base_url = serve(healthy_backend()).await;
    let env_file = env_file_with_credentials();
    let config = test_config(base_url, env_file.path());

    let report = apiparamedic::run_all(&config).await.unwrap();

    for category in Category::ALL {
        assert_eq!(
            report.status_of(category),
            CategoryStatus::Success,
            "category {} should pass: {:?}",
            category,
            failure_messages(&report, category),
        );
    }
    assert!(report.overall_success());
}

#[tokio::test]
async fn expected_environment_errors_count_as_success() {
    // Generation endpoints are degraded with allow-listed errors; the rest
    // still answers. The run must pass.
    let app = backend(
        get(sorted_tools),
        post(groq_key_error),
        post(groq_key_error),
        get(list_chatbots).post(firebase_error),
        post(firebase_error),
    );
    let base_url = serve(app).await;
    let env_file = env_file_with_credentials();
    let config = test_config(base_url, env_file.path());

    let report = apiparamedic::run_all(&config).await.unwrap();

    assert_eq!(report.status_of(Category::AiAgents), CategoryStatus::Success);
    assert_eq!(report.status_of(Category::Workflows), CategoryStatus::Success);
    assert_eq!(
        report.status_of(Category::ChatbotCreate),
        CategoryStatus::Success
    );
    assert_eq!(
        report.status_of(Category::ChatbotTest),
        CategoryStatus::Success
    );
    assert!(report.overall_success());
}

#[tokio::test]
async fn unlisted_server_error_fails_the_category() {
    let app = backend(
        get(sorted_tools),
        post(agent_output),
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "database exploded" })),
            )
        }),
        get(list_chatbots).post(create_chatbot),
        post(chatbot_reply),
    );
    let base_url = serve(app).await;
    let env_file = env_file_with_credentials();
    let config = test_config(base_url, env_file.path());

    let report = apiparamedic::run_all(&config).await.unwrap();

    assert_eq!(report.status_of(Category::Workflows), CategoryStatus::Failed);
    assert!(!report.overall_success());
}

#[tokio::test]
async fn tools_without_enhanced_fields_still_pass() {
    let app = backend(
        get(plain_tools),
        post(agent_output),
        post(workflow_output),
        get(list_chatbots).post(create_chatbot),
        post(chatbot_reply),
    );
    let base_url = serve(app).await;
    let env_file = env_file_with_credentials();
    let config = test_config(base_url, env_file.path());

    let report = apiparamedic::run_all(&config).await.unwrap();

    // Base shape valid; enhanced-field absence is reported, not failed.
    assert_eq!(report.status_of(Category::AiTools), CategoryStatus::Success);
}

#[tokio::test]
async fn misordered_tool_dates_fail_ai_tools() {
    let app = backend(
        get(reversed_tools),
        post(agent_output),
        post(workflow_output),
        get(list_chatbots).post(create_chatbot),
        post(chatbot_reply),
    );
    let base_url = serve(app).await;
    let env_file = env_file_with_credentials();
    let config = test_config(base_url, env_file.path());

    let report = apiparamedic::run_all(&config).await.unwrap();

    assert_eq!(report.status_of(Category::AiTools), CategoryStatus::Failed);
    assert!(failure_messages(&report, Category::AiTools)
        .iter()
        .any(|m| m.contains("date sorting")));
    assert!(!report.overall_success());
}

#[tokio::test]
async fn timeout_is_recorded_as_timeout() {
    let app = backend(
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "tools": [] }))
        }),
        post(agent_output),
        post(workflow_output),
        get(list_chatbots).post(create_chatbot),
        post(chatbot_reply),
    );
    let base_url = serve(app).await;
    let env_file = env_file_with_credentials();
    let mut config = test_config(base_url, env_file.path());
    config.timeouts.read_secs = 1;

    let report = apiparamedic::run_all(&config).await.unwrap();

    assert_eq!(report.status_of(Category::AiTools), CategoryStatus::Failed);
    assert!(failure_messages(&report, Category::AiTools)
        .iter()
        .any(|m| m.contains("timed out after 1s")));
}

#[tokio::test]
async fn wrong_method_status_fails_error_handling() {
    // PUT /api/ai-tools answering 200 instead of 405 is a failure.
    let app = backend(
        get(sorted_tools).put(sorted_tools),
        post(agent_output),
        post(workflow_output),
        get(list_chatbots).post(create_chatbot),
        post(chatbot_reply),
    );
    let base_url = serve(app).await;
    let env_file = env_file_with_credentials();
    let config = test_config(base_url, env_file.path());

    let report = apiparamedic::run_all(&config).await.unwrap();

    assert_eq!(
        report.status_of(Category::ErrorHandling),
        CategoryStatus::Failed
    );
    assert!(failure_messages(&report, Category::ErrorHandling)
        .iter()
        .any(|m| m.contains("instead of 405")));
}

#[tokio::test]
async fn missing_env_file_fails_only_environment() {
    let base_url = serve(healthy_backend()).await;
    let config = test_config(base_url, Path::new("/nonexistent/.env"));

    let report = apiparamedic::run_all(&config).await.unwrap();

    assert_eq!(
        report.status_of(Category::Environment),
        CategoryStatus::Failed
    );
    assert_eq!(report.status_of(Category::AiTools), CategoryStatus::Success);
    assert!(!report.overall_success());
}
