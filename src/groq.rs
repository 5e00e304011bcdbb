//! Direct LLM provider probe, for localizing API-key failures.
//!
//! When the backend reports key errors, this narrows the fault: either the
//! key itself is bad (direct call fails too) or the backend is not loading
//! it (direct call succeeds, route still errors).

use anyhow::Result;
use serde_json::{json, Value};

use crate::checks::environment::read_env_var;
use crate::config::HarnessConfig;
use crate::probe::{ProbeClient, ProbeOutcome};

pub const GROQ_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_MODEL: &str = "llama3-70b-8192";

/// Run both debug probes. Diagnostic output only; findings are printed,
/// not scored.
pub async fn run(config: &HarnessConfig) -> Result<()> {
    check_agent_route(config).await?;
    check_direct_api(config).await;
    Ok(())
}

/// Probe the backend's agent route and interpret its error, if any.
async fn check_agent_route(config: &HarnessConfig) -> Result<()> {
    println!("=== Checking key loading via /api/ai-agents ===");

    let probe = ProbeClient::new(&config.base_url)?;
    let payload = json!({
        "agentId": "resume",
        "input": "test input",
        "userId": "debug_user",
    });

    match probe
        .post_json("/api/ai-agents", &payload, config.timeouts.read())
        .await
    {
        ProbeOutcome::Response { status, body } => {
            println!("Status: {}", status.as_u16());
            println!("Response: {}", body);

            if status.as_u16() == 500 {
                let error = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                    .unwrap_or_default();
                if error.contains("Invalid API Key") || error.contains("Invalid Groq API key") {
                    println!("-> Groq API key is not being loaded correctly in the API route");
                } else if error.contains("PERMISSION_DENIED") {
                    println!("-> Firebase permissions issue");
                } else {
                    println!("-> Other error: {}", error);
                }
            }
        }
        ProbeOutcome::Fault(fault) => println!("Agent route probe failed: {}", fault),
    }
    Ok(())
}

/// Call the Groq API directly with the key from the env file.
async fn check_direct_api(config: &HarnessConfig) {
    println!("\n=== Direct Groq API call ===");

    let content = match std::fs::read_to_string(&config.env_file) {
        Ok(content) => content,
        Err(e) => {
            println!("Cannot read {}: {}", config.env_file.display(), e);
            return;
        }
    };
    let Some(api_key) = read_env_var(&content, "GROQ_API_KEY") else {
        println!("GROQ_API_KEY not found in {}", config.env_file.display());
        return;
    };
    println!("Using API key: {}", mask_key(&api_key));

    let client = reqwest::Client::new();
    let body = json!({
        "messages": [{ "role": "user", "content": "Hello, test message" }],
        "model": GROQ_MODEL,
        "max_tokens": 50,
    });

    let response = client
        .post(GROQ_CHAT_COMPLETIONS_URL)
        .bearer_auth(&api_key)
        .json(&body)
        .timeout(config.timeouts.read())
        .send()
        .await;

    match response {
        Ok(response) => {
            let status = response.status();
            println!("Direct Groq API status: {}", status.as_u16());
            if status.is_success() {
                println!("Direct Groq API call successful -- the key itself is valid");
            } else {
                let text = response.text().await.unwrap_or_default();
                println!("Direct Groq API failed: {}", text);
            }
        }
        Err(e) => println!("Direct Groq API error: {}", e),
    }
}

fn mask_key(key: &str) -> String {
    let head: String = key.chars().take(8).collect();
    format!("{}...", head)
}
