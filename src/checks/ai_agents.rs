//! AI agent text generation probes.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{preview, probe_missing_fields, record_server_error, Check, CheckContext};
use crate::probe::ProbeOutcome;
use crate::report::{Category, RunReport};

const AGENT_PROMPTS: [(&str, &str); 3] = [
    (
        "resume",
        "Senior Software Engineer with 5 years experience in Python, React, and cloud technologies. Led teams of 3-5 developers.",
    ),
    (
        "product",
        "AI-powered task management app for remote teams with real-time collaboration features",
    ),
    (
        "business",
        "AI automation platform for small businesses to streamline operations",
    ),
];

pub struct AiAgentsCheck;

#[async_trait]
impl Check for AiAgentsCheck {
    fn category(&self) -> Category {
        Category::AiAgents
    }

    async fn run(&self, ctx: &CheckContext<'_>, report: &mut RunReport) {
        let category = self.category();

        for (agent_id, input) in AGENT_PROMPTS {
            let payload = json!({
                "agentId": agent_id,
                "input": input,
                "userId": "probe_user_123",
            });
            let outcome = ctx
                .probe
                .post_json("/api/ai-agents", &payload, ctx.config.timeouts.agent())
                .await;

            let what = format!("agent '{}'", agent_id);
            let (status, body) = match outcome {
                ProbeOutcome::Response { status, body } => (status, body),
                ProbeOutcome::Fault(fault) => {
                    report.record(category, false, &format!("{}: {}", what, fault), None);
                    continue;
                }
            };

            match status.as_u16() {
                200 => {
                    let output = serde_json::from_str::<Value>(&body)
                        .ok()
                        .and_then(|v| v.get("output").and_then(Value::as_str).map(str::to_string));
                    match output {
                        Some(output) if !output.is_empty() => report.record(
                            category,
                            true,
                            &format!("{} generated output", what),
                            Some(json!({
                                "agent_id": agent_id,
                                "output_length": output.len(),
                                "output_preview": preview(&output, 100),
                            })),
                        ),
                        _ => report.record(
                            category,
                            false,
                            &format!("{} returned empty output", what),
                            None,
                        ),
                    }
                }
                500 => record_server_error(ctx, report, category, &what, status, &body),
                code => report.record(
                    category,
                    false,
                    &format!("{} unexpected status: {}", what, code),
                    None,
                ),
            }
        }

        // Required fields deliberately omitted; the endpoint must not crash.
        probe_missing_fields(
            ctx,
            report,
            category,
            "/api/ai-agents",
            &json!({ "agentId": "resume" }),
            "output",
        )
        .await;
    }
}
